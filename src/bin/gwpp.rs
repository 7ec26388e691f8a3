//! `gwpp [-l] [--ast] FILE...`: print each script in canonical layout.

fn main() {
    std::process::exit(gwtools::cli::run_pp());
}

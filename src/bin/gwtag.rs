//! `gwtag FILE...`: write a `<FILE>.tag` index next to each script.

fn main() {
    std::process::exit(gwtools::cli::run_tag());
}

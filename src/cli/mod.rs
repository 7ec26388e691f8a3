//! Entry points of the `gwpp` and `gwtag` binaries.
//!
//! Each returns the process exit code: 0 normally, 2 when a renderer hit an
//! internal-consistency failure on some file. Files that cannot be read or
//! parsed never affect the exit code.

use std::io::{self, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{PpArgs, TagArgs};
use crate::driver::{self, RunSummary};
use crate::render::FormatOptions;
use crate::syntax::ScanOptions;

pub mod args;
pub mod output;

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_pp() -> i32 {
    let args = PpArgs::parse();
    init_tracing();
    pp(&args).exit_code()
}

pub fn run_tag() -> i32 {
    let args = TagArgs::parse();
    init_tracing();
    tag(&args).exit_code()
}

/// Formats (or dumps) every file in order to stdout.
pub fn pp(args: &PpArgs) -> RunSummary {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    pp_to(args, &mut out)
}

/// Like [`pp`], writing to `out`. A failed write skips that file.
pub fn pp_to<W: Write>(args: &PpArgs, out: &mut W) -> RunSummary {
    let scan = ScanOptions { lint: args.lint };
    driver::run_files(
        &args.files,
        |path| {
            if args.ast {
                let json = driver::ast_json(path, scan)?;
                output::write_text(out, &json)?;
                output::write_text(out, "\n")?;
            } else {
                let formatted = driver::format_file(path, scan, FormatOptions::default())?;
                output::write_text(out, &formatted.text)?;
                output::print_line_warnings(path, &formatted.warnings);
            }
            Ok(())
        },
        output::print_error,
    )
}

/// Writes a `.tag` file next to every file in order.
pub fn tag(args: &TagArgs) -> RunSummary {
    driver::run_files(
        &args.files,
        |path| driver::tag_file(path).map(|_| ()),
        output::print_error,
    )
}

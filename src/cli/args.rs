//! Command-line arguments for the two binaries.
//!
//! Both use the `clap` derive API; doc comments double as `--help` text.

use clap::Parser;
use std::path::PathBuf;

/// Arguments of `gwpp`, the source formatter.
#[derive(Debug, Parser)]
#[command(
    name = "gwpp",
    version,
    about = "Reformat Gwion scripts into canonical layout."
)]
pub struct PpArgs {
    /// Lint mode: keep line comments that start a line in the output.
    #[arg(short = 'l', long = "lint")]
    pub lint: bool,

    /// Print the parsed tree as JSON instead of formatted source.
    #[arg(long = "ast")]
    pub ast: bool,

    /// Scripts to format, in order. Unreadable or unparsable ones are skipped.
    pub files: Vec<PathBuf>,
}

/// Arguments of `gwtag`, the tags emitter.
#[derive(Debug, Parser)]
#[command(
    name = "gwtag",
    version,
    about = "Write a ctags-compatible `<FILE>.tag` index next to each script."
)]
pub struct TagArgs {
    /// Scripts to index, in order. Unreadable or unparsable ones are skipped.
    pub files: Vec<PathBuf>,
}

//! User-facing output for the binaries.
//!
//! Formatted text goes to stdout; warnings and internal-consistency reports
//! go to stderr. Colour is used only when stderr is a terminal.

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::GwError;
use crate::render::LineWarning;

fn stderr_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Writes formatted source and flushes, so a closed pipe surfaces per file.
pub fn write_text<W: Write>(out: &mut W, text: &str) -> Result<(), GwError> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(GwError::Output)
}

/// `'FILE' long line N (W columns)`, file name in bold red on a terminal.
pub fn print_line_warnings(path: &Path, warnings: &[LineWarning]) {
    if warnings.is_empty() {
        return;
    }
    let mut stderr = StandardStream::stderr(stderr_choice());
    for warning in warnings {
        let _ = write_line_warning(&mut stderr, path, warning);
    }
}

pub fn write_line_warning<W: WriteColor>(
    out: &mut W,
    path: &Path,
    warning: &LineWarning,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "'{}'", path.display())?;
    out.reset()?;
    writeln!(
        out,
        " long line {} ({} columns)",
        warning.line, warning.width
    )
}

/// Renders an escalated error as a miette report on stderr.
pub fn print_error(path: &Path, error: GwError) {
    let report = miette::Report::new(error);
    eprintln!("{}: {report:?}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    #[test]
    fn test_warning_line_shape() {
        let mut out = NoColor::new(Vec::new());
        write_line_warning(
            &mut out,
            Path::new("a.gw"),
            &LineWarning { line: 3, width: 95 },
        )
        .unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "'a.gw' long line 3 (95 columns)\n");
    }
}

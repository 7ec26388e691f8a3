//! Per-file orchestration shared by both binaries: read, scan, parse,
//! render, persist.
//!
//! Files are processed strictly one after another. A file that cannot be
//! read or parsed is skipped; the rest of the run is unaffected.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::ast::Ast;
use crate::diagnostics::GwError;
use crate::render::{tag_ast, tag_path_for, Formatted, SourceFormatter, FormatOptions};
use crate::syntax::{self, ScanOptions};

/// A parsed input file.
#[derive(Debug)]
pub struct Loaded {
    /// The path as given, used in diagnostics and tag records.
    pub name: String,
    pub source: String,
    pub ast: Ast,
}

pub fn load(path: &Path, scan: ScanOptions) -> Result<Loaded, GwError> {
    let source = fs::read_to_string(path).map_err(|e| GwError::io(path, e))?;
    let name = path.display().to_string();
    let ast = syntax::parse(&source, &name, scan)?;
    Ok(Loaded { name, source, ast })
}

pub fn format_file(
    path: &Path,
    scan: ScanOptions,
    options: FormatOptions,
) -> Result<Formatted, GwError> {
    let loaded = load(path, scan)?;
    Ok(SourceFormatter::with_options(options).render(&loaded.ast)?)
}

/// The parsed tree as pretty-printed JSON.
pub fn ast_json(path: &Path, scan: ScanOptions) -> Result<String, GwError> {
    let loaded = load(path, scan)?;
    Ok(serde_json::to_string_pretty(&loaded.ast)?)
}

/// Indexes `path` into its sibling `.tag` file and returns that file's path.
/// Nothing is written unless the whole file indexes cleanly.
pub fn tag_file(path: &Path) -> Result<PathBuf, GwError> {
    let loaded = load(path, ScanOptions::default())?;
    let records = tag_ast(&loaded.ast, &loaded.name, Some(&loaded.source))?;

    let mut contents = String::new();
    for record in &records {
        contents.push_str(&record.to_string());
        contents.push('\n');
    }

    let target = tag_path_for(path);
    fs::write(&target, contents).map_err(|e| GwError::io(&target, e))?;
    debug!(file = %loaded.name, records = records.len(), "indexed");
    Ok(target)
}

// ============================================================================
// RUNS OVER MANY FILES
// ============================================================================

/// What happened across one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    /// Files that hit an internal-consistency failure.
    pub escalated: usize,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.escalated > 0 {
            2
        } else {
            0
        }
    }
}

/// Runs `each` over every file in order. Skippable failures are logged at
/// debug level; anything else goes to `report` and marks the run escalated.
pub fn run_files<F, R>(files: &[PathBuf], mut each: F, mut report: R) -> RunSummary
where
    F: FnMut(&Path) -> Result<(), GwError>,
    R: FnMut(&Path, GwError),
{
    let mut summary = RunSummary::default();
    for path in files {
        match each(path) {
            Ok(()) => summary.processed += 1,
            Err(err) if err.is_skippable() => {
                debug!(file = %path.display(), error = %err, "skipped");
                summary.skipped += 1;
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "internal consistency failure");
                summary.escalated += 1;
                report(path, err);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;

    #[test]
    fn test_skippable_errors_do_not_escalate() {
        let files = vec![PathBuf::from("a.gw"), PathBuf::from("b.gw")];
        let summary = run_files(
            &files,
            |path| {
                if path.ends_with("a.gw") {
                    Err(GwError::io(
                        path,
                        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                    ))
                } else {
                    Ok(())
                }
            },
            |_, _| panic!("nothing should be reported"),
        );
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_internal_errors_escalate_after_all_files() {
        let files = vec![PathBuf::from("a.gw"), PathBuf::from("b.gw")];
        let mut reported = Vec::new();
        let summary = run_files(
            &files,
            |path| {
                if path.ends_with("a.gw") {
                    Err(RenderError::internal("formatter", "broken").into())
                } else {
                    Ok(())
                }
            },
            |path, _| reported.push(path.to_path_buf()),
        );
        assert_eq!(summary.processed, 1);
        assert_eq!(reported, vec![PathBuf::from("a.gw")]);
        assert_eq!(summary.exit_code(), 2);
    }
}

//! # Diagnostics
//!
//! One error type for everything that can go wrong while processing a
//! single input file. Stage errors convert into it with `?`.
//!
//! - `Io` and `Syntax` mean the file produced no tree; callers skip it.
//! - `Render` is a defect signal: the tree was well formed but a renderer
//!   could not represent it. Callers escalate it.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::render::RenderError;
use crate::syntax::SyntaxError;

#[derive(Error, Diagnostic, Debug)]
pub enum GwError {
    #[error("cannot access '{}'", .path.display())]
    #[diagnostic(code(gwtools::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error("cannot write output")]
    #[diagnostic(code(gwtools::output))]
    Output(#[source] std::io::Error),

    #[error("cannot serialize tree: {0}")]
    #[diagnostic(code(gwtools::json))]
    Json(#[from] serde_json::Error),
}

impl GwError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GwError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that only mean "this file has no output".
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            GwError::Io { .. } | GwError::Output(_) | GwError::Syntax(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_is_skippable() {
        let err = GwError::io(
            "missing.gw",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_skippable());
        assert_eq!(err.to_string(), "cannot access 'missing.gw'");
    }

    #[test]
    fn test_output_failure_is_skippable() {
        let err = GwError::Output(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
        assert!(err.is_skippable());
    }

    #[test]
    fn test_render_is_escalated() {
        let err: GwError = RenderError::internal("formatter", "enum without members").into();
        assert!(!err.is_skippable());
    }
}

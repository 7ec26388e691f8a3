//! Parse failures with source context for miette rendering.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// Why a file could not be turned into a tree. The formatter and tagger
/// skip such files.
#[derive(Error, Diagnostic, Debug)]
pub enum SyntaxError {
    #[error("{name}:{line}: syntax error: {message}")]
    #[diagnostic(code(gwtools::parse::syntax))]
    Grammar {
        name: String,
        line: usize,
        message: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("{name}:{line}: invalid {literal} literal '{value}'")]
    #[diagnostic(code(gwtools::parse::literal))]
    Literal {
        name: String,
        line: usize,
        literal: &'static str,
        value: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("invalid literal")]
        span: SourceSpan,
    },

    #[error("{name}:{line}: malformed {construct}")]
    #[diagnostic(code(gwtools::parse::malformed))]
    Malformed {
        name: String,
        line: usize,
        construct: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("malformed syntax")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },
}

impl SyntaxError {
    /// 1-based line the failure points at.
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::Grammar { line, .. }
            | SyntaxError::Literal { line, .. }
            | SyntaxError::Malformed { line, .. } => *line,
        }
    }
}

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The text being parsed and the name it is reported under.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceContext<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

impl<'a> SourceContext<'a> {
    pub fn new(name: &'a str, text: &'a str) -> Self {
        SourceContext { name, text }
    }

    pub fn named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name, self.text.to_string()))
    }

    pub fn line_of(&self, offset: usize) -> usize {
        line_of(self.text, offset)
    }

    pub fn grammar(&self, message: String, span: Span) -> SyntaxError {
        SyntaxError::Grammar {
            name: self.name.to_string(),
            line: self.line_of(span.start),
            message,
            src: self.named_source(),
            span: to_source_span(span),
        }
    }

    pub fn literal(&self, literal: &'static str, value: &str, span: Span) -> SyntaxError {
        SyntaxError::Literal {
            name: self.name.to_string(),
            line: self.line_of(span.start),
            literal,
            value: value.to_string(),
            src: self.named_source(),
            span: to_source_span(span),
        }
    }

    pub fn malformed(&self, construct: impl Into<String>, span: Span) -> SyntaxError {
        SyntaxError::Malformed {
            name: self.name.to_string(),
            line: self.line_of(span.start),
            construct: construct.into(),
            src: self.named_source(),
            span: to_source_span(span),
            help: None,
        }
    }
}

pub(crate) fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start.into(), span.end.saturating_sub(span.start))
}

/// 1-based line number of a byte offset; offsets past the end map to the
/// last line.
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_counts_newlines() {
        let text = "a;\nb;\nc;";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 3), 2);
        assert_eq!(line_of(text, text.len() + 10), 3);
    }

    #[test]
    fn test_error_reports_line() {
        let ctx = SourceContext::new("t.gw", "a;\n@@");
        let err = ctx.grammar("unexpected input".into(), Span { start: 3, end: 4 });
        assert_eq!(err.line(), 2);
        assert!(err.to_string().starts_with("t.gw:2:"));
    }
}

//! Source text to [`crate::ast::Ast`].
//!
//! The scanner blanks comments, the pest grammar recognises the language and
//! the builder in [`parser`] assembles the tree.

pub mod error;
pub mod parser;
pub mod scanner;

pub use error::{line_of, SyntaxError};
pub use parser::parse;
pub use scanner::{scan, ScanOptions};

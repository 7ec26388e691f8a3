//! gwtools: canonical formatter and tags emitter for Gwion-style scripts.
//!
//! Pipeline: [`syntax`] turns text into an [`ast::Ast`]; the renderers in
//! [`render`] turn the tree into formatted source or index records; the
//! [`driver`] and [`cli`] modules run that pipeline over files.

pub use crate::diagnostics::GwError;

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod driver;
pub mod render;
pub mod syntax;

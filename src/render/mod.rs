//! # Renderers
//!
//! Both renderers (the source formatter and the tags emitter) implement
//! [`AstVisitor`]. Dispatch from a node to its handler is an exhaustive
//! `match` in the `walk_*` functions below, so a new node kind cannot be
//! added without every renderer growing a handler for it.
//!
//! ## Invariants
//! - Renderers never mutate the tree.
//! - All render state (indentation, scope stack, template memo) lives in the
//!   renderer value; two renders of the same tree are independent.

use std::collections::HashSet;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::*;

pub mod format;
pub mod tags;

pub use format::{format_ast, FormatOptions, Formatted, LineWarning, SourceFormatter};
pub use tags::{tag_ast, tag_path_for, IndexRecord, Scope, TagEmitter, TagKind};

// ============================================================================
// ERRORS
// ============================================================================

/// A tree the renderer cannot represent faithfully. Always a defect in the
/// producer of the tree (or in the renderer), never a user error.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("internal consistency error in {renderer}: {detail}")]
    #[diagnostic(
        code(gwtools::render::internal),
        help("the tree violates a shape invariant the renderer relies on")
    )]
    Internal {
        renderer: &'static str,
        detail: String,
    },
}

impl RenderError {
    pub fn internal(renderer: &'static str, detail: impl Into<String>) -> Self {
        RenderError::Internal {
            renderer,
            detail: detail.into(),
        }
    }
}

pub type RenderResult = Result<(), RenderError>;

// ============================================================================
// TEMPLATE MEMO
// ============================================================================

/// Definitions already rendered in the current pass, keyed by identity.
///
/// A templated definition may be shared between several sections; it is
/// rendered on first encounter only.
#[derive(Debug, Default)]
pub struct TemplateMemo {
    seen: HashSet<usize>,
}

impl TemplateMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `def` has not been rendered yet in this pass.
    pub fn first_visit<T>(&mut self, def: &Arc<T>) -> bool {
        self.seen.insert(Arc::as_ptr(def) as *const () as usize)
    }

    pub fn should_render_func(&mut self, def: &Arc<FuncDef>) -> bool {
        def.template.is_none() || self.first_visit(def)
    }

    pub fn should_render_class(&mut self, def: &Arc<ClassDef>) -> bool {
        def.template.is_none() || self.first_visit(def)
    }
}

// ============================================================================
// VISITOR
// ============================================================================

/// One handler per node kind. Provided `visit_*` methods route a node to its
/// handler; override them to observe nodes before dispatch.
pub trait AstVisitor {
    // definitions
    fn func_def(&mut self, def: &Arc<FuncDef>) -> RenderResult;
    fn class_def(&mut self, def: &Arc<ClassDef>) -> RenderResult;

    // statements
    fn stmt_exp(&mut self, stmt: &Stmt, exps: &[Exp]) -> RenderResult;
    fn stmt_code(&mut self, stmt: &Stmt, stmts: &[Stmt]) -> RenderResult;
    fn stmt_return(&mut self, stmt: &Stmt, exps: &[Exp]) -> RenderResult;
    fn stmt_if(&mut self, stmt: &Stmt, node: &StmtIf) -> RenderResult;
    fn stmt_flow(&mut self, stmt: &Stmt, node: &StmtFlow) -> RenderResult;
    fn stmt_for(&mut self, stmt: &Stmt, node: &StmtFor) -> RenderResult;
    fn stmt_auto(&mut self, stmt: &Stmt, node: &StmtAuto) -> RenderResult;
    fn stmt_loop(&mut self, stmt: &Stmt, node: &StmtLoop) -> RenderResult;
    fn stmt_switch(&mut self, stmt: &Stmt, node: &StmtSwitch) -> RenderResult;
    fn stmt_case(&mut self, stmt: &Stmt, exps: &[Exp]) -> RenderResult;
    fn stmt_enum(&mut self, stmt: &Stmt, node: &StmtEnum) -> RenderResult;
    fn stmt_typedef(&mut self, stmt: &Stmt, node: &StmtTypedef) -> RenderResult;
    fn stmt_fptr(&mut self, stmt: &Stmt, node: &StmtFptr) -> RenderResult;
    fn stmt_union(&mut self, stmt: &Stmt, node: &StmtUnion) -> RenderResult;
    fn stmt_jump(&mut self, stmt: &Stmt, node: &StmtJump) -> RenderResult;
    fn stmt_continue(&mut self, stmt: &Stmt) -> RenderResult;
    fn stmt_break(&mut self, stmt: &Stmt) -> RenderResult;
    fn stmt_pp(&mut self, stmt: &Stmt, node: &StmtPp) -> RenderResult;

    // expressions
    fn exp_primary(&mut self, exp: &Exp, node: &Primary) -> RenderResult;
    fn exp_decl(&mut self, exp: &Exp, node: &ExpDecl) -> RenderResult;
    fn exp_unary(&mut self, exp: &Exp, node: &ExpUnary) -> RenderResult;
    fn exp_binary(&mut self, exp: &Exp, node: &ExpBinary) -> RenderResult;
    fn exp_postfix(&mut self, exp: &Exp, node: &ExpPostfix) -> RenderResult;
    fn exp_cast(&mut self, exp: &Exp, node: &ExpCast) -> RenderResult;
    fn exp_call(&mut self, exp: &Exp, node: &ExpCall) -> RenderResult;
    fn exp_array(&mut self, exp: &Exp, node: &ExpArray) -> RenderResult;
    fn exp_dot(&mut self, exp: &Exp, node: &ExpDot) -> RenderResult;
    fn exp_dur(&mut self, exp: &Exp, node: &ExpDur) -> RenderResult;
    fn exp_if(&mut self, exp: &Exp, node: &ExpIf) -> RenderResult;

    fn visit_ast(&mut self, ast: &Ast) -> RenderResult {
        for section in &ast.sections {
            self.visit_section(section)?;
        }
        Ok(())
    }

    fn visit_section(&mut self, section: &Section) -> RenderResult {
        walk_section(self, section)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> RenderResult {
        walk_stmt(self, stmt)
    }

    fn visit_stmt_list(&mut self, stmts: &[Stmt]) -> RenderResult {
        for stmt in stmts {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_exp(&mut self, exp: &Exp) -> RenderResult {
        walk_exp(self, exp)
    }
}

pub fn walk_section<V: AstVisitor + ?Sized>(visitor: &mut V, section: &Section) -> RenderResult {
    match section {
        Section::Stmts(stmts) => visitor.visit_stmt_list(stmts),
        Section::Func(def) => visitor.func_def(def),
        Section::Class(def) => visitor.class_def(def),
    }
}

pub fn walk_stmt<V: AstVisitor + ?Sized>(visitor: &mut V, stmt: &Stmt) -> RenderResult {
    match &stmt.kind {
        StmtKind::Exp(exps) => visitor.stmt_exp(stmt, exps),
        StmtKind::Code(stmts) => visitor.stmt_code(stmt, stmts),
        StmtKind::Return(exps) => visitor.stmt_return(stmt, exps),
        StmtKind::If(node) => visitor.stmt_if(stmt, node),
        StmtKind::Flow(node) => visitor.stmt_flow(stmt, node),
        StmtKind::For(node) => visitor.stmt_for(stmt, node),
        StmtKind::Auto(node) => visitor.stmt_auto(stmt, node),
        StmtKind::Loop(node) => visitor.stmt_loop(stmt, node),
        StmtKind::Switch(node) => visitor.stmt_switch(stmt, node),
        StmtKind::Case(exps) => visitor.stmt_case(stmt, exps),
        StmtKind::Enum(node) => visitor.stmt_enum(stmt, node),
        StmtKind::Typedef(node) => visitor.stmt_typedef(stmt, node),
        StmtKind::Fptr(node) => visitor.stmt_fptr(stmt, node),
        StmtKind::Union(node) => visitor.stmt_union(stmt, node),
        StmtKind::Jump(node) => visitor.stmt_jump(stmt, node),
        StmtKind::Continue => visitor.stmt_continue(stmt),
        StmtKind::Break => visitor.stmt_break(stmt),
        StmtKind::Pp(node) => visitor.stmt_pp(stmt, node),
    }
}

pub fn walk_exp<V: AstVisitor + ?Sized>(visitor: &mut V, exp: &Exp) -> RenderResult {
    match &exp.kind {
        ExpKind::Primary(node) => visitor.exp_primary(exp, node),
        ExpKind::Decl(node) => visitor.exp_decl(exp, node),
        ExpKind::Unary(node) => visitor.exp_unary(exp, node),
        ExpKind::Binary(node) => visitor.exp_binary(exp, node),
        ExpKind::Postfix(node) => visitor.exp_postfix(exp, node),
        ExpKind::Cast(node) => visitor.exp_cast(exp, node),
        ExpKind::Call(node) => visitor.exp_call(exp, node),
        ExpKind::Array(node) => visitor.exp_array(exp, node),
        ExpKind::Dot(node) => visitor.exp_dot(exp, node),
        ExpKind::Dur(node) => visitor.exp_dur(exp, node),
        ExpKind::If(node) => visitor.exp_if(exp, node),
    }
}

// ============================================================================
// SHAPE CHECKS SHARED BY BOTH RENDERERS
// ============================================================================

pub(crate) fn check_id_list(renderer: &'static str, ids: &IdList) -> RenderResult {
    if ids.is_empty() {
        return Err(RenderError::internal(renderer, "empty identifier list"));
    }
    Ok(())
}

pub(crate) fn check_array_sub(renderer: &'static str, sub: &ArraySub) -> RenderResult {
    if sub.exps.len() > sub.depth {
        return Err(RenderError::internal(
            renderer,
            format!(
                "array subscript has {} sizes for depth {}",
                sub.exps.len(),
                sub.depth
            ),
        ));
    }
    Ok(())
}

pub(crate) fn check_enum(renderer: &'static str, node: &StmtEnum) -> RenderResult {
    if node.members.is_empty() {
        return Err(RenderError::internal(renderer, "enum without members"));
    }
    Ok(())
}

pub(crate) fn check_union(renderer: &'static str, node: &StmtUnion) -> RenderResult {
    if node.members.is_empty() {
        return Err(RenderError::internal(renderer, "union without members"));
    }
    if node
        .members
        .iter()
        .any(|member| !matches!(member.kind, ExpKind::Decl(_)))
    {
        return Err(RenderError::internal(
            renderer,
            "union member is not a declaration",
        ));
    }
    Ok(())
}

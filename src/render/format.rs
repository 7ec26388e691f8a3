//! # Source Formatter
//!
//! Renders a tree back into canonical source text and reports every output
//! line wider than [`FormatOptions::max_width`] display columns.
//!
//! ## Layout state
//! - `level`: indentation depth, [`FormatOptions::tab_len`] columns each.
//! - `skip`: pending same-line requests. While positive, the next indent
//!   request prints a single space instead (`if(c) {`, `function f() {`).
//! - `nonl`: while positive, newlines and indentation are suppressed. Used
//!   for the clauses of a `for(...)` header and for signature fragments.
//! - `line`/`line_start`: newline count and offset of the current line, for
//!   width warnings.
//!
//! The tree has no parenthesis node: operands are wrapped in parentheses
//! whenever their binding strength is weaker than their position needs, so
//! the output parses back into the same tree.

use serde::Serialize;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use std::sync::Arc;

use super::{
    check_array_sub, check_enum, check_id_list, check_union, AstVisitor, RenderError,
    RenderResult, TemplateMemo,
};
use crate::ast::*;

const RENDERER: &str = "formatter";

// ============================================================================
// OPTIONS AND OUTPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Columns per indentation level.
    pub tab_len: usize,
    /// Widest line accepted without a warning.
    pub max_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            tab_len: 2,
            max_width: 80,
        }
    }
}

/// An output line wider than the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineWarning {
    /// 1-based line of the formatted output.
    pub line: usize,
    /// Display width of the line, newline excluded.
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Formatted {
    pub text: String,
    pub warnings: Vec<LineWarning>,
}

/// Formats a whole tree with default options.
pub fn format_ast(ast: &Ast) -> Result<Formatted, RenderError> {
    SourceFormatter::new().render(ast)
}

// ============================================================================
// SIGNATURE FRAGMENTS
// ============================================================================
// Single-line pieces of formatter output, reused by the tags emitter so its
// search patterns match formatted source.

fn fragment<F>(render: F) -> Result<String, RenderError>
where
    F: FnOnce(&mut SourceFormatter) -> RenderResult,
{
    let mut formatter = SourceFormatter::new();
    formatter.nonl += 1;
    render(&mut formatter)?;
    Ok(formatter.out)
}

/// `[template<A> ]function [static ]T name(args)`
pub fn func_signature(def: &FuncDef) -> Result<String, RenderError> {
    fragment(|f| f.func_header(def))
}

/// `[template<A> ]class Name[ extends T]`
pub fn class_signature(def: &ClassDef) -> Result<String, RenderError> {
    fragment(|f| f.class_header(def))
}

/// `typedef R Name(args);`
pub fn fptr_signature(node: &StmtFptr) -> Result<String, RenderError> {
    fragment(|f| f.fptr_line(node))
}

/// `typedef T Name;`
pub fn typedef_signature(node: &StmtTypedef) -> Result<String, RenderError> {
    fragment(|f| f.typedef_line(node))
}

/// `T name[dims]`
pub fn decl_signature(td: &TypeDecl, var: &VarDecl) -> Result<String, RenderError> {
    fragment(|f| {
        f.type_decl(td)?;
        f.text(" ");
        f.var_decl(var)
    })
}

pub fn type_text(td: &TypeDecl) -> Result<String, RenderError> {
    fragment(|f| f.type_decl(td))
}

/// Shortest round-tripping text, switching to an exponent for very large or
/// small magnitudes. The mantissa always keeps a fractional part so the
/// literal stays a float: `2.0`, `1.0e300`.
pub fn float_literal(value: f64) -> String {
    let text = format!("{:?}", value);
    if !value.is_finite() {
        return text;
    }
    let (mantissa, exponent) = match text.find('e') {
        Some(at) => text.split_at(at),
        None => (text.as_str(), ""),
    };
    if mantissa.contains('.') {
        text
    } else {
        format!("{}.0{}", mantissa, exponent)
    }
}

/// Whether the rendered text of `exp` ends with an unparenthesised declaration.
fn ends_in_decl(exp: &Exp) -> bool {
    match &exp.kind {
        ExpKind::Decl(_) => true,
        ExpKind::Binary(node) => {
            node.rhs.precedence() > node.op.precedence() && ends_in_decl(&node.rhs)
        }
        ExpKind::If(node) => {
            node.else_exp.precedence() >= prec::TERNARY && ends_in_decl(&node.else_exp)
        }
        ExpKind::Unary(node) => match &node.operand {
            UnaryOperand::Exp(operand) => {
                operand.precedence() >= prec::UNARY && ends_in_decl(operand)
            }
            _ => false,
        },
        _ => false,
    }
}

// ============================================================================
// FORMATTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyEnd {
    /// The body ended mid-line (a closing brace); the caller decides what follows.
    Open,
    /// The body already ended its last line.
    Closed,
}

pub struct SourceFormatter {
    options: FormatOptions,
    out: String,
    level: usize,
    skip: usize,
    nonl: usize,
    line: usize,
    line_start: usize,
    warnings: Vec<LineWarning>,
    memo: TemplateMemo,
}

impl Default for SourceFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFormatter {
    pub fn new() -> Self {
        Self::with_options(FormatOptions::default())
    }

    pub fn with_options(options: FormatOptions) -> Self {
        SourceFormatter {
            options,
            out: String::new(),
            level: 0,
            skip: 0,
            nonl: 0,
            line: 0,
            line_start: 0,
            warnings: Vec::new(),
            memo: TemplateMemo::new(),
        }
    }

    pub fn render(mut self, ast: &Ast) -> Result<Formatted, RenderError> {
        self.sections(&ast.sections, true)?;
        if self.level != 0 || self.nonl != 0 {
            return Err(RenderError::internal(
                RENDERER,
                "layout state did not return to the top level",
            ));
        }
        debug!(
            lines = self.line,
            warnings = self.warnings.len(),
            "formatted"
        );
        Ok(Formatted {
            text: self.out,
            warnings: self.warnings,
        })
    }

    // ------------------------------------------------------------------
    // Output primitives
    // ------------------------------------------------------------------

    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn nl(&mut self) {
        if self.nonl > 0 {
            return;
        }
        let width = UnicodeWidthStr::width(&self.out[self.line_start..]);
        self.out.push('\n');
        self.line += 1;
        if width > self.options.max_width {
            self.warnings.push(LineWarning {
                line: self.line,
                width,
            });
        }
        self.line_start = self.out.len();
    }

    fn indent(&mut self) {
        if self.nonl > 0 {
            return;
        }
        if self.skip > 0 {
            self.skip -= 1;
            self.out.push(' ');
            return;
        }
        let width = self.level * self.options.tab_len;
        self.out.extend(std::iter::repeat(' ').take(width));
    }

    // ------------------------------------------------------------------
    // Sections, blocks and bodies
    // ------------------------------------------------------------------

    /// A blank line follows each definition at top level, and separates a
    /// definition from whatever follows it inside a class body.
    fn sections(&mut self, sections: &[Section], top_level: bool) -> RenderResult {
        for (index, section) in sections.iter().enumerate() {
            let before = self.out.len();
            self.visit_section(section)?;
            let last = index + 1 == sections.len();
            if section.is_definition() && self.out.len() > before && (top_level || !last) {
                self.nl();
            }
        }
        Ok(())
    }

    fn block(&mut self, stmts: &[Stmt]) -> RenderResult {
        if stmts.is_empty() {
            self.text("{}");
            return Ok(());
        }
        self.text("{");
        self.nl();
        self.level += 1;
        self.visit_stmt_list(stmts)?;
        self.level -= 1;
        self.indent();
        self.text("}");
        Ok(())
    }

    fn body(&mut self, stmt: &Stmt) -> Result<BodyEnd, RenderError> {
        match &stmt.kind {
            StmtKind::If(node) => {
                self.text(" ");
                self.if_chain(node)?;
                Ok(BodyEnd::Closed)
            }
            StmtKind::Code(stmts) => {
                self.skip += 1;
                self.indent();
                self.block(stmts)?;
                Ok(BodyEnd::Open)
            }
            _ => {
                self.nl();
                self.level += 1;
                self.visit_stmt(stmt)?;
                self.level -= 1;
                Ok(BodyEnd::Closed)
            }
        }
    }

    /// Renders a body and finishes its line.
    fn body_line(&mut self, stmt: &Stmt) -> RenderResult {
        if self.body(stmt)? == BodyEnd::Open {
            self.nl();
        }
        Ok(())
    }

    fn if_chain(&mut self, node: &StmtIf) -> RenderResult {
        self.text("if(");
        self.exp_list(&node.cond)?;
        self.text(")");
        let end = self.body(&node.if_body)?;
        match &node.else_body {
            None => {
                if end == BodyEnd::Open {
                    self.nl();
                }
            }
            Some(else_body) => {
                match end {
                    BodyEnd::Open => self.text(" else"),
                    BodyEnd::Closed => {
                        self.indent();
                        self.text("else");
                    }
                }
                self.body_line(else_body)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Renders `exp`, parenthesised when it binds weaker than `min`.
    fn operand(&mut self, exp: &Exp, min: u8) -> RenderResult {
        if exp.precedence() < min {
            self.text("(");
            self.visit_exp(exp)?;
            self.text(")");
            Ok(())
        } else {
            self.visit_exp(exp)
        }
    }

    fn exp_list(&mut self, exps: &[Exp]) -> RenderResult {
        for (index, exp) in exps.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            // a trailing declaration would swallow the following names as declarators
            if index + 1 < exps.len() && ends_in_decl(exp) {
                self.text("(");
                self.visit_exp(exp)?;
                self.text(")");
            } else {
                self.operand(exp, prec::LOWEST)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Types, declarators and signatures
    // ------------------------------------------------------------------

    fn id_path(&mut self, ids: &IdList) -> RenderResult {
        check_id_list(RENDERER, ids)?;
        if ids.len() > 1 {
            self.text("<");
            self.text(&ids.names().join("."));
            self.text(">");
        } else {
            self.text(&ids.names()[0]);
        }
        Ok(())
    }

    fn type_args(&mut self, types: &[TypeDecl]) -> RenderResult {
        self.text("“");
        for (index, td) in types.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.type_decl(td)?;
        }
        self.text("”");
        Ok(())
    }

    fn type_decl(&mut self, td: &TypeDecl) -> RenderResult {
        if td.flags.contains(Flags::PRIVATE) {
            self.text("private ");
        }
        if td.flags.contains(Flags::STATIC) {
            self.text("static ");
        }
        match &td.path {
            TypePath::Typeof(ids) => {
                self.text("typeof ");
                self.id_path(ids)?;
            }
            TypePath::Ids(ids) => {
                if !td.types.is_empty() {
                    self.type_args(&td.types)?;
                }
                self.id_path(ids)?;
            }
        }
        if td.flags.contains(Flags::REF) {
            self.text("@");
        }
        if let Some(array) = &td.array {
            self.array_sub(array)?;
        }
        Ok(())
    }

    fn array_sub(&mut self, sub: &ArraySub) -> RenderResult {
        check_array_sub(RENDERER, sub)?;
        for index in 0..sub.depth {
            self.text("[");
            if let Some(exp) = sub.dim(index) {
                self.operand(exp, prec::LOWEST)?;
            }
            self.text("]");
        }
        Ok(())
    }

    fn var_decl(&mut self, var: &VarDecl) -> RenderResult {
        self.text(&var.name);
        if let Some(array) = &var.array {
            self.array_sub(array)?;
        }
        Ok(())
    }

    fn args(&mut self, args: &[Arg], variadic: bool) -> RenderResult {
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.type_decl(&arg.td)?;
            self.text(" ");
            self.var_decl(&arg.var)?;
        }
        if variadic {
            self.text(if args.is_empty() { "..." } else { ", ..." });
        }
        Ok(())
    }

    fn template(&mut self, ids: &IdList) -> RenderResult {
        check_id_list(RENDERER, ids)?;
        self.text("template<");
        self.text(&ids.names().join(", "));
        self.text("> ");
        Ok(())
    }

    fn func_header(&mut self, def: &FuncDef) -> RenderResult {
        if let Some(template) = &def.template {
            self.template(template)?;
        }
        self.text("function ");
        if def.flags.contains(Flags::STATIC) {
            self.text("static ");
        }
        self.type_decl(&def.td)?;
        self.text(" ");
        self.text(&def.name);
        self.text("(");
        self.args(&def.args, def.flags.contains(Flags::VARIADIC))?;
        self.text(")");
        Ok(())
    }

    fn class_header(&mut self, def: &ClassDef) -> RenderResult {
        if let Some(template) = &def.template {
            self.template(template)?;
        }
        self.text("class ");
        self.text(&def.name);
        if let Some(ext) = &def.ext {
            self.text(" extends ");
            self.type_decl(ext)?;
        }
        Ok(())
    }

    fn fptr_line(&mut self, node: &StmtFptr) -> RenderResult {
        self.text("typedef ");
        self.type_decl(&node.td)?;
        self.text(" ");
        self.text(&node.name);
        self.text("(");
        self.args(&node.args, node.td.flags.contains(Flags::VARIADIC))?;
        self.text(");");
        Ok(())
    }

    fn typedef_line(&mut self, node: &StmtTypedef) -> RenderResult {
        self.text("typedef ");
        self.type_decl(&node.td)?;
        self.text(" ");
        self.text(&node.name);
        self.text(";");
        Ok(())
    }

    /// `keyword(cond) body`, shared by while/until/repeat/switch.
    fn headed_body(&mut self, keyword: &str, cond: &[Exp], body: &Stmt) -> RenderResult {
        self.indent();
        self.text(keyword);
        self.text("(");
        self.exp_list(cond)?;
        self.text(")");
        self.body_line(body)
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

impl AstVisitor for SourceFormatter {
    fn func_def(&mut self, def: &Arc<FuncDef>) -> RenderResult {
        if !self.memo.should_render_func(def) {
            return Ok(());
        }
        self.indent();
        self.func_header(def)?;
        self.body_line(&def.code)
    }

    fn class_def(&mut self, def: &Arc<ClassDef>) -> RenderResult {
        if !self.memo.should_render_class(def) {
            return Ok(());
        }
        self.indent();
        self.class_header(def)?;
        if def.body.is_empty() {
            self.text(" {}");
        } else {
            self.text(" {");
            self.nl();
            self.level += 1;
            self.sections(&def.body, false)?;
            self.level -= 1;
            self.indent();
            self.text("}");
        }
        self.nl();
        Ok(())
    }

    fn stmt_exp(&mut self, _stmt: &Stmt, exps: &[Exp]) -> RenderResult {
        self.indent();
        self.exp_list(exps)?;
        self.text(";");
        self.nl();
        Ok(())
    }

    fn stmt_code(&mut self, _stmt: &Stmt, stmts: &[Stmt]) -> RenderResult {
        self.indent();
        self.block(stmts)?;
        self.nl();
        Ok(())
    }

    fn stmt_return(&mut self, _stmt: &Stmt, exps: &[Exp]) -> RenderResult {
        self.indent();
        self.text("return");
        if !exps.is_empty() {
            self.text(" ");
            self.exp_list(exps)?;
        }
        self.text(";");
        self.nl();
        Ok(())
    }

    fn stmt_if(&mut self, _stmt: &Stmt, node: &StmtIf) -> RenderResult {
        self.indent();
        self.if_chain(node)
    }

    fn stmt_flow(&mut self, _stmt: &Stmt, node: &StmtFlow) -> RenderResult {
        if !node.is_do {
            return self.headed_body(node.kind.as_str(), &node.cond, &node.body);
        }
        self.indent();
        self.text("do");
        match self.body(&node.body)? {
            BodyEnd::Open => self.text(" "),
            BodyEnd::Closed => self.indent(),
        }
        self.text(node.kind.as_str());
        self.text("(");
        self.exp_list(&node.cond)?;
        self.text(");");
        self.nl();
        Ok(())
    }

    fn stmt_for(&mut self, _stmt: &Stmt, node: &StmtFor) -> RenderResult {
        self.indent();
        self.text("for(");
        self.nonl += 1;
        self.visit_stmt(&node.c1)?;
        self.text(" ");
        self.visit_stmt(&node.c2)?;
        if !node.c3.is_empty() {
            self.text(" ");
            self.exp_list(&node.c3)?;
        }
        self.text(")");
        self.nonl -= 1;
        self.body_line(&node.body)
    }

    fn stmt_auto(&mut self, _stmt: &Stmt, node: &StmtAuto) -> RenderResult {
        self.indent();
        self.text("for(auto ");
        self.text(&node.name);
        self.text(" : ");
        self.exp_list(&node.exp)?;
        self.text(")");
        self.body_line(&node.body)
    }

    fn stmt_loop(&mut self, _stmt: &Stmt, node: &StmtLoop) -> RenderResult {
        self.headed_body("repeat", &node.cond, &node.body)
    }

    fn stmt_switch(&mut self, _stmt: &Stmt, node: &StmtSwitch) -> RenderResult {
        self.headed_body("switch", &node.val, &node.body)
    }

    fn stmt_case(&mut self, _stmt: &Stmt, exps: &[Exp]) -> RenderResult {
        self.indent();
        self.text("case ");
        self.exp_list(exps)?;
        self.text(":");
        self.nl();
        Ok(())
    }

    fn stmt_enum(&mut self, _stmt: &Stmt, node: &StmtEnum) -> RenderResult {
        check_enum(RENDERER, node)?;
        self.indent();
        self.text("enum {");
        self.nl();
        self.level += 1;
        for (index, member) in node.members.iter().enumerate() {
            self.indent();
            self.text(member);
            if index + 1 < node.members.len() {
                self.text(",");
            }
            self.nl();
        }
        self.level -= 1;
        self.indent();
        self.text("}");
        if let Some(name) = &node.name {
            self.text(" ");
            self.text(name);
        }
        self.text(";");
        self.nl();
        Ok(())
    }

    fn stmt_typedef(&mut self, _stmt: &Stmt, node: &StmtTypedef) -> RenderResult {
        self.indent();
        self.typedef_line(node)?;
        self.nl();
        Ok(())
    }

    fn stmt_fptr(&mut self, _stmt: &Stmt, node: &StmtFptr) -> RenderResult {
        self.indent();
        self.fptr_line(node)?;
        self.nl();
        Ok(())
    }

    fn stmt_union(&mut self, _stmt: &Stmt, node: &StmtUnion) -> RenderResult {
        check_union(RENDERER, node)?;
        self.indent();
        if node.flags.contains(Flags::PRIVATE) {
            self.text("private ");
        }
        if node.flags.contains(Flags::STATIC) {
            self.text("static ");
        }
        self.text("union ");
        if let Some(name) = &node.type_name {
            self.text(name);
            self.text(" ");
        }
        self.text("{");
        self.nl();
        self.level += 1;
        for member in &node.members {
            self.indent();
            self.visit_exp(member)?;
            self.text(";");
            self.nl();
        }
        self.level -= 1;
        self.indent();
        self.text("}");
        if let Some(var) = &node.var_name {
            self.text(" ");
            self.text(var);
        }
        self.text(";");
        self.nl();
        Ok(())
    }

    fn stmt_jump(&mut self, _stmt: &Stmt, node: &StmtJump) -> RenderResult {
        self.indent();
        if node.is_label {
            self.text(&node.name);
            self.text(":");
        } else {
            self.text("goto ");
            self.text(&node.name);
            self.text(";");
        }
        self.nl();
        Ok(())
    }

    fn stmt_continue(&mut self, _stmt: &Stmt) -> RenderResult {
        self.indent();
        self.text("continue;");
        self.nl();
        Ok(())
    }

    fn stmt_break(&mut self, _stmt: &Stmt) -> RenderResult {
        self.indent();
        self.text("break;");
        self.nl();
        Ok(())
    }

    fn stmt_pp(&mut self, _stmt: &Stmt, node: &StmtPp) -> RenderResult {
        self.indent();
        self.text(node.kind.as_str());
        if let Some(data) = &node.data {
            self.text(" ");
            self.text(data);
        }
        self.nl();
        Ok(())
    }

    fn exp_primary(&mut self, _exp: &Exp, node: &Primary) -> RenderResult {
        match node {
            Primary::Id(name) => self.text(name),
            Primary::Num(value) => self.text(&value.to_string()),
            Primary::Float(value) => self.text(&float_literal(*value)),
            Primary::Str(raw) => {
                self.text("\"");
                self.text(raw);
                self.text("\"");
            }
            Primary::Char(raw) => {
                self.text("'");
                self.text(raw);
                self.text("'");
            }
            Primary::Array(items) => {
                let pad = items.first().map_or(false, Exp::is_array_literal);
                self.text(if pad { "[ " } else { "[" });
                self.exp_list(items)?;
                self.text(if pad { " ]" } else { "]" });
            }
            Primary::Hack(items) => {
                self.text("<<< ");
                self.exp_list(items)?;
                self.text(" >>>");
            }
            Primary::Complex(items) => {
                self.text("#(");
                self.exp_list(items)?;
                self.text(")");
            }
            Primary::Polar(items) => {
                self.text("%(");
                self.exp_list(items)?;
                self.text(")");
            }
            Primary::Vec(items) => {
                self.text("@(");
                self.exp_list(items)?;
                self.text(")");
            }
            Primary::Nil => self.text("()"),
        }
        Ok(())
    }

    fn exp_decl(&mut self, _exp: &Exp, node: &ExpDecl) -> RenderResult {
        self.type_decl(&node.td)?;
        self.text(" ");
        for (index, var) in node.vars.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.var_decl(var)?;
        }
        Ok(())
    }

    fn exp_unary(&mut self, _exp: &Exp, node: &ExpUnary) -> RenderResult {
        self.text(match node.op {
            UnaryOp::Spork => "spork ~ ",
            UnaryOp::New => "new ",
            op => op.as_str(),
        });
        match &node.operand {
            UnaryOperand::Exp(operand) => {
                // `-(-a)`: adjacent signs would lex as `--`
                let nested_sign = matches!(
                    &operand.kind,
                    ExpKind::Unary(inner) if inner.op.is_symbolic()
                );
                if node.op.is_symbolic() && nested_sign {
                    self.text("(");
                    self.visit_exp(operand)?;
                    self.text(")");
                    Ok(())
                } else {
                    self.operand(operand, prec::UNARY)
                }
            }
            UnaryOperand::Type(td) => self.type_decl(td),
            UnaryOperand::Code(code) => match &code.kind {
                StmtKind::Code(stmts) => self.block(stmts),
                _ => Err(RenderError::internal(
                    RENDERER,
                    "spork operand is a statement but not a block",
                )),
            },
        }
    }

    fn exp_binary(&mut self, _exp: &Exp, node: &ExpBinary) -> RenderResult {
        let strength = node.op.precedence();
        self.operand(&node.lhs, strength)?;
        self.text(" ");
        self.text(node.op.as_str());
        self.text(" ");
        self.operand(&node.rhs, strength + 1)
    }

    fn exp_postfix(&mut self, _exp: &Exp, node: &ExpPostfix) -> RenderResult {
        self.operand(&node.exp, prec::POSTFIX)?;
        self.text(node.op.as_str());
        Ok(())
    }

    fn exp_cast(&mut self, _exp: &Exp, node: &ExpCast) -> RenderResult {
        self.operand(&node.exp, prec::CAST)?;
        self.text(" $ ");
        self.type_decl(&node.td)
    }

    fn exp_call(&mut self, _exp: &Exp, node: &ExpCall) -> RenderResult {
        if !node.tmpl.is_empty() {
            self.type_args(&node.tmpl)?;
        }
        self.operand(&node.func, prec::POSTFIX)?;
        self.text("(");
        self.exp_list(&node.args)?;
        self.text(")");
        Ok(())
    }

    fn exp_array(&mut self, _exp: &Exp, node: &ExpArray) -> RenderResult {
        self.operand(&node.base, prec::POSTFIX)?;
        self.array_sub(&node.array)
    }

    fn exp_dot(&mut self, _exp: &Exp, node: &ExpDot) -> RenderResult {
        self.operand(&node.base, prec::POSTFIX)?;
        self.text(".");
        self.text(&node.name);
        Ok(())
    }

    fn exp_dur(&mut self, _exp: &Exp, node: &ExpDur) -> RenderResult {
        self.operand(&node.base, prec::DUR)?;
        self.text("::");
        self.operand(&node.unit, prec::DUR + 1)
    }

    fn exp_if(&mut self, _exp: &Exp, node: &ExpIf) -> RenderResult {
        self.operand(&node.cond, prec::OR)?;
        self.text(" ? ");
        self.operand(&node.if_exp, prec::LOWEST)?;
        self.text(" : ");
        self.operand(&node.else_exp, prec::TERNARY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmts(stmts: Vec<Stmt>) -> Ast {
        Ast::new(vec![Section::Stmts(stmts)])
    }

    fn render(ast: &Ast) -> String {
        format_ast(ast).unwrap().text
    }

    #[test]
    fn test_float_literals_stay_floats() {
        assert_eq!(float_literal(2.0), "2.0");
        assert_eq!(float_literal(2.5), "2.5");
        assert_eq!(float_literal(-3.0), "-3.0");
        assert_eq!(float_literal(1e300), "1.0e300");
        assert_eq!(float_literal(2.5e-7), "2.5e-7");
    }

    #[test]
    fn test_empty_statement_renders_semicolon() {
        assert_eq!(render(&stmts(vec![Stmt::exp(vec![])])), ";\n");
    }

    #[test]
    fn test_nested_negation_keeps_parentheses() {
        let exp = Exp::unary(UnaryOp::Neg, Exp::unary(UnaryOp::Neg, Exp::id("a")));
        assert_eq!(render(&stmts(vec![Stmt::exp(vec![exp])])), "-(-a);\n");
    }

    #[test]
    fn test_operand_parenthesised_by_strength() {
        let sum = Exp::binary(Exp::id("a"), BinaryOp::Add, Exp::id("b"));
        let product = Exp::binary(sum, BinaryOp::Mul, Exp::id("c"));
        assert_eq!(
            render(&stmts(vec![Stmt::exp(vec![product])])),
            "(a + b) * c;\n"
        );
    }

    #[test]
    fn test_long_line_warning() {
        let name = "x".repeat(90);
        let out = SourceFormatter::new()
            .render(&stmts(vec![Stmt::exp(vec![Exp::id(name)])]))
            .unwrap();
        assert_eq!(out.warnings, vec![LineWarning { line: 1, width: 91 }]);
    }

    #[test]
    fn test_wide_characters_measured_in_columns() {
        let options = FormatOptions {
            tab_len: 2,
            max_width: 4,
        };
        let ast = stmts(vec![Stmt::exp(vec![Exp::primary(Primary::Str(
            "日本".into(),
        ))])]);
        let out = SourceFormatter::with_options(options).render(&ast).unwrap();
        // `"日本";` is 7 columns wide but 9 bytes long
        assert_eq!(out.warnings, vec![LineWarning { line: 1, width: 7 }]);
    }

    #[test]
    fn test_empty_identifier_list_is_internal_error() {
        let td = TypeDecl {
            path: TypePath::Ids(IdList(vec![])),
            types: vec![],
            flags: Flags::NONE,
            array: None,
        };
        let ast = stmts(vec![Stmt::exp(vec![Exp::decl(td, vec![VarDecl::new("a")])])]);
        assert!(matches!(
            format_ast(&ast),
            Err(RenderError::Internal { .. })
        ));
    }

    #[test]
    fn test_signature_fragments_are_single_line() {
        let def = FuncDef {
            flags: Flags::STATIC | Flags::VARIADIC,
            template: None,
            td: TypeDecl::named("int"),
            name: "f".into(),
            args: vec![Arg::new(TypeDecl::named("float"), "x")],
            code: Stmt::code(vec![Stmt::new(StmtKind::Break)]),
            span: Span::default(),
        };
        assert_eq!(
            func_signature(&def).unwrap(),
            "function static int f(float x, ...)"
        );
    }
}

//! Tags emitter: one ctags-compatible record per declared symbol.
//!
//! Every node is walked so declarations nested in function bodies, control
//! flow and expressions are found. Search patterns are built from the
//! formatter's own signature fragments, so they match formatted source.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::format::{class_signature, decl_signature, fptr_signature, func_signature, typedef_signature};
use super::{check_enum, check_union, walk_stmt, AstVisitor, RenderError, RenderResult, TemplateMemo};
use crate::ast::*;
use crate::syntax::line_of;

const RENDERER: &str = "tags";

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagKind {
    Class,
    Function,
    /// Plain typedefs, function-pointer typedefs and named enums.
    Typedef,
    EnumMember,
    Union,
    Variable,
    Member,
}

impl TagKind {
    pub fn code(&self) -> char {
        match self {
            TagKind::Class => 'c',
            TagKind::Function => 'f',
            TagKind::Typedef => 't',
            TagKind::EnumMember => 'e',
            TagKind::Union => 'u',
            TagKind::Variable => 'v',
            TagKind::Member => 'm',
        }
    }
}

/// Where a symbol was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Scope {
    File,
    Class(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    pub name: String,
    pub file: String,
    /// A `/^...$/` search pattern or a line number.
    pub address: String,
    pub kind: TagKind,
    pub scope: Scope,
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{};\"\t{}",
            self.name,
            self.file,
            self.address,
            self.kind.code()
        )
    }
}

/// Indexes a whole tree. `source` supplies line numbers for the records
/// addressed by line; without it those records carry line 0.
pub fn tag_ast(ast: &Ast, file: &str, source: Option<&str>) -> Result<Vec<IndexRecord>, RenderError> {
    let mut emitter = TagEmitter::new(file, source);
    emitter.visit_ast(ast)?;
    Ok(emitter.finish())
}

/// `dir/a.gw` is indexed into `dir/a.gw.tag`.
pub fn tag_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tag");
    PathBuf::from(name)
}

/// Wraps a signature into a search pattern; the pattern never contains a
/// field separator or an unescaped delimiter.
pub fn search_pattern(signature: &str) -> String {
    let mut pattern = String::with_capacity(signature.len() + 4);
    pattern.push_str("/^");
    for ch in signature.chars() {
        match ch {
            '\\' => pattern.push_str("\\\\"),
            '/' => pattern.push_str("\\/"),
            '\t' | '\n' | '\r' => pattern.push(' '),
            _ => pattern.push(ch),
        }
    }
    pattern.push_str("$/");
    pattern
}

// ============================================================================
// EMITTER
// ============================================================================

pub struct TagEmitter<'a> {
    file: String,
    source: Option<&'a str>,
    line: usize,
    scopes: Vec<String>,
    records: Vec<IndexRecord>,
    memo: TemplateMemo,
}

impl<'a> TagEmitter<'a> {
    pub fn new(file: &str, source: Option<&'a str>) -> Self {
        TagEmitter {
            file: file.to_string(),
            source,
            line: 0,
            scopes: Vec::new(),
            records: Vec::new(),
            memo: TemplateMemo::new(),
        }
    }

    /// Records sorted by name; ties keep declaration order.
    pub fn finish(mut self) -> Vec<IndexRecord> {
        self.records.sort_by(|a, b| a.name.cmp(&b.name));
        self.records
    }

    fn line_at(&self, offset: usize) -> usize {
        self.source.map_or(0, |text| line_of(text, offset))
    }

    fn scope(&self) -> Scope {
        match self.scopes.last() {
            Some(class) => Scope::Class(class.clone()),
            None => Scope::File,
        }
    }

    fn variable_kind(&self) -> TagKind {
        if self.scopes.is_empty() {
            TagKind::Variable
        } else {
            TagKind::Member
        }
    }

    fn push(&mut self, name: &str, address: String, kind: TagKind) {
        let scope = self.scope();
        self.records.push(IndexRecord {
            name: name.to_string(),
            file: self.file.clone(),
            address,
            kind,
            scope,
        });
    }

    /// Records addressed by the line of the statement being walked.
    fn push_at_line(&mut self, name: &str, kind: TagKind) {
        let address = self.line.to_string();
        self.push(name, address, kind);
    }

    fn exps(&mut self, exps: &[Exp]) -> RenderResult {
        for exp in exps {
            self.visit_exp(exp)?;
        }
        Ok(())
    }
}

impl AstVisitor for TagEmitter<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) -> RenderResult {
        self.line = self.line_at(stmt.span.start);
        walk_stmt(self, stmt)
    }

    fn func_def(&mut self, def: &Arc<FuncDef>) -> RenderResult {
        if !self.memo.should_render_func(def) {
            return Ok(());
        }
        let signature = func_signature(def)?;
        self.push(&def.name, search_pattern(&format!("{} {{", signature)), TagKind::Function);
        self.visit_stmt(&def.code)
    }

    fn class_def(&mut self, def: &Arc<ClassDef>) -> RenderResult {
        if !self.memo.should_render_class(def) {
            return Ok(());
        }
        let signature = class_signature(def)?;
        self.push(&def.name, search_pattern(&format!("{} {{", signature)), TagKind::Class);
        self.scopes.push(def.name.clone());
        let walked = def
            .body
            .iter()
            .try_for_each(|section| self.visit_section(section));
        self.scopes.pop();
        walked
    }

    fn stmt_exp(&mut self, _stmt: &Stmt, exps: &[Exp]) -> RenderResult {
        self.exps(exps)
    }

    fn stmt_code(&mut self, _stmt: &Stmt, stmts: &[Stmt]) -> RenderResult {
        self.visit_stmt_list(stmts)
    }

    fn stmt_return(&mut self, _stmt: &Stmt, exps: &[Exp]) -> RenderResult {
        self.exps(exps)
    }

    fn stmt_if(&mut self, _stmt: &Stmt, node: &StmtIf) -> RenderResult {
        self.exps(&node.cond)?;
        self.visit_stmt(&node.if_body)?;
        if let Some(else_body) = &node.else_body {
            self.visit_stmt(else_body)?;
        }
        Ok(())
    }

    fn stmt_flow(&mut self, _stmt: &Stmt, node: &StmtFlow) -> RenderResult {
        self.exps(&node.cond)?;
        self.visit_stmt(&node.body)
    }

    fn stmt_for(&mut self, _stmt: &Stmt, node: &StmtFor) -> RenderResult {
        self.visit_stmt(&node.c1)?;
        self.visit_stmt(&node.c2)?;
        self.exps(&node.c3)?;
        self.visit_stmt(&node.body)
    }

    fn stmt_auto(&mut self, _stmt: &Stmt, node: &StmtAuto) -> RenderResult {
        let kind = self.variable_kind();
        self.push_at_line(&node.name, kind);
        self.exps(&node.exp)?;
        self.visit_stmt(&node.body)
    }

    fn stmt_loop(&mut self, _stmt: &Stmt, node: &StmtLoop) -> RenderResult {
        self.exps(&node.cond)?;
        self.visit_stmt(&node.body)
    }

    fn stmt_switch(&mut self, _stmt: &Stmt, node: &StmtSwitch) -> RenderResult {
        self.exps(&node.val)?;
        self.visit_stmt(&node.body)
    }

    fn stmt_case(&mut self, _stmt: &Stmt, exps: &[Exp]) -> RenderResult {
        self.exps(exps)
    }

    fn stmt_enum(&mut self, _stmt: &Stmt, node: &StmtEnum) -> RenderResult {
        check_enum(RENDERER, node)?;
        if let Some(name) = &node.name {
            self.push_at_line(name, TagKind::Typedef);
        }
        for member in &node.members {
            self.push_at_line(member, TagKind::EnumMember);
        }
        Ok(())
    }

    fn stmt_typedef(&mut self, _stmt: &Stmt, node: &StmtTypedef) -> RenderResult {
        let pattern = search_pattern(&typedef_signature(node)?);
        self.push(&node.name, pattern, TagKind::Typedef);
        Ok(())
    }

    fn stmt_fptr(&mut self, _stmt: &Stmt, node: &StmtFptr) -> RenderResult {
        let pattern = search_pattern(&fptr_signature(node)?);
        self.push(&node.name, pattern, TagKind::Typedef);
        Ok(())
    }

    fn stmt_union(&mut self, _stmt: &Stmt, node: &StmtUnion) -> RenderResult {
        check_union(RENDERER, node)?;
        if let Some(name) = &node.type_name {
            self.push_at_line(name, TagKind::Union);
        }
        if let Some(var) = &node.var_name {
            let kind = self.variable_kind();
            self.push_at_line(var, kind);
        }
        self.exps(&node.members)
    }

    fn stmt_jump(&mut self, _stmt: &Stmt, _node: &StmtJump) -> RenderResult {
        Ok(())
    }

    fn stmt_continue(&mut self, _stmt: &Stmt) -> RenderResult {
        Ok(())
    }

    fn stmt_break(&mut self, _stmt: &Stmt) -> RenderResult {
        Ok(())
    }

    fn stmt_pp(&mut self, _stmt: &Stmt, _node: &StmtPp) -> RenderResult {
        Ok(())
    }

    fn exp_primary(&mut self, _exp: &Exp, node: &Primary) -> RenderResult {
        match node {
            Primary::Array(items)
            | Primary::Hack(items)
            | Primary::Complex(items)
            | Primary::Polar(items)
            | Primary::Vec(items) => self.exps(items),
            Primary::Id(_)
            | Primary::Num(_)
            | Primary::Float(_)
            | Primary::Str(_)
            | Primary::Char(_)
            | Primary::Nil => Ok(()),
        }
    }

    fn exp_decl(&mut self, _exp: &Exp, node: &ExpDecl) -> RenderResult {
        let kind = self.variable_kind();
        for var in &node.vars {
            let pattern = search_pattern(&decl_signature(&node.td, var)?);
            self.push(&var.name, pattern, kind);
        }
        Ok(())
    }

    fn exp_unary(&mut self, _exp: &Exp, node: &ExpUnary) -> RenderResult {
        match &node.operand {
            UnaryOperand::Exp(operand) => self.visit_exp(operand),
            UnaryOperand::Code(code) => self.visit_stmt(code),
            UnaryOperand::Type(_) => Ok(()),
        }
    }

    fn exp_binary(&mut self, _exp: &Exp, node: &ExpBinary) -> RenderResult {
        self.visit_exp(&node.lhs)?;
        self.visit_exp(&node.rhs)
    }

    fn exp_postfix(&mut self, _exp: &Exp, node: &ExpPostfix) -> RenderResult {
        self.visit_exp(&node.exp)
    }

    fn exp_cast(&mut self, _exp: &Exp, node: &ExpCast) -> RenderResult {
        self.visit_exp(&node.exp)
    }

    fn exp_call(&mut self, _exp: &Exp, node: &ExpCall) -> RenderResult {
        self.visit_exp(&node.func)?;
        self.exps(&node.args)
    }

    fn exp_array(&mut self, _exp: &Exp, node: &ExpArray) -> RenderResult {
        self.visit_exp(&node.base)?;
        self.exps(&node.array.exps)
    }

    fn exp_dot(&mut self, _exp: &Exp, node: &ExpDot) -> RenderResult {
        self.visit_exp(&node.base)
    }

    fn exp_dur(&mut self, _exp: &Exp, node: &ExpDur) -> RenderResult {
        self.visit_exp(&node.base)?;
        self.visit_exp(&node.unit)
    }

    fn exp_if(&mut self, _exp: &Exp, node: &ExpIf) -> RenderResult {
        self.visit_exp(&node.cond)?;
        self.visit_exp(&node.if_exp)?;
        self.visit_exp(&node.else_exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_line_format() {
        let record = IndexRecord {
            name: "x".into(),
            file: "a.gw".into(),
            address: "/^int x$/".into(),
            kind: TagKind::Variable,
            scope: Scope::File,
        };
        assert_eq!(record.to_string(), "x\ta.gw\t/^int x$/;\"\tv");
    }

    #[test]
    fn test_pattern_escapes_delimiters() {
        assert_eq!(search_pattern("a/b\\c\td"), "/^a\\/b\\\\c d$/");
    }

    #[test]
    fn test_tag_path_appends_suffix() {
        assert_eq!(
            tag_path_for(Path::new("dir/a.gw")),
            PathBuf::from("dir/a.gw.tag")
        );
    }

    #[test]
    fn test_enum_records_use_line_numbers() {
        let source = "\nenum { a, b } E;";
        let stmt = Stmt::at(
            StmtKind::Enum(StmtEnum {
                members: vec!["a".into(), "b".into()],
                name: Some("E".into()),
            }),
            Span { start: 1, end: 17 },
        );
        let ast = Ast::new(vec![Section::Stmts(vec![stmt])]);
        let records = tag_ast(&ast, "e.gw", Some(source)).unwrap();
        let lines: Vec<String> = records.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            lines,
            vec!["E\te.gw\t2;\"\tt", "a\te.gw\t2;\"\te", "b\te.gw\t2;\"\te"]
        );
    }
}

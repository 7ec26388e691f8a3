//! Shared helpers for the integration tests: source-level shortcuts,
//! synthetic tree builders and the YAML fixture loader.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use walkdir::WalkDir;

use gwtools::ast::*;
use gwtools::render::{format_ast, tag_ast};
use gwtools::syntax::{parse, ScanOptions};

// ============================================================================
// SOURCE SHORTCUTS
// ============================================================================

pub fn parse_source(source: &str) -> Ast {
    parse(source, "test.gw", ScanOptions::default()).expect("source should parse")
}

pub fn format_source(source: &str) -> String {
    format_ast(&parse_source(source))
        .expect("tree should format")
        .text
}

pub fn format_lint(source: &str) -> String {
    let ast = parse(source, "test.gw", ScanOptions::lint()).expect("source should parse");
    format_ast(&ast).expect("tree should format").text
}

/// Tag lines exactly as they would be written to the `.tag` file.
pub fn tag_lines(source: &str, file: &str) -> Vec<String> {
    let ast = parse_source(source);
    tag_ast(&ast, file, Some(source))
        .expect("tree should index")
        .iter()
        .map(|record| record.to_string())
        .collect()
}

pub fn brace_balance(text: &str) -> (usize, usize) {
    (text.matches('{').count(), text.matches('}').count())
}

// ============================================================================
// SYNTHETIC TREES
// ============================================================================

pub fn named(name: &str) -> TypeDecl {
    TypeDecl::named(name)
}

pub fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind)
}

pub fn exp(kind: ExpKind) -> Exp {
    Exp::new(kind)
}

/// One expression of every kind and every primary form.
pub fn every_expression() -> Vec<Exp> {
    vec![
        Exp::id("a"),
        Exp::num(1),
        Exp::float(2.0),
        Exp::primary(Primary::Str("s".into())),
        Exp::primary(Primary::Char("c".into())),
        Exp::primary(Primary::Array(vec![Exp::primary(Primary::Array(vec![
            Exp::num(1),
        ]))])),
        Exp::primary(Primary::Hack(vec![Exp::id("a")])),
        Exp::primary(Primary::Complex(vec![Exp::num(1), Exp::num(2)])),
        Exp::primary(Primary::Polar(vec![Exp::num(1), Exp::num(2)])),
        Exp::primary(Primary::Vec(vec![Exp::num(1), Exp::num(2), Exp::num(3)])),
        Exp::primary(Primary::Nil),
        Exp::decl(named("int"), vec![VarDecl::new("d")]),
        Exp::unary(UnaryOp::Neg, Exp::id("a")),
        exp(ExpKind::Unary(ExpUnary {
            op: UnaryOp::New,
            operand: UnaryOperand::Type(named("Object")),
        })),
        exp(ExpKind::Unary(ExpUnary {
            op: UnaryOp::Spork,
            operand: UnaryOperand::Code(Box::new(Stmt::code(vec![Stmt::exp(vec![
                Exp::id("b"),
            ])]))),
        })),
        Exp::binary(Exp::id("a"), BinaryOp::Chuck, Exp::id("b")),
        exp(ExpKind::Postfix(ExpPostfix {
            exp: Box::new(Exp::id("a")),
            op: PostfixOp::Inc,
        })),
        exp(ExpKind::Cast(ExpCast {
            exp: Box::new(Exp::id("a")),
            td: named("float"),
        })),
        exp(ExpKind::Call(ExpCall {
            func: Box::new(Exp::id("f")),
            args: vec![Exp::num(1)],
            tmpl: vec![named("int")],
        })),
        exp(ExpKind::Array(ExpArray {
            base: Box::new(Exp::id("a")),
            array: ArraySub::sized(vec![Exp::num(0)]),
        })),
        Exp::dot(Exp::id("a"), "b"),
        exp(ExpKind::Dur(ExpDur {
            base: Box::new(Exp::num(1)),
            unit: Box::new(Exp::id("second")),
        })),
        exp(ExpKind::If(ExpIf {
            cond: Box::new(Exp::id("c")),
            if_exp: Box::new(Exp::num(1)),
            else_exp: Box::new(Exp::num(2)),
        })),
    ]
}

/// One statement of every kind.
pub fn every_statement() -> Vec<Stmt> {
    let body = || Box::new(Stmt::code(vec![Stmt::new(StmtKind::Break)]));
    vec![
        Stmt::exp(every_expression()),
        Stmt::exp(vec![]),
        Stmt::code(vec![Stmt::new(StmtKind::Continue)]),
        stmt(StmtKind::Return(vec![Exp::num(0)])),
        stmt(StmtKind::If(StmtIf {
            cond: vec![Exp::id("c")],
            if_body: body(),
            else_body: Some(Box::new(Stmt::exp(vec![Exp::id("x")]))),
        })),
        stmt(StmtKind::Flow(StmtFlow {
            kind: FlowKind::While,
            cond: vec![Exp::id("c")],
            body: body(),
            is_do: false,
        })),
        stmt(StmtKind::Flow(StmtFlow {
            kind: FlowKind::Until,
            cond: vec![Exp::id("c")],
            body: body(),
            is_do: true,
        })),
        stmt(StmtKind::For(StmtFor {
            c1: Box::new(Stmt::exp(vec![Exp::binary(
                Exp::num(0),
                BinaryOp::Chuck,
                Exp::decl(named("int"), vec![VarDecl::new("i")]),
            )])),
            c2: Box::new(Stmt::exp(vec![Exp::binary(
                Exp::id("i"),
                BinaryOp::Lt,
                Exp::num(3),
            )])),
            c3: vec![exp(ExpKind::Postfix(ExpPostfix {
                exp: Box::new(Exp::id("i")),
                op: PostfixOp::Inc,
            }))],
            body: body(),
        })),
        stmt(StmtKind::Auto(StmtAuto {
            name: "e".into(),
            exp: vec![Exp::id("list")],
            body: body(),
        })),
        stmt(StmtKind::Loop(StmtLoop {
            cond: vec![Exp::num(3)],
            body: body(),
        })),
        stmt(StmtKind::Switch(StmtSwitch {
            val: vec![Exp::id("v")],
            body: Box::new(Stmt::code(vec![
                stmt(StmtKind::Case(vec![Exp::num(1)])),
                Stmt::new(StmtKind::Break),
            ])),
        })),
        stmt(StmtKind::Enum(StmtEnum {
            members: vec!["A".into(), "B".into()],
            name: Some("E".into()),
        })),
        stmt(StmtKind::Typedef(StmtTypedef {
            td: named("float"),
            name: "Real".into(),
        })),
        stmt(StmtKind::Fptr(StmtFptr {
            td: named("void").with_flags(Flags::VARIADIC),
            name: "Cb".into(),
            args: vec![Arg::new(named("int"), "a")],
        })),
        stmt(StmtKind::Union(StmtUnion {
            flags: Flags::PRIVATE,
            type_name: Some("U".into()),
            members: vec![Exp::decl(named("int"), vec![VarDecl::new("i")])],
            var_name: Some("u".into()),
        })),
        stmt(StmtKind::Jump(StmtJump {
            name: "end".into(),
            is_label: false,
        })),
        stmt(StmtKind::Jump(StmtJump {
            name: "end".into(),
            is_label: true,
        })),
        stmt(StmtKind::Pp(StmtPp {
            kind: PpKind::Define,
            data: Some("X 1".into()),
        })),
    ]
}

pub fn func(name: &str, code: Vec<Stmt>) -> FuncDef {
    FuncDef {
        flags: Flags::NONE,
        template: None,
        td: named("void"),
        name: name.into(),
        args: vec![],
        code: Stmt::code(code),
        span: Span::default(),
    }
}

pub fn class(name: &str, body: Vec<Section>) -> ClassDef {
    ClassDef {
        name: name.into(),
        template: None,
        ext: None,
        body,
        span: Span::default(),
    }
}

/// A tree with every node kind at least once.
pub fn kitchen_sink() -> Ast {
    let mut templated = func("tmpl", vec![]);
    templated.template = Some(IdList::path(["T", "U"]));
    let method = func("m", every_statement());
    let member = Section::Stmts(vec![Stmt::exp(vec![Exp::decl(
        named("int"),
        vec![VarDecl::new("x")],
    )])]);
    Ast::new(vec![
        Section::Stmts(every_statement()),
        Section::Func(Arc::new(templated)),
        Section::Class(Arc::new(class(
            "K",
            vec![member, Section::Func(Arc::new(method))],
        ))),
    ])
}

// ============================================================================
// YAML FIXTURES
// ============================================================================

/// One fixture case. Exactly one of the `expect*` fields is expected.
#[derive(Debug, Deserialize, Clone)]
pub struct FixtureCase {
    pub name: String,
    pub input: String,
    /// Exact formatter output.
    pub expected: Option<String>,
    /// Exact tag lines, in order.
    pub expect_tags: Option<Vec<String>>,
    /// Substring of the parse error message.
    pub expect_error: Option<String>,
    #[serde(default)]
    pub lint: bool,
    #[serde(default)]
    pub skip: bool,
}

pub fn discover_yaml_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    files.sort();
    files
}

pub fn load_cases(path: &Path) -> Vec<FixtureCase> {
    let text = std::fs::read_to_string(path).expect("fixture should be readable");
    serde_yaml::from_str(&text)
        .unwrap_or_else(|e| panic!("{}: invalid fixture: {}", path.display(), e))
}

//! AST module for Gwion-style scripts
//!
//! The tree produced by [`crate::syntax::parse`] and consumed, read-only, by
//! the renderers in [`crate::render`]. Ordered sibling sequences (statement
//! lists, argument lists, declarators) are plain `Vec`s; order is meaningful.

// ============================================================================
// IMPORTS
// ============================================================================

use std::ops::BitOr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod op;

pub use op::{prec, BinaryOp, PostfixOp, UnaryOp};

// ============================================================================
// SOURCE LOCATIONS
// ============================================================================

/// Byte range of a node in its source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

// ============================================================================
// FLAGS
// ============================================================================

/// Independent modifier bits carried by types, unions and definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const PRIVATE: Flags = Flags(1);
    pub const STATIC: Flags = Flags(1 << 1);
    pub const REF: Flags = Flags(1 << 2);
    pub const VARIADIC: Flags = Flags(1 << 3);

    pub fn contains(&self, other: Flags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

// ============================================================================
// IDENTIFIER LISTS, TYPES AND ARRAY SUBSCRIPTS
// ============================================================================

/// Ordered identifiers: a dotted path (`a.b.c`) or a template parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdList(pub Vec<String>);

impl IdList {
    pub fn single(name: impl Into<String>) -> Self {
        IdList(vec![name.into()])
    }

    pub fn path<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdList(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Array dimensions. `exps[i]`, when present, sizes dimension `i`; the
/// remaining `depth - exps.len()` dimensions are open (`[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySub {
    pub exps: Vec<Exp>,
    pub depth: usize,
}

impl ArraySub {
    pub fn open(depth: usize) -> Self {
        ArraySub {
            exps: Vec::new(),
            depth,
        }
    }

    pub fn sized(exps: Vec<Exp>) -> Self {
        let depth = exps.len();
        ArraySub { exps, depth }
    }

    /// The expression sizing dimension `index`, if any.
    pub fn dim(&self, index: usize) -> Option<&Exp> {
        self.exps.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypePath {
    Ids(IdList),
    Typeof(IdList),
}

/// A type reference as written in declarations, casts, `new` and signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub path: TypePath,
    /// Generic type arguments (`“int, float”Map`), empty when absent.
    pub types: Vec<TypeDecl>,
    pub flags: Flags,
    pub array: Option<ArraySub>,
}

impl TypeDecl {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDecl {
            path: TypePath::Ids(IdList::single(name)),
            types: Vec::new(),
            flags: Flags::NONE,
            array: None,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn with_array(mut self, array: ArraySub) -> Self {
        self.array = Some(array);
        self
    }
}

/// One declarator: a name with optional array dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub array: Option<ArraySub>,
}

impl VarDecl {
    pub fn new(name: impl Into<String>) -> Self {
        VarDecl {
            name: name.into(),
            array: None,
        }
    }
}

/// A parameter of a function or function-pointer typedef.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub td: TypeDecl,
    pub var: VarDecl,
}

impl Arg {
    pub fn new(td: TypeDecl, name: impl Into<String>) -> Self {
        Arg {
            td,
            var: VarDecl::new(name),
        }
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exp {
    pub kind: ExpKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpKind {
    Primary(Primary),
    Decl(ExpDecl),
    Unary(ExpUnary),
    Binary(ExpBinary),
    Postfix(ExpPostfix),
    Cast(ExpCast),
    Call(ExpCall),
    Array(ExpArray),
    Dot(ExpDot),
    Dur(ExpDur),
    If(ExpIf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primary {
    Id(String),
    Num(i64),
    Float(f64),
    /// Raw text between the double quotes, escapes untouched.
    Str(String),
    /// Raw text between the single quotes, escapes untouched.
    Char(String),
    Array(Vec<Exp>),
    Hack(Vec<Exp>),
    Complex(Vec<Exp>),
    Polar(Vec<Exp>),
    Vec(Vec<Exp>),
    Nil,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpDecl {
    pub td: TypeDecl,
    pub vars: Vec<VarDecl>,
}

/// Operand of a unary expression; which one is used depends on the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnaryOperand {
    Exp(Box<Exp>),
    /// `new T`
    Type(TypeDecl),
    /// `spork ~ { ... }`
    Code(Box<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpUnary {
    pub op: UnaryOp,
    pub operand: UnaryOperand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpBinary {
    pub lhs: Box<Exp>,
    pub op: BinaryOp,
    pub rhs: Box<Exp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpPostfix {
    pub exp: Box<Exp>,
    pub op: PostfixOp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpCast {
    pub exp: Box<Exp>,
    pub td: TypeDecl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpCall {
    pub func: Box<Exp>,
    pub args: Vec<Exp>,
    /// Explicit template arguments (`“int”f(1)`), empty when absent.
    pub tmpl: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpArray {
    pub base: Box<Exp>,
    pub array: ArraySub,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpDot {
    pub base: Box<Exp>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpDur {
    pub base: Box<Exp>,
    pub unit: Box<Exp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpIf {
    pub cond: Box<Exp>,
    pub if_exp: Box<Exp>,
    pub else_exp: Box<Exp>,
}

impl Exp {
    pub fn new(kind: ExpKind) -> Self {
        Exp {
            kind,
            span: Span::default(),
        }
    }

    pub fn at(kind: ExpKind, span: Span) -> Self {
        Exp { kind, span }
    }

    pub fn primary(primary: Primary) -> Self {
        Exp::new(ExpKind::Primary(primary))
    }

    pub fn id(name: impl Into<String>) -> Self {
        Exp::primary(Primary::Id(name.into()))
    }

    pub fn num(value: i64) -> Self {
        Exp::primary(Primary::Num(value))
    }

    pub fn float(value: f64) -> Self {
        Exp::primary(Primary::Float(value))
    }

    pub fn decl(td: TypeDecl, vars: Vec<VarDecl>) -> Self {
        Exp::new(ExpKind::Decl(ExpDecl { td, vars }))
    }

    pub fn binary(lhs: Exp, op: BinaryOp, rhs: Exp) -> Self {
        Exp::new(ExpKind::Binary(ExpBinary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }))
    }

    pub fn unary(op: UnaryOp, operand: Exp) -> Self {
        Exp::new(ExpKind::Unary(ExpUnary {
            op,
            operand: UnaryOperand::Exp(Box::new(operand)),
        }))
    }

    pub fn call(func: Exp, args: Vec<Exp>) -> Self {
        Exp::new(ExpKind::Call(ExpCall {
            func: Box::new(func),
            args,
            tmpl: Vec::new(),
        }))
    }

    pub fn dot(base: Exp, name: impl Into<String>) -> Self {
        Exp::new(ExpKind::Dot(ExpDot {
            base: Box::new(base),
            name: name.into(),
        }))
    }

    /// Binding strength of this expression when it appears as an operand.
    pub fn precedence(&self) -> u8 {
        match &self.kind {
            ExpKind::Primary(_) => prec::PRIMARY,
            ExpKind::Decl(_) | ExpKind::If(_) => prec::TERNARY,
            ExpKind::Unary(_) => prec::UNARY,
            ExpKind::Binary(binary) => binary.op.precedence(),
            ExpKind::Cast(_) => prec::CAST,
            ExpKind::Dur(_) => prec::DUR,
            ExpKind::Postfix(_) | ExpKind::Call(_) | ExpKind::Array(_) | ExpKind::Dot(_) => {
                prec::POSTFIX
            }
        }
    }

    pub fn is_array_literal(&self) -> bool {
        matches!(self.kind, ExpKind::Primary(Primary::Array(_)))
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Expression statement; an empty list is the empty statement `;`.
    Exp(Vec<Exp>),
    Code(Vec<Stmt>),
    Return(Vec<Exp>),
    If(StmtIf),
    Flow(StmtFlow),
    For(StmtFor),
    Auto(StmtAuto),
    Loop(StmtLoop),
    Switch(StmtSwitch),
    Case(Vec<Exp>),
    Enum(StmtEnum),
    Typedef(StmtTypedef),
    Fptr(StmtFptr),
    Union(StmtUnion),
    Jump(StmtJump),
    Continue,
    Break,
    Pp(StmtPp),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtIf {
    pub cond: Vec<Exp>,
    pub if_body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    While,
    Until,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::While => "while",
            FlowKind::Until => "until",
        }
    }
}

/// `while`/`until`, either pre-condition or `do ... while(c);`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtFlow {
    pub kind: FlowKind,
    pub cond: Vec<Exp>,
    pub body: Box<Stmt>,
    pub is_do: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtFor {
    pub c1: Box<Stmt>,
    pub c2: Box<Stmt>,
    pub c3: Vec<Exp>,
    pub body: Box<Stmt>,
}

/// `for(auto name : exp) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtAuto {
    pub name: String,
    pub exp: Vec<Exp>,
    pub body: Box<Stmt>,
}

/// `repeat(cond) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtLoop {
    pub cond: Vec<Exp>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtSwitch {
    pub val: Vec<Exp>,
    pub body: Box<Stmt>,
}

/// `enum { a, b } Name;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtEnum {
    pub members: Vec<String>,
    pub name: Option<String>,
}

/// `typedef T Name;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtTypedef {
    pub td: TypeDecl,
    pub name: String,
}

/// `typedef R Name(args);` -- variadic when `td` carries [`Flags::VARIADIC`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtFptr {
    pub td: TypeDecl,
    pub name: String,
    pub args: Vec<Arg>,
}

/// `union Type { decls } var;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtUnion {
    pub flags: Flags,
    pub type_name: Option<String>,
    pub members: Vec<Exp>,
    pub var_name: Option<String>,
}

/// `goto name;` or `name:`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtJump {
    pub name: String,
    pub is_label: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PpKind {
    Comment,
    Include,
    Define,
    Undef,
    Ifdef,
    Ifndef,
    Else,
    Endif,
}

impl PpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PpKind::Comment => "//",
            PpKind::Include => "#include",
            PpKind::Define => "#define",
            PpKind::Undef => "#undef",
            PpKind::Ifdef => "#ifdef",
            PpKind::Ifndef => "#ifndef",
            PpKind::Else => "#else",
            PpKind::Endif => "#endif",
        }
    }

    /// Maps a directive keyword (without `#`) to its kind.
    pub fn from_directive(keyword: &str) -> Option<PpKind> {
        match keyword {
            "include" => Some(PpKind::Include),
            "define" => Some(PpKind::Define),
            "undef" => Some(PpKind::Undef),
            "ifdef" => Some(PpKind::Ifdef),
            "ifndef" => Some(PpKind::Ifndef),
            "else" => Some(PpKind::Else),
            "endif" => Some(PpKind::Endif),
            _ => None,
        }
    }
}

/// Preprocessor directive or (in lint mode) a line comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtPp {
    pub kind: PpKind,
    pub data: Option<String>,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            kind,
            span: Span::default(),
        }
    }

    pub fn at(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn exp(exps: Vec<Exp>) -> Self {
        Stmt::new(StmtKind::Exp(exps))
    }

    pub fn code(stmts: Vec<Stmt>) -> Self {
        Stmt::new(StmtKind::Code(stmts))
    }

    pub fn is_code(&self) -> bool {
        matches!(self.kind, StmtKind::Code(_))
    }
}

// ============================================================================
// DEFINITIONS AND SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    /// [`Flags::STATIC`] and [`Flags::VARIADIC`] apply here.
    pub flags: Flags,
    pub template: Option<IdList>,
    pub td: TypeDecl,
    pub name: String,
    pub args: Vec<Arg>,
    /// The body, a [`StmtKind::Code`] block when produced by the parser.
    pub code: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub template: Option<IdList>,
    pub ext: Option<TypeDecl>,
    pub body: Vec<Section>,
    pub span: Span,
}

/// A top-level unit (also the unit of a class body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Section {
    Stmts(Vec<Stmt>),
    Func(Arc<FuncDef>),
    Class(Arc<ClassDef>),
}

impl Section {
    pub fn is_definition(&self) -> bool {
        matches!(self, Section::Func(_) | Section::Class(_))
    }
}

/// The tree for one source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ast {
    pub sections: Vec<Section>,
}

impl Ast {
    pub fn new(sections: Vec<Section>) -> Self {
        Ast { sections }
    }
}

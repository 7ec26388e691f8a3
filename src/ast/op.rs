//! Operator table: typed operators, their source text and binding strength.
//!
//! Binding strength is what the formatter consults when it decides whether
//! an operand needs parentheses to re-parse into the same tree.

use serde::{Deserialize, Serialize};

// ============================================================================
// BINDING STRENGTH
// ============================================================================

/// Binding strength of an expression position, weakest first.
pub mod prec {
    pub const LOWEST: u8 = 0;
    pub const CHUCK: u8 = 1;
    /// Ternaries and inline declarations (both are chuck operands).
    pub const TERNARY: u8 = 2;
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const SOR: u8 = 5;
    pub const SXOR: u8 = 6;
    pub const SAND: u8 = 7;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const CAST: u8 = 13;
    pub const UNARY: u8 = 14;
    pub const DUR: u8 = 15;
    pub const POSTFIX: u8 = 16;
    pub const PRIMARY: u8 = 17;
}

// ============================================================================
// BINARY OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Chuck,
    AtChuck,
    PlusChuck,
    MinusChuck,
    TimesChuck,
    DivideChuck,
    ModuloChuck,
    Unchuck,
    Upchuck,
    Or,
    And,
    Sor,
    Sxor,
    Sand,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 27] = [
        BinaryOp::Chuck,
        BinaryOp::AtChuck,
        BinaryOp::PlusChuck,
        BinaryOp::MinusChuck,
        BinaryOp::TimesChuck,
        BinaryOp::DivideChuck,
        BinaryOp::ModuloChuck,
        BinaryOp::Unchuck,
        BinaryOp::Upchuck,
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Sor,
        BinaryOp::Sxor,
        BinaryOp::Sand,
        BinaryOp::Eq,
        BinaryOp::Neq,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Chuck => "=>",
            BinaryOp::AtChuck => "@=>",
            BinaryOp::PlusChuck => "+=>",
            BinaryOp::MinusChuck => "-=>",
            BinaryOp::TimesChuck => "*=>",
            BinaryOp::DivideChuck => "/=>",
            BinaryOp::ModuloChuck => "%=>",
            BinaryOp::Unchuck => "=<",
            BinaryOp::Upchuck => "=^",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Sor => "|",
            BinaryOp::Sxor => "^",
            BinaryOp::Sand => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// Looks an operator up by its source text.
    pub fn from_text(text: &str) -> Option<BinaryOp> {
        Self::ALL.iter().copied().find(|op| op.as_str() == text)
    }

    pub fn precedence(&self) -> u8 {
        use BinaryOp::*;
        match self {
            Chuck | AtChuck | PlusChuck | MinusChuck | TimesChuck | DivideChuck
            | ModuloChuck | Unchuck | Upchuck => prec::CHUCK,
            Or => prec::OR,
            And => prec::AND,
            Sor => prec::SOR,
            Sxor => prec::SXOR,
            Sand => prec::SAND,
            Eq | Neq => prec::EQUALITY,
            Lt | Le | Gt | Ge => prec::RELATIONAL,
            Shl | Shr => prec::SHIFT,
            Add | Sub => prec::ADDITIVE,
            Mul | Div | Mod => prec::MULTIPLICATIVE,
        }
    }
}

// ============================================================================
// UNARY AND POSTFIX OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    Inc,
    Dec,
    New,
    Spork,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Inc => "++",
            UnaryOp::Dec => "--",
            UnaryOp::New => "new",
            UnaryOp::Spork => "spork",
        }
    }

    pub fn from_text(text: &str) -> Option<UnaryOp> {
        match text {
            "-" => Some(UnaryOp::Neg),
            "!" => Some(UnaryOp::Not),
            "++" => Some(UnaryOp::Inc),
            "--" => Some(UnaryOp::Dec),
            "new" => Some(UnaryOp::New),
            "spork" => Some(UnaryOp::Spork),
            _ => None,
        }
    }

    /// Symbolic prefix operators sit directly against their operand.
    pub fn is_symbolic(&self) -> bool {
        !matches!(self, UnaryOp::New | UnaryOp::Spork)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_text_round_trips() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_text(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_chuck_binds_loosest() {
        assert!(BinaryOp::Chuck.precedence() < BinaryOp::Or.precedence());
        assert!(BinaryOp::Add.precedence() < BinaryOp::Mul.precedence());
    }

    #[test]
    fn test_unary_symbolic() {
        assert!(UnaryOp::Neg.is_symbolic());
        assert!(!UnaryOp::Spork.is_symbolic());
        assert_eq!(UnaryOp::from_text("new"), Some(UnaryOp::New));
    }
}

//! Gwion Parser
//!
//! Turns script text into an [`Ast`]. pest recognises the text; operator
//! precedence inside expressions is resolved by a Pratt parser over the flat
//! operand/operator stream the grammar produces.

use once_cell::sync::Lazy;
use pest::error::{Error, InputLocation};
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use std::iter::Peekable;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::debug;

use super::error::{SourceContext, SyntaxError};
use super::scanner::{scan, ScanOptions};
use crate::ast::*;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct GwionParser;

/// Operators from loosest to tightest binding.
static PRATT: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::chuck_op, Assoc::Left))
        .op(Op::infix(Rule::ternary_op, Assoc::Right))
        .op(Op::infix(Rule::or_op, Assoc::Left))
        .op(Op::infix(Rule::and_op, Assoc::Left))
        .op(Op::infix(Rule::sor_op, Assoc::Left))
        .op(Op::infix(Rule::sxor_op, Assoc::Left))
        .op(Op::infix(Rule::sand_op, Assoc::Left))
        .op(Op::infix(Rule::eq_op, Assoc::Left))
        .op(Op::infix(Rule::rel_op, Assoc::Left))
        .op(Op::infix(Rule::shift_op, Assoc::Left))
        .op(Op::infix(Rule::add_op, Assoc::Left))
        .op(Op::infix(Rule::mul_op, Assoc::Left))
        .op(Op::postfix(Rule::cast_op))
        .op(Op::prefix(Rule::unary_op) | Op::prefix(Rule::spork_op))
        .op(Op::infix(Rule::dur_op, Assoc::Left))
        .op(Op::prefix(Rule::call_tmpl))
        .op(Op::postfix(Rule::call_args)
            | Op::postfix(Rule::index_op)
            | Op::postfix(Rule::member_op)
            | Op::postfix(Rule::post_op))
});

type ParseResult<T> = Result<T, SyntaxError>;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses one script. `name` is only used in diagnostics.
///
/// In lint mode a kept comment may sit where no statement can start (inside
/// an argument list, before an `else`). The file is then parsed again with
/// every comment blanked.
pub fn parse(source: &str, name: &str, options: ScanOptions) -> ParseResult<Ast> {
    match parse_scanned(source, name, options) {
        Err(SyntaxError::Grammar { line, .. }) if options.lint => {
            debug!(file = name, line, "kept comments do not parse, dropping them");
            parse_scanned(source, name, ScanOptions::default())
        }
        result => result,
    }
}

fn parse_scanned(source: &str, name: &str, options: ScanOptions) -> ParseResult<Ast> {
    let ctx = SourceContext::new(name, source);
    let scanned = scan(source, options);
    if scanned.trim().is_empty() {
        return Ok(Ast::default());
    }

    let mut pairs = GwionParser::parse(Rule::program, &scanned)
        .map_err(|e| convert_parse_error(e, ctx))?;
    let program = pairs
        .next()
        .ok_or_else(|| ctx.malformed("program", Span::default()))?;

    let sections = build_sections(program.into_inner(), ctx)?;
    debug!(file = name, sections = sections.len(), lint = options.lint, "parsed");
    Ok(Ast::new(sections))
}

// ============================================================================
// SECTIONS AND DEFINITIONS
// ============================================================================

/// Groups consecutive statements into one [`Section::Stmts`].
fn build_sections<'i>(
    pairs: impl Iterator<Item = Pair<'i, Rule>>,
    ctx: SourceContext,
) -> ParseResult<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::EOI => {}
            Rule::func_def => sections.push(Section::Func(Arc::new(build_func_def(pair, ctx)?))),
            Rule::class_def => {
                sections.push(Section::Class(Arc::new(build_class_def(pair, ctx)?)))
            }
            _ => {
                let stmt = build_stmt(pair, ctx)?;
                match sections.last_mut() {
                    Some(Section::Stmts(stmts)) => stmts.push(stmt),
                    _ => sections.push(Section::Stmts(vec![stmt])),
                }
            }
        }
    }
    Ok(sections)
}

fn build_func_def(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<FuncDef> {
    let span = get_span(&pair);
    let mut flags = keyword_flags(&pair);
    let mut parts = Parts::of(pair);

    let template = parts.next_if(Rule::template).map(build_template);
    let td = build_type_decl(parts.next("return type", ctx)?, ctx)?;
    let name = parts.next("function name", ctx)?.as_str().to_string();
    let args = match parts.next_if(Rule::arg_list) {
        Some(list) => {
            let (args, variadic) = build_arg_list(list, ctx)?;
            if variadic {
                flags.insert(Flags::VARIADIC);
            }
            args
        }
        None => Vec::new(),
    };
    let code = build_stmt(parts.next("function body", ctx)?, ctx)?;

    Ok(FuncDef {
        flags,
        template,
        td,
        name,
        args,
        code,
        span,
    })
}

fn build_class_def(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<ClassDef> {
    let span = get_span(&pair);
    let mut parts = Parts::of(pair);

    let template = parts.next_if(Rule::template).map(build_template);
    let name = parts.next("class name", ctx)?.as_str().to_string();
    let ext = match parts.next_if(Rule::class_ext) {
        Some(ext) => Some(build_type_decl(Parts::of(ext).next("parent type", ctx)?, ctx)?),
        None => None,
    };
    let body = build_sections(parts.into_pairs(), ctx)?;

    Ok(ClassDef {
        name,
        template,
        ext,
        body,
        span,
    })
}

fn build_template(pair: Pair<Rule>) -> IdList {
    IdList::path(
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::ident)
            .map(|p| p.as_str()),
    )
}

fn build_arg_list(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<(Vec<Arg>, bool)> {
    let mut args = Vec::new();
    let mut variadic = false;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::arg => {
                let mut inner = Parts::of(part);
                let td = build_type_decl(inner.next("argument type", ctx)?, ctx)?;
                let var = build_var_decl(inner.next("argument name", ctx)?, ctx)?;
                args.push(Arg { td, var });
            }
            Rule::ellipsis => variadic = true,
            rule => return Err(unexpected(rule, &part, ctx)),
        }
    }
    Ok((args, variadic))
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn build_stmt(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<Stmt> {
    let span = get_span(&pair);
    let rule = pair.as_rule();
    let until = has_child(&pair, Rule::kw_until);
    let flags = keyword_flags(&pair);
    let mut parts = Parts::of(pair);

    let kind = match rule {
        Rule::code_block => StmtKind::Code(
            parts
                .into_pairs()
                .map(|p| build_stmt(p, ctx))
                .collect::<ParseResult<_>>()?,
        ),

        Rule::exp_stmt => StmtKind::Exp(parts.exp_list(ctx)?),

        Rule::if_stmt => {
            let cond = build_exp_list(parts.next("condition", ctx)?, ctx)?;
            let if_body = build_stmt(parts.next("if body", ctx)?, ctx)?;
            let else_body = match parts.next_any() {
                Some(body) => Some(Box::new(build_stmt(body, ctx)?)),
                None => None,
            };
            StmtKind::If(StmtIf {
                cond,
                if_body: Box::new(if_body),
                else_body,
            })
        }

        Rule::flow_stmt | Rule::do_stmt => {
            let is_do = rule == Rule::do_stmt;
            let (cond, body) = if is_do {
                let body = build_stmt(parts.next("loop body", ctx)?, ctx)?;
                (build_exp_list(parts.next("condition", ctx)?, ctx)?, body)
            } else {
                let cond = build_exp_list(parts.next("condition", ctx)?, ctx)?;
                (cond, build_stmt(parts.next("loop body", ctx)?, ctx)?)
            };
            StmtKind::Flow(StmtFlow {
                kind: if until { FlowKind::Until } else { FlowKind::While },
                cond,
                body: Box::new(body),
                is_do,
            })
        }

        Rule::for_stmt => {
            let c1 = build_stmt(parts.next("initializer", ctx)?, ctx)?;
            let c2 = build_stmt(parts.next("condition", ctx)?, ctx)?;
            let c3 = match parts.next_if(Rule::exp_list) {
                Some(list) => build_exp_list(list, ctx)?,
                None => Vec::new(),
            };
            let body = build_stmt(parts.next("loop body", ctx)?, ctx)?;
            StmtKind::For(StmtFor {
                c1: Box::new(c1),
                c2: Box::new(c2),
                c3,
                body: Box::new(body),
            })
        }

        Rule::foreach_stmt => {
            let name = parts.next("loop variable", ctx)?.as_str().to_string();
            let exp = build_exp_list(parts.next("iterated expression", ctx)?, ctx)?;
            let body = build_stmt(parts.next("loop body", ctx)?, ctx)?;
            StmtKind::Auto(StmtAuto {
                name,
                exp,
                body: Box::new(body),
            })
        }

        Rule::loop_stmt => {
            let cond = build_exp_list(parts.next("repeat count", ctx)?, ctx)?;
            let body = build_stmt(parts.next("loop body", ctx)?, ctx)?;
            StmtKind::Loop(StmtLoop {
                cond,
                body: Box::new(body),
            })
        }

        Rule::switch_stmt => {
            let val = build_exp_list(parts.next("switch value", ctx)?, ctx)?;
            let body = build_stmt(parts.next("switch body", ctx)?, ctx)?;
            StmtKind::Switch(StmtSwitch {
                val,
                body: Box::new(body),
            })
        }

        Rule::case_stmt => StmtKind::Case(build_exp_list(parts.next("case value", ctx)?, ctx)?),
        Rule::return_stmt => StmtKind::Return(parts.exp_list(ctx)?),
        Rule::break_stmt => StmtKind::Break,
        Rule::continue_stmt => StmtKind::Continue,

        Rule::goto_stmt | Rule::label_stmt => StmtKind::Jump(StmtJump {
            name: parts.next("label", ctx)?.as_str().to_string(),
            is_label: rule == Rule::label_stmt,
        }),

        Rule::enum_stmt => {
            let mut members = Vec::new();
            let mut name = None;
            for part in parts.into_pairs() {
                match part.as_rule() {
                    Rule::enum_name => name = Some(part.as_str().trim().to_string()),
                    _ => members.push(part.as_str().to_string()),
                }
            }
            StmtKind::Enum(StmtEnum { members, name })
        }

        Rule::typedef_stmt => {
            let td = build_type_decl(parts.next("aliased type", ctx)?, ctx)?;
            let name = parts.next("alias name", ctx)?.as_str().to_string();
            StmtKind::Typedef(StmtTypedef { td, name })
        }

        Rule::fptr_stmt => {
            let mut td = build_type_decl(parts.next("return type", ctx)?, ctx)?;
            let name = parts.next("function pointer name", ctx)?.as_str().to_string();
            let args = match parts.next_if(Rule::arg_list) {
                Some(list) => {
                    let (args, variadic) = build_arg_list(list, ctx)?;
                    if variadic {
                        td.flags.insert(Flags::VARIADIC);
                    }
                    args
                }
                None => Vec::new(),
            };
            StmtKind::Fptr(StmtFptr { td, name, args })
        }

        Rule::union_stmt => {
            let mut type_name = None;
            let mut var_name = None;
            let mut members = Vec::new();
            for part in parts.into_pairs() {
                match part.as_rule() {
                    Rule::union_name => type_name = Some(part.as_str().trim().to_string()),
                    Rule::union_var => var_name = Some(part.as_str().trim().to_string()),
                    Rule::decl => members.push(build_decl(part, ctx)?),
                    rule => return Err(unexpected(rule, &part, ctx)),
                }
            }
            StmtKind::Union(StmtUnion {
                flags,
                type_name,
                members,
                var_name,
            })
        }

        Rule::pp_comment => StmtKind::Pp(StmtPp {
            kind: PpKind::Comment,
            data: parts.payload(),
        }),

        Rule::pp_directive => {
            let keyword = parts.next("directive", ctx)?;
            let kind = PpKind::from_directive(keyword.as_str())
                .ok_or_else(|| ctx.malformed("preprocessor directive", get_span(&keyword)))?;
            StmtKind::Pp(StmtPp {
                kind,
                data: parts.payload(),
            })
        }

        other => {
            return Err(ctx.malformed(format!("statement ({:?})", other), span));
        }
    };

    Ok(Stmt::at(kind, span))
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn build_exp_list(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<Vec<Exp>> {
    pair.into_inner().map(|p| build_exp(p, ctx)).collect()
}

fn build_exp(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<Exp> {
    PRATT
        .map_primary(|primary| build_primary(primary, ctx))
        .map_prefix(|op, rhs| build_prefix(op, rhs?, ctx))
        .map_postfix(|lhs, op| build_postfix(lhs?, op, ctx))
        .map_infix(|lhs, op, rhs| build_infix(lhs?, op, rhs?, ctx))
        .parse(pair.into_inner())
}

fn build_primary(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<Exp> {
    let span = get_span(&pair);
    let rule = pair.as_rule();
    let text = pair.as_str();

    let kind = match rule {
        Rule::decl => return build_decl(pair, ctx),
        Rule::paren => return build_exp(Parts::of(pair).next("expression", ctx)?, ctx),
        Rule::ident => ExpKind::Primary(Primary::Id(text.to_string())),

        Rule::integer => {
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => i64::from_str_radix(hex, 16),
                None => text.parse::<i64>(),
            };
            let value = parsed.map_err(|_| ctx.literal("integer", text, span))?;
            ExpKind::Primary(Primary::Num(value))
        }

        Rule::float => {
            let value = text
                .parse::<f64>()
                .map_err(|_| ctx.literal("float", text, span))?;
            ExpKind::Primary(Primary::Float(value))
        }

        Rule::string => ExpKind::Primary(Primary::Str(strip_delimiters(text))),
        Rule::char_lit => ExpKind::Primary(Primary::Char(strip_delimiters(text))),
        Rule::nil => ExpKind::Primary(Primary::Nil),

        Rule::array_lit => {
            let mut parts = Parts::of(pair);
            ExpKind::Primary(Primary::Array(parts.exp_list(ctx)?))
        }

        Rule::hack | Rule::complex | Rule::polar | Rule::vector => {
            let exps = build_exp_list(Parts::of(pair).next("expression list", ctx)?, ctx)?;
            ExpKind::Primary(match rule {
                Rule::hack => Primary::Hack(exps),
                Rule::complex => Primary::Complex(exps),
                Rule::polar => Primary::Polar(exps),
                _ => Primary::Vec(exps),
            })
        }

        Rule::new_exp => {
            let td = build_type_decl(Parts::of(pair).next("type", ctx)?, ctx)?;
            ExpKind::Unary(ExpUnary {
                op: UnaryOp::New,
                operand: UnaryOperand::Type(td),
            })
        }

        Rule::spork_code => {
            let code = build_stmt(Parts::of(pair).next("code block", ctx)?, ctx)?;
            ExpKind::Unary(ExpUnary {
                op: UnaryOp::Spork,
                operand: UnaryOperand::Code(Box::new(code)),
            })
        }

        other => return Err(unexpected(other, &pair, ctx)),
    };

    Ok(Exp::at(kind, span))
}

fn build_prefix(op: Pair<Rule>, rhs: Exp, ctx: SourceContext) -> ParseResult<Exp> {
    let op_span = get_span(&op);
    let span = join(op_span, rhs.span);

    let unary = match op.as_rule() {
        Rule::unary_op => UnaryOp::from_text(op.as_str())
            .ok_or_else(|| ctx.malformed("prefix operator", op_span))?,
        Rule::spork_op => UnaryOp::Spork,
        Rule::call_tmpl => {
            let types = build_type_args(Parts::of(op).next("template arguments", ctx)?, ctx)?;
            let mut rhs = rhs;
            match innermost_call(&mut rhs) {
                Some(call) if !call.tmpl.is_empty() => {
                    return Err(ctx.malformed("duplicate template arguments", span))
                }
                Some(call) => call.tmpl = types,
                None => return Err(ctx.malformed("template arguments without a call", span)),
            }
            rhs.span = span;
            return Ok(rhs);
        }
        other => return Err(unexpected(other, &op, ctx)),
    };

    Ok(Exp::at(
        ExpKind::Unary(ExpUnary {
            op: unary,
            operand: UnaryOperand::Exp(Box::new(rhs)),
        }),
        span,
    ))
}

fn build_postfix(lhs: Exp, op: Pair<Rule>, ctx: SourceContext) -> ParseResult<Exp> {
    let span = join(lhs.span, get_span(&op));
    let rule = op.as_rule();

    let kind = match rule {
        Rule::call_args => {
            let mut parts = Parts::of(op);
            ExpKind::Call(ExpCall {
                func: Box::new(lhs),
                args: parts.exp_list(ctx)?,
                tmpl: Vec::new(),
            })
        }

        Rule::index_op => {
            let index = build_exp(Parts::of(op).next("index", ctx)?, ctx)?;
            match lhs.kind {
                ExpKind::Array(mut array) => {
                    array.array.exps.push(index);
                    array.array.depth += 1;
                    ExpKind::Array(array)
                }
                kind => ExpKind::Array(ExpArray {
                    base: Box::new(Exp::at(kind, lhs.span)),
                    array: ArraySub::sized(vec![index]),
                }),
            }
        }

        Rule::member_op => ExpKind::Dot(ExpDot {
            base: Box::new(lhs),
            name: Parts::of(op).next("member name", ctx)?.as_str().to_string(),
        }),

        Rule::post_op => ExpKind::Postfix(ExpPostfix {
            exp: Box::new(lhs),
            op: if op.as_str() == "++" {
                PostfixOp::Inc
            } else {
                PostfixOp::Dec
            },
        }),

        Rule::cast_op => ExpKind::Cast(ExpCast {
            exp: Box::new(lhs),
            td: build_type_decl(Parts::of(op).next("cast type", ctx)?, ctx)?,
        }),

        other => return Err(unexpected(other, &op, ctx)),
    };

    Ok(Exp::at(kind, span))
}

fn build_infix(lhs: Exp, op: Pair<Rule>, rhs: Exp, ctx: SourceContext) -> ParseResult<Exp> {
    let span = join(lhs.span, rhs.span);

    let kind = match op.as_rule() {
        Rule::ternary_op => ExpKind::If(ExpIf {
            cond: Box::new(lhs),
            if_exp: Box::new(build_exp(Parts::of(op).next("ternary branch", ctx)?, ctx)?),
            else_exp: Box::new(rhs),
        }),
        Rule::dur_op => ExpKind::Dur(ExpDur {
            base: Box::new(lhs),
            unit: Box::new(rhs),
        }),
        _ => {
            let binary = BinaryOp::from_text(op.as_str())
                .ok_or_else(|| ctx.malformed("binary operator", get_span(&op)))?;
            ExpKind::Binary(ExpBinary {
                lhs: Box::new(lhs),
                op: binary,
                rhs: Box::new(rhs),
            })
        }
    };

    Ok(Exp::at(kind, span))
}

/// The call explicit template arguments belong to: the innermost call of a
/// postfix chain (`“int”f(1)(2)` binds to `f(1)`).
fn innermost_call(exp: &mut Exp) -> Option<&mut ExpCall> {
    match &mut exp.kind {
        ExpKind::Call(call) => {
            if contains_call(&call.func) {
                innermost_call(&mut call.func)
            } else {
                Some(call)
            }
        }
        ExpKind::Dot(ExpDot { base, .. }) | ExpKind::Array(ExpArray { base, .. }) => {
            innermost_call(base)
        }
        ExpKind::Postfix(postfix) => innermost_call(&mut postfix.exp),
        _ => None,
    }
}

fn contains_call(exp: &Exp) -> bool {
    match &exp.kind {
        ExpKind::Call(_) => true,
        ExpKind::Dot(ExpDot { base, .. }) | ExpKind::Array(ExpArray { base, .. }) => {
            contains_call(base)
        }
        ExpKind::Postfix(postfix) => contains_call(&postfix.exp),
        _ => false,
    }
}

// ============================================================================
// DECLARATIONS AND TYPES
// ============================================================================

fn build_decl(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<Exp> {
    let span = get_span(&pair);
    let mut parts = Parts::of(pair);
    let td = build_type_decl(parts.next("declared type", ctx)?, ctx)?;
    let vars = parts
        .into_pairs()
        .map(|p| build_var_decl(p, ctx))
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(Exp::at(ExpKind::Decl(ExpDecl { td, vars }), span))
}

fn build_var_decl(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<VarDecl> {
    let mut parts = Parts::of(pair);
    let name = parts.next("variable name", ctx)?.as_str().to_string();
    let array = match parts.next_if(Rule::array_sub) {
        Some(sub) => Some(build_array_sub(sub, ctx)?),
        None => None,
    };
    Ok(VarDecl { name, array })
}

fn build_type_decl(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<TypeDecl> {
    let span = get_span(&pair);
    let mut flags = Flags::NONE;
    let mut types = Vec::new();
    let mut path = None;
    let mut array = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::kw_private => flags.insert(Flags::PRIVATE),
            Rule::kw_static => flags.insert(Flags::STATIC),
            Rule::ref_flag => flags.insert(Flags::REF),
            Rule::type_args => types = build_type_args(part, ctx)?,
            Rule::id_path => path = Some(TypePath::Ids(build_id_path(part))),
            Rule::typeof_path => {
                let ids = Parts::of(part).next("typeof path", ctx)?;
                path = Some(TypePath::Typeof(build_id_path(ids)));
            }
            Rule::array_sub => array = Some(build_array_sub(part, ctx)?),
            rule => return Err(unexpected(rule, &part, ctx)),
        }
    }

    let path = path.ok_or_else(|| ctx.malformed("type", span))?;
    Ok(TypeDecl {
        path,
        types,
        flags,
        array,
    })
}

fn build_type_args(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<Vec<TypeDecl>> {
    pair.into_inner().map(|p| build_type_decl(p, ctx)).collect()
}

fn build_id_path(pair: Pair<Rule>) -> IdList {
    IdList::path(pair.into_inner().map(|p| p.as_str()))
}

/// Sized dimensions must come before open ones (`[2][]`, never `[][2]`).
fn build_array_sub(pair: Pair<Rule>, ctx: SourceContext) -> ParseResult<ArraySub> {
    let mut sub = ArraySub::open(0);
    for dim in pair.into_inner() {
        let dim_span = get_span(&dim);
        sub.depth += 1;
        if let Some(exp) = dim.into_inner().next() {
            if sub.exps.len() + 1 != sub.depth {
                return Err(ctx.malformed("array dimensions: sized after open", dim_span));
            }
            sub.exps.push(build_exp(exp, ctx)?);
        }
    }
    Ok(sub)
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Children of a pair with keyword tokens dropped.
struct Parts<'i> {
    iter: Peekable<IntoIter<Pair<'i, Rule>>>,
    span: crate::ast::Span,
}

impl<'i> Parts<'i> {
    fn of(pair: Pair<'i, Rule>) -> Self {
        let span = get_span(&pair);
        let children: Vec<_> = pair
            .into_inner()
            .filter(|p| !is_keyword(p.as_rule()))
            .collect();
        Parts {
            iter: children.into_iter().peekable(),
            span,
        }
    }

    fn next(&mut self, what: &str, ctx: SourceContext) -> ParseResult<Pair<'i, Rule>> {
        self.iter
            .next()
            .ok_or_else(|| ctx.malformed(format!("construct: missing {}", what), self.span))
    }

    fn next_any(&mut self) -> Option<Pair<'i, Rule>> {
        self.iter.next()
    }

    fn next_if(&mut self, rule: Rule) -> Option<Pair<'i, Rule>> {
        self.iter.next_if(|p| p.as_rule() == rule)
    }

    /// An optional `exp_list`, empty when absent.
    fn exp_list(&mut self, ctx: SourceContext) -> ParseResult<Vec<Exp>> {
        match self.next_if(Rule::exp_list) {
            Some(list) => build_exp_list(list, ctx),
            None => Ok(Vec::new()),
        }
    }

    /// Trimmed directive payload; `None` when blank.
    fn payload(&mut self) -> Option<String> {
        self.next_if(Rule::pp_payload)
            .map(|p| p.as_str().trim().to_string())
            .filter(|data| !data.is_empty())
    }

    fn into_pairs(self) -> impl Iterator<Item = Pair<'i, Rule>> {
        self.iter
    }
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_auto
            | Rule::kw_break
            | Rule::kw_case
            | Rule::kw_class
            | Rule::kw_continue
            | Rule::kw_do
            | Rule::kw_else
            | Rule::kw_enum
            | Rule::kw_extends
            | Rule::kw_for
            | Rule::kw_function
            | Rule::kw_goto
            | Rule::kw_if
            | Rule::kw_new
            | Rule::kw_private
            | Rule::kw_repeat
            | Rule::kw_return
            | Rule::kw_spork
            | Rule::kw_static
            | Rule::kw_switch
            | Rule::kw_template
            | Rule::kw_typedef
            | Rule::kw_typeof
            | Rule::kw_union
            | Rule::kw_until
            | Rule::kw_while
    )
}

fn has_child(pair: &Pair<Rule>, rule: Rule) -> bool {
    pair.clone().into_inner().any(|p| p.as_rule() == rule)
}

/// `private`/`static` written directly on a definition or union.
fn keyword_flags(pair: &Pair<Rule>) -> Flags {
    let mut flags = Flags::NONE;
    for child in pair.clone().into_inner() {
        match child.as_rule() {
            Rule::kw_private => flags.insert(Flags::PRIVATE),
            Rule::kw_static => flags.insert(Flags::STATIC),
            _ => {}
        }
    }
    flags
}

fn strip_delimiters(text: &str) -> String {
    text.get(1..text.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string()
}

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn join(a: Span, b: Span) -> Span {
    Span {
        start: a.start.min(b.start),
        end: a.end.max(b.end),
    }
}

fn unexpected(rule: Rule, pair: &Pair<Rule>, ctx: SourceContext) -> SyntaxError {
    ctx.malformed(format!("construct: unexpected {:?}", rule), get_span(pair))
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, ctx: SourceContext) -> SyntaxError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        InputLocation::Span((start, end)) => Span { start, end },
    };

    let message = error.variant.message().into_owned();
    ctx.grammar(message, span)
}

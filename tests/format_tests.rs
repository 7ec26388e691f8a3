// tests/format_tests.rs

mod common;

use std::sync::Arc;

use common::{brace_balance, format_lint, format_source, kitchen_sink, parse_source};
use gwtools::ast::*;
use gwtools::render::{format_ast, FormatOptions, SourceFormatter};

const PROGRAM: &str = r#"#include "std.gw"
enum { RED, GREEN, BLUE } Color;
typedef float Real;
typedef int Callback(int a, float b);
union Value { int i; float f; } v;
class Point extends Object {
  float x, y;
  function float norm() { return x * x + y * y; }
}
function void count(int n) {
  for(0 => int i; i < n; i++) {
    if(i % 2 == 0) <<< i >>>;
    else { continue; }
  }
  while(n > 0) n--;
  do { n++; } until(n > 3);
  repeat(3) <<< "tick" >>>;
  for(auto e : [1, 2, 3]) <<< e >>>;
  spork ~ { 1::second => now; };
}
1::second => now;
"#;

const PROGRAM_FORMATTED: &str = r#"#include "std.gw"
enum {
  RED,
  GREEN,
  BLUE
} Color;
typedef float Real;
typedef int Callback(int a, float b);
union Value {
  int i;
  float f;
} v;
class Point extends Object {
  float x, y;
  function float norm() {
    return x * x + y * y;
  }
}

function void count(int n) {
  for(0 => int i; i < n; i++) {
    if(i % 2 == 0)
      <<< i >>>;
    else {
      continue;
    }
  }
  while(n > 0)
    n--;
  do {
    n++;
  } until(n > 3);
  repeat(3)
    <<< "tick" >>>;
  for(auto e : [1, 2, 3])
    <<< e >>>;
  spork ~ {
    1::second => now;
  };
}

1::second => now;
"#;

// ---
// Canonical layout
// ---

#[test]
fn test_class_scenario() {
    let out = format_source("class A { int x; function void f() { return; } }");
    assert_eq!(
        out,
        "class A {\n  int x;\n  function void f() {\n    return;\n  }\n}\n\n"
    );
}

#[test]
fn test_program_layout() {
    assert_eq!(format_source(PROGRAM), PROGRAM_FORMATTED);
}

#[test]
fn test_formatting_is_a_fixpoint() {
    let once = format_source(PROGRAM);
    let twice = format_source(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_braces_balance() {
    let (open, close) = brace_balance(&format_source(PROGRAM));
    assert_eq!(open, close);
}

#[test]
fn test_else_if_chain() {
    let out = format_source("if(a) { 1; } else if(b) 2; else { 3; }");
    assert_eq!(out, "if(a) {\n  1;\n} else if(b)\n  2;\nelse {\n  3;\n}\n");
}

#[test]
fn test_empty_blocks_and_statements() {
    assert_eq!(format_source(";"), ";\n");
    assert_eq!(format_source("{}"), "{}\n");
    assert_eq!(format_source("class E {}"), "class E {}\n\n");
}

#[test]
fn test_definitions_separated_inside_class() {
    let out = format_source("class C { function void a() {} int x; }");
    assert_eq!(out, "class C {\n  function void a() {}\n\n  int x;\n}\n\n");
}

#[test]
fn test_switch_and_case() {
    let out = format_source("switch(v) { case 1: break; }");
    assert_eq!(out, "switch(v) {\n  case 1:\n  break;\n}\n");
}

// ---
// Literals and expressions
// ---

#[test]
fn test_float_literals() {
    let out = format_source("2.0 => float f;\n2.5 => float g;\n2. => float h;");
    assert_eq!(
        out,
        "2.0 => float f;\n2.5 => float g;\n2.0 => float h;\n"
    );
}

#[test]
fn test_nested_array_literal_padding() {
    let out = format_source("[[1]] @=> int a[][];\n[1] @=> int b[];");
    assert_eq!(out, "[ [1] ] @=> int a[][];\n[1] @=> int b[];\n");
}

#[test]
fn test_parentheses_follow_binding_strength() {
    assert_eq!(format_source("(1 + 2) * 3;"), "(1 + 2) * 3;\n");
    assert_eq!(format_source("1 - (2 - 3);"), "1 - (2 - 3);\n");
    assert_eq!(format_source("1 - 2 - 3;"), "1 - 2 - 3;\n");
    assert_eq!(format_source("-(-a);"), "-(-a);\n");
}

#[test]
fn test_ternary_chain() {
    assert_eq!(format_source("a ? 1 : b ? 2 : 3;"), "a ? 1 : b ? 2 : 3;\n");
}

#[test]
fn test_declaration_inside_list_is_wrapped() {
    let ast = Ast::new(vec![Section::Stmts(vec![Stmt::exp(vec![
        Exp::decl(TypeDecl::named("int"), vec![VarDecl::new("a")]),
        Exp::id("b"),
    ])])]);
    assert_eq!(format_ast(&ast).unwrap().text, "(int a), b;\n");
}

#[test]
fn test_trailing_declaration_inside_list_keeps_its_parentheses() {
    for source in [
        "(1 => int a), b;\n",
        "f((1 => int a), b);\n",
        "(c ? 1 : int a), b;\n",
    ] {
        let out = format_source(source);
        assert_eq!(out, source);
        assert_eq!(format_source(&out), out);
    }
    // already closed by the operand's own parentheses
    assert_eq!(format_source("(-(1 => int a)), b;"), "-(1 => int a), b;\n");
    // last item needs none
    assert_eq!(format_source("b, 1 => int a;"), "b, 1 => int a;\n");
}

#[test]
fn test_trailing_declaration_list_length_survives_reparse() {
    let once = format_source("(1 => int a), b;");
    match &parse_source(&once).sections[..] {
        [Section::Stmts(stmts)] => match &stmts[0].kind {
            StmtKind::Exp(exps) => assert_eq!(exps.len(), 2),
            other => panic!("expected an expression statement, got {other:?}"),
        },
        other => panic!("unexpected sections {other:?}"),
    }
}

#[test]
fn test_exponent_floats_stay_short() {
    assert_eq!(format_source("1e300 => float big;"), "1.0e300 => float big;\n");
}

#[test]
fn test_template_call_and_type_arguments() {
    assert_eq!(format_source("“int”f(1);"), "“int”f(1);\n");
    assert_eq!(
        format_source("“int, float”Map m;"),
        "“int, float”Map m;\n"
    );
}

// ---
// Comments
// ---

#[test]
fn test_comments_dropped_by_default() {
    assert_eq!(format_source("// hello\n1; /* gone */\n"), "1;\n");
}

#[test]
fn test_lint_keeps_leading_line_comments() {
    assert_eq!(format_lint("// hello\n1; // trailing\n"), "// hello\n1;\n");
}

#[test]
fn test_lint_accepts_comments_where_no_statement_starts() {
    assert_eq!(format_lint("foo(1,\n// note\n2);"), "foo(1, 2);\n");
    assert_eq!(
        format_lint("if(a)\n  b;\n// note\nelse\n  c;"),
        "if(a)\n  b;\nelse\n  c;\n"
    );
}

// ---
// Width warnings
// ---

#[test]
fn test_long_line_warning_position() {
    let long = "x".repeat(100);
    let source = format!("class A {{ <<< \"{}\" >>>; }}", long);
    let formatted = format_ast(&parse_source(&source)).unwrap();
    assert_eq!(formatted.warnings.len(), 1);
    assert_eq!(formatted.warnings[0].line, 2);
    assert_eq!(formatted.warnings[0].width, 113);
}

#[test]
fn test_custom_width_limit() {
    let options = FormatOptions {
        tab_len: 4,
        max_width: 10,
    };
    let formatted = SourceFormatter::with_options(options)
        .render(&parse_source("{ 12345678; }"))
        .unwrap();
    assert_eq!(formatted.text, "{\n    12345678;\n}\n");
    assert_eq!(formatted.warnings.len(), 1);
    assert_eq!(formatted.warnings[0].line, 2);
    assert_eq!(formatted.warnings[0].width, 13);
}

// ---
// Whole-tree properties
// ---

#[test]
fn test_every_node_kind_renders() {
    let formatted = format_ast(&kitchen_sink()).expect("every node kind should render");
    let (open, close) = brace_balance(&formatted.text);
    assert_eq!(open, close);
    let last = formatted
        .text
        .lines()
        .filter(|line| !line.is_empty())
        .last()
        .unwrap();
    assert!(!last.starts_with(' '));
    assert!(formatted.text.contains("template<T, U> function void tmpl() {}"));
    assert!(formatted.text.contains("private union U {"));
    assert!(formatted.text.contains("typedef void Cb(int a, ...);"));
}

#[test]
fn test_shared_template_rendered_once() {
    let mut def = common::func("generic", vec![]);
    def.template = Some(IdList::path(["T"]));
    let shared = Arc::new(def);
    let ast = Ast::new(vec![
        Section::Func(Arc::clone(&shared)),
        Section::Func(shared),
    ]);
    let out = format_ast(&ast).unwrap().text;
    assert_eq!(out.matches("template<T>").count(), 1);
}

#[test]
fn test_shared_plain_function_rendered_each_time() {
    let shared = Arc::new(common::func("plain", vec![]));
    let ast = Ast::new(vec![
        Section::Func(Arc::clone(&shared)),
        Section::Func(shared),
    ]);
    let out = format_ast(&ast).unwrap().text;
    assert_eq!(out.matches("function void plain()").count(), 2);
}

#[test]
fn test_inconsistent_tree_is_an_internal_error() {
    let ast = Ast::new(vec![Section::Stmts(vec![Stmt::new(StmtKind::Enum(
        StmtEnum {
            members: vec![],
            name: None,
        },
    ))])]);
    assert!(format_ast(&ast).is_err());
}

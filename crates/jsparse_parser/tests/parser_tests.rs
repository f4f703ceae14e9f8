//! Parser integration tests.
//!
//! Verifies the shape of the trees the parser builds for the ambiguous
//! corners of the grammar: regular expressions versus division, automatic
//! semicolon insertion, arrow parameter covers, directives and declarations.

use bumpalo::Bump;
use jsparse_ast::node::*;
use jsparse_ast::operators::*;
use jsparse_ast::types::*;
use jsparse_parser::{parse, parse_bytes, LexicalGoal, ParseOptions};

/// Helper: parse a script and return the number of top-level statements.
fn statement_count(source: &str) -> usize {
    let arena = Bump::new();
    match parse(&arena, source, &ParseOptions::script()) {
        Ok(program) => program.body.len(),
        Err(err) => panic!("failed to parse {source:?}: {err}"),
    }
}

fn assert_statement_count(source: &str, expected: usize) {
    assert_eq!(statement_count(source), expected, "source: {}", source);
}

/// Helper: the expression of an expression statement.
fn expression_of<'a>(statement: &'a Statement<'a>) -> &'a Expression<'a> {
    match statement {
        Statement::Expression(es) => es.expression,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

// ============================================================================
// Regular expressions and division
// ============================================================================

#[test]
fn test_slash_after_line_break_starts_regexp() {
    let arena = Bump::new();
    let program = parse(&arena, "1\n/x/g", &ParseOptions::script()).unwrap();
    assert_eq!(program.body.len(), 2);
    let Expression::RegExp(regexp) = expression_of(&program.body[1]) else {
        panic!("expected a regular expression literal");
    };
    assert_eq!(regexp.pattern, "x");
    assert_eq!(regexp.flags, "g");
}

#[test]
fn test_slash_after_line_break_inside_expression_is_division() {
    let arena = Bump::new();
    let program = parse(&arena, "x + 1\n/ 2", &ParseOptions::script()).unwrap();
    assert_eq!(program.body.len(), 1);
    let Expression::Binary(sum) = expression_of(&program.body[0]) else {
        panic!("expected a binary expression");
    };
    assert_eq!(sum.operator, BinaryOperator::Addition);
    let Expression::Binary(quotient) = sum.right else {
        panic!("expected the division on the right");
    };
    assert_eq!(quotient.operator, BinaryOperator::Division);

    let program = parse(&arena, "a = 1\n/ 2", &ParseOptions::script()).unwrap();
    assert_eq!(program.body.len(), 1);
    let Expression::Assignment(assignment) = expression_of(&program.body[0]) else {
        panic!("expected an assignment");
    };
    assert!(matches!(
        assignment.right,
        Expression::Binary(b) if b.operator == BinaryOperator::Division
    ));

    assert_statement_count("var a = 1\n/2/1", 1);
}

#[test]
fn test_slash_after_parenthesized_value_is_division() {
    let arena = Bump::new();
    let program = parse(&arena, "(1) / 2", &ParseOptions::script()).unwrap();
    assert_eq!(program.body.len(), 1);
    let Expression::Binary(binary) = expression_of(&program.body[0]) else {
        panic!("expected a binary expression");
    };
    assert_eq!(binary.operator, BinaryOperator::Division);
    assert!(binary.left.is_parenthesized());
}

#[test]
fn test_regexp_after_operator() {
    let arena = Bump::new();
    let program = parse(&arena, "x = a / b / /c/i.test(d)", &ParseOptions::script()).unwrap();
    let Expression::Assignment(assignment) = expression_of(&program.body[0]) else {
        panic!("expected an assignment");
    };
    let Expression::Binary(outer) = assignment.right else {
        panic!("expected a binary expression");
    };
    assert_eq!(outer.operator, BinaryOperator::Division);
    assert!(matches!(outer.right, Expression::Call(_)));
}

// ============================================================================
// Automatic semicolon insertion
// ============================================================================

#[test]
fn test_increment_after_line_break_starts_new_statement() {
    let arena = Bump::new();
    let program = parse(&arena, "{ a\n++b }", &ParseOptions::script()).unwrap();
    let Statement::Block(block) = &program.body[0] else {
        panic!("expected a block");
    };
    assert_eq!(block.body.len(), 2);
    assert!(matches!(expression_of(&block.body[0]), Expression::Identifier(id) if id.name == "a"));
    let Expression::Update(update) = expression_of(&block.body[1]) else {
        panic!("expected an update expression");
    };
    assert!(update.prefix);
    assert_eq!(update.operator, UpdateOperator::Increment);
}

#[test]
fn test_return_argument_must_be_on_same_line() {
    let arena = Bump::new();
    let program = parse(&arena, "function f() { return\n1 }", &ParseOptions::script()).unwrap();
    let Statement::Function(function) = &program.body[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(function.body.body.len(), 2);
    assert!(matches!(&function.body.body[0], Statement::Return(ret) if ret.argument.is_none()));
}

#[test]
fn test_semicolons_inserted_before_close_brace_and_eof() {
    assert_statement_count("a\nb\nc", 3);
    assert_statement_count("if (a) { b } c", 2);
    assert_statement_count("do x; while (y) z", 2);
}

#[test]
fn test_break_label_must_be_on_same_line() {
    assert_statement_count("a: while (true) { break\na; }", 1);
}

// ============================================================================
// Arrow function covers
// ============================================================================

#[test]
fn test_parenthesized_list_becomes_arrow_parameters() {
    let arena = Bump::new();
    let program = parse(&arena, "(a, b) => a + b", &ParseOptions::script()).unwrap();
    let Expression::Arrow(arrow) = expression_of(&program.body[0]) else {
        panic!("expected an arrow function");
    };
    assert_eq!(arrow.params.items.len(), 2);
    assert!(arrow.params.is_simple());
    assert!(matches!(arrow.body, ArrowBody::Expression(Expression::Binary(_))));
}

#[test]
fn test_parenthesized_list_without_arrow_is_sequence() {
    let arena = Bump::new();
    let program = parse(&arena, "(a, b)", &ParseOptions::script()).unwrap();
    let Expression::Parenthesized(paren) = expression_of(&program.body[0]) else {
        panic!("expected a parenthesized expression");
    };
    assert!(matches!(paren.expression, Expression::Sequence(seq) if seq.expressions.len() == 2));
}

#[test]
fn test_arrow_with_default_and_trailing_comma() {
    let arena = Bump::new();
    let program = parse(&arena, "(a = 1,) => a", &ParseOptions::script()).unwrap();
    let Expression::Arrow(arrow) = expression_of(&program.body[0]) else {
        panic!("expected an arrow function");
    };
    assert_eq!(arrow.params.items.len(), 1);
    assert!(matches!(arrow.params.items[0], Pattern::Assignment(_)));
    assert!(!arrow.params.is_simple());
}

#[test]
fn test_arrow_with_destructuring_and_rest() {
    let arena = Bump::new();
    let program = parse(&arena, "({a, b: [c]}, ...rest) => {}", &ParseOptions::script()).unwrap();
    let Expression::Arrow(arrow) = expression_of(&program.body[0]) else {
        panic!("expected an arrow function");
    };
    assert_eq!(arrow.params.items.len(), 1);
    assert!(matches!(arrow.params.items[0], Pattern::Object(_)));
    assert!(arrow.params.rest.is_some());
    assert!(matches!(arrow.body, ArrowBody::Block(_)));
}

#[test]
fn test_async_arrow_and_async_call() {
    let arena = Bump::new();
    let program =
        parse(&arena, "async (x) => x; async (x); async x => x", &ParseOptions::script()).unwrap();
    assert!(matches!(expression_of(&program.body[0]), Expression::Arrow(arrow) if arrow.is_async));
    assert!(matches!(expression_of(&program.body[1]), Expression::Call(_)));
    assert!(matches!(expression_of(&program.body[2]), Expression::Arrow(arrow) if arrow.is_async));
}

#[test]
fn test_destructuring_assignment_target() {
    let arena = Bump::new();
    let program = parse(&arena, "[a, {b = 1}, ...c.d] = e", &ParseOptions::script()).unwrap();
    let Expression::Assignment(assignment) = expression_of(&program.body[0]) else {
        panic!("expected an assignment");
    };
    let Pattern::Array(array) = &assignment.left else {
        panic!("expected an array pattern");
    };
    assert_eq!(array.elements.len(), 2);
    assert!(array.rest.is_some());
}

#[test]
fn test_shorthand_initializer_only_in_patterns() {
    assert_statement_count("({ a = 1 } = {})", 1);
    assert_statement_count("for ({ a = 1 } of []);", 1);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_exponent_is_right_associative() {
    let arena = Bump::new();
    let program = parse(&arena, "a ** b ** c", &ParseOptions::script()).unwrap();
    let Expression::Binary(outer) = expression_of(&program.body[0]) else {
        panic!("expected a binary expression");
    };
    assert_eq!(outer.operator, BinaryOperator::Exponential);
    assert!(matches!(outer.left, Expression::Identifier(id) if id.name == "a"));
    assert!(matches!(
        outer.right,
        Expression::Binary(inner) if inner.operator == BinaryOperator::Exponential
    ));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let arena = Bump::new();
    let program = parse(&arena, "a + b * c", &ParseOptions::script()).unwrap();
    let Expression::Binary(outer) = expression_of(&program.body[0]) else {
        panic!("expected a binary expression");
    };
    assert_eq!(outer.operator, BinaryOperator::Addition);
    assert!(matches!(
        outer.right,
        Expression::Binary(inner) if inner.operator == BinaryOperator::Multiplication
    ));
}

#[test]
fn test_parenthesized_coalesce_mix() {
    let arena = Bump::new();
    let program = parse(&arena, "(a || b) ?? c", &ParseOptions::script()).unwrap();
    assert!(matches!(
        expression_of(&program.body[0]),
        Expression::Logical(logical) if logical.operator == LogicalOperator::Coalesce
    ));
}

#[test]
fn test_optional_chain_is_wrapped() {
    let arena = Bump::new();
    let program = parse(&arena, "a?.b.c(d)?.[e]", &ParseOptions::script()).unwrap();
    assert!(matches!(expression_of(&program.body[0]), Expression::Chain(_)));
}

#[test]
fn test_logical_assignment() {
    let arena = Bump::new();
    let program = parse(&arena, "a ??= b", &ParseOptions::script()).unwrap();
    assert!(matches!(
        expression_of(&program.body[0]),
        Expression::Assignment(a) if a.operator == AssignmentOperator::LogicalNullish
    ));
}

#[test]
fn test_in_allowed_inside_for_init_parentheses() {
    assert_statement_count("for (var x = (a in b); x; ) {}", 1);
    assert_statement_count("for (let i = 0, n = a.length; i < n; i++) {}", 1);
}

// ============================================================================
// Directives and strictness
// ============================================================================

#[test]
fn test_directive_prologue_is_recorded() {
    let arena = Bump::new();
    let program = parse(&arena, "'use strict'; \"other\"; x", &ParseOptions::script()).unwrap();
    assert!(program.strict);
    assert_eq!(program.body[0].directive(), Some("use strict"));
    assert_eq!(program.body[1].directive(), Some("other"));
    assert_eq!(program.body[2].directive(), None);
}

#[test]
fn test_string_after_prologue_is_not_a_directive() {
    let arena = Bump::new();
    let program = parse(&arena, "x; 'use strict'; 010", &ParseOptions::script()).unwrap();
    assert!(!program.strict);
    assert_eq!(program.body[1].directive(), None);
}

#[test]
fn test_function_directive_makes_only_body_strict() {
    let arena = Bump::new();
    let source = "function f() { 'use strict'; } var static = 1;";
    let program = parse(&arena, source, &ParseOptions::script()).unwrap();
    assert!(!program.strict);
    let Statement::Function(function) = &program.body[0] else {
        panic!("expected a function declaration");
    };
    assert!(function.body.strict);
}

#[test]
fn test_duplicate_parameters_allowed_without_directive() {
    assert_statement_count("function f(a, a) { }", 1);
}

#[test]
fn test_module_is_strict() {
    let arena = Bump::new();
    let program = parse(&arena, "export const x = 1;", &ParseOptions::module()).unwrap();
    assert!(program.strict);
    assert_eq!(program.source_type, SourceType::Module);
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_let_as_identifier_in_sloppy_code() {
    assert_statement_count("var let = 1; let\nfoo; if (a) let\nfoo", 4);
}

#[test]
fn test_var_redeclares_var_and_function() {
    assert_statement_count("var a; var a; function b() {} var b;", 4);
}

#[test]
fn test_annex_b_function_hoisting_recorded() {
    let arena = Bump::new();
    let source = "{ function f() {} } if (x) function g() {}";
    let program = parse(&arena, source, &ParseOptions::script()).unwrap();
    assert_eq!(program.annex_b_functions, &["f", "g"]);
}

#[test]
fn test_annex_b_hoisting_blocked_by_lexical_binding() {
    let arena = Bump::new();
    let program = parse(&arena, "let f; { function f() {} }", &ParseOptions::script()).unwrap();
    assert!(program.annex_b_functions.is_empty());
}

#[test]
fn test_no_annex_b_hoisting_without_compat_mode() {
    let arena = Bump::new();
    let options = ParseOptions::script().with_compat_mode(false);
    let program = parse(&arena, "{ function f() {} }", &options).unwrap();
    assert!(program.annex_b_functions.is_empty());
}

#[test]
fn test_catch_parameter_redeclared_by_var() {
    assert_statement_count("try {} catch (e) { var e; }", 1);
}

#[test]
fn test_for_in_of_heads() {
    let arena = Bump::new();
    let program = parse(
        &arena,
        "for (const [k, v] of m) {} for (x.y in o); for (let in o); for (async of => {};;) break;",
        &ParseOptions::script(),
    )
    .unwrap();
    assert!(matches!(
        &program.body[0],
        Statement::ForOf(f) if matches!(f.left, ForHead::Variable(_))
    ));
    assert!(matches!(
        &program.body[1],
        Statement::ForIn(f) if matches!(f.left, ForHead::Pattern(Pattern::Member(_)))
    ));
    assert!(matches!(&program.body[2], Statement::ForIn(_)));
    assert!(matches!(&program.body[3], Statement::For(_)));
}

#[test]
fn test_labels_and_continue() {
    assert_statement_count("outer: for (;;) { inner: for (;;) { continue outer; } }", 1);
    assert_statement_count("a: b: while (x) { continue a; }", 1);
}

#[test]
fn test_classes() {
    let arena = Bump::new();
    let source = "class A extends B {
        #x = 1;
        static #count;
        static { A.#count = 0; }
        constructor() { super(); }
        get #y() { return this.#x; }
        set #y(v) {}
        static async *gen() {}
        has(o) { return #x in o; }
    }";
    let program = parse(&arena, source, &ParseOptions::script()).unwrap();
    let Statement::Class(class) = &program.body[0] else {
        panic!("expected a class declaration");
    };
    assert!(class.super_class.is_some());
    assert_eq!(class.body.len(), 8);
    assert!(matches!(class.body[2], ClassElement::StaticBlock(_)));
    assert!(matches!(&class.body[3], ClassElement::Method(m) if m.kind == MethodKind::Constructor));
}

#[test]
fn test_modules() {
    let arena = Bump::new();
    let source = "import a, { b as c, \"d e\" as f } from 'm';
        import * as ns from 'n' with { type: 'json' };
        export { a, c as default };
        export * as g from 'g';
        export function h() {}";
    let program = parse(&arena, source, &ParseOptions::module()).unwrap();
    assert_eq!(program.body.len(), 5);
    let Statement::Import(import) = &program.body[0] else {
        panic!("expected an import declaration");
    };
    assert_eq!(import.specifiers.len(), 3);
    assert_eq!(import.specifiers[2].local().name, "f");
    let Statement::Import(namespace) = &program.body[1] else {
        panic!("expected an import declaration");
    };
    assert_eq!(namespace.attributes.len(), 1);
}

#[test]
fn test_dynamic_import_and_meta_in_script_statement_position() {
    assert_statement_count("import('m').then(f);", 1);
}

// ============================================================================
// Program driver
// ============================================================================

#[test]
fn test_expression_goal_parses_object_literal() {
    let arena = Bump::new();
    let options = ParseOptions {
        lexical_goal: LexicalGoal::Expression,
        ..ParseOptions::default()
    };
    let program = parse(&arena, "{ a: 1, b }", &options).unwrap();
    assert_eq!(program.body.len(), 1);
    assert!(matches!(expression_of(&program.body[0]), Expression::Object(_)));
}

#[test]
fn test_program_goal_parses_block() {
    let arena = Bump::new();
    let program = parse(&arena, "{ a: 1 }", &ParseOptions::script()).unwrap();
    assert!(matches!(&program.body[0], Statement::Block(_)));
}

#[test]
fn test_hashbang_is_recorded() {
    let arena = Bump::new();
    let program = parse(&arena, "#!/usr/bin/env node\nx", &ParseOptions::script()).unwrap();
    assert!(program.hashbang.is_some());
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_parse_bytes_accepts_utf8() {
    let arena = Bump::new();
    let program =
        parse_bytes(&arena, "var café = 'ü';".as_bytes(), &ParseOptions::script()).unwrap();
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_parse_is_deterministic() {
    let source = "async function f({a, ...b}, [c = 1]) { for await (const x of y) { label: { break label; } } }
        class K { static #p = 1; m() { return K.#p ?? (a || b); } }";
    let first_arena = Bump::new();
    let second_arena = Bump::new();
    let options = ParseOptions::module();
    let first = parse(&first_arena, source, &options).unwrap().to_json();
    // An unrelated parse in between must not leak state.
    let other_arena = Bump::new();
    let _ = parse(&other_arena, "function g(a, a) {}", &ParseOptions::script());
    let second = parse(&second_arena, source, &options).unwrap().to_json();
    assert_eq!(first, second);
}

#[test]
fn test_json_shape() {
    let arena = Bump::new();
    let program = parse(&arena, "'use strict'; x = 1", &ParseOptions::script()).unwrap();
    let json = program.to_json();
    assert_eq!(json["source_type"], serde_json::json!("Script"));
    assert_eq!(json["strict"], serde_json::json!(true));
    assert_eq!(json["body"][0]["Expression"]["directive"], serde_json::json!("use strict"));
    assert!(json["body"][1]["Expression"]["expression"].get("Assignment").is_some());
}

//! Early error tests.
//!
//! Each rejected source is paired with a nearby source (or the same source
//! under other options) that parses, so a test cannot pass by rejecting
//! everything.

use bumpalo::Bump;
use jsparse_diagnostics::{SyntaxError, SyntaxErrorKind};
use jsparse_parser::{parse, parse_bytes, ParseOptions};

fn parse_with(source: &str, options: &ParseOptions) -> Result<usize, SyntaxError> {
    let arena = Bump::new();
    parse(&arena, source, options).map(|program| program.body.len())
}

/// Helper: assert that `source` fails with `kind` under `options`.
fn assert_rejects(source: &str, options: &ParseOptions, kind: SyntaxErrorKind) {
    match parse_with(source, options) {
        Ok(_) => panic!("expected {kind} for {source:?}, but it parsed"),
        Err(err) => assert_eq!(err.kind(), kind, "source: {source:?}, error: {err}"),
    }
}

fn assert_accepts(source: &str, options: &ParseOptions) {
    if let Err(err) = parse_with(source, options) {
        panic!("expected {source:?} to parse, got: {err}");
    }
}

fn script() -> ParseOptions {
    ParseOptions::script()
}

fn module() -> ParseOptions {
    ParseOptions::module()
}

// ============================================================================
// Cover grammar and targets
// ============================================================================

#[test]
fn test_arrow_parameters_must_be_patterns() {
    assert_rejects("(a + b) => a", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_rejects("(a, 1) => a", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_accepts("(a, b) => a", &script());
}

#[test]
fn test_arrow_must_follow_parameters_on_same_line() {
    assert_rejects("a\n=> 1", &script(), SyntaxErrorKind::LineTerminatorRestriction);
    assert_accepts("a => 1", &script());
}

#[test]
fn test_invalid_assignment_targets() {
    assert_rejects("1 = 2", &script(), SyntaxErrorKind::InvalidAssignmentTarget);
    assert_rejects("a() = 1", &script(), SyntaxErrorKind::InvalidAssignmentTarget);
    assert_rejects("a?.b = 1", &script(), SyntaxErrorKind::InvalidAssignmentTarget);
    assert_rejects("a + 1 += 1", &script(), SyntaxErrorKind::InvalidAssignmentTarget);
    assert_accepts("a.b = 1; a[0] += 1; (a) = 1", &script());
}

#[test]
fn test_invalid_destructuring_targets() {
    assert_rejects("({a: 1} = b)", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_rejects("([a]) = 1", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_rejects("[...a, b] = c", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_accepts("({a: b.c} = d); [(a)] = 1; [...a] = c", &script());
}

#[test]
fn test_shorthand_initializer_outside_pattern() {
    assert_rejects("({a = 1})", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_rejects("f({a = 1})", &script(), SyntaxErrorKind::InvalidDestructuringPattern);
    assert_accepts("({a = 1} = {})", &script());
}

#[test]
fn test_duplicate_proto_only_in_literals() {
    assert_rejects("({__proto__: 1, __proto__: 2})", &script(), SyntaxErrorKind::DuplicateBinding);
    assert_accepts("({__proto__: a, __proto__: b} = c)", &script());
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_coalesce_cannot_mix_with_logical_operators() {
    assert_rejects("a ?? b || c", &script(), SyntaxErrorKind::InvalidOperatorMix);
    assert_rejects("a && b ?? c", &script(), SyntaxErrorKind::InvalidOperatorMix);
    assert_accepts("a ?? (b || c); (a && b) ?? c", &script());
}

#[test]
fn test_unary_before_exponent() {
    assert_rejects("-a ** 2", &script(), SyntaxErrorKind::InvalidOperatorMix);
    assert_accepts("(-a) ** 2; -(a ** 2)", &script());
}

#[test]
fn test_delete_identifier_in_strict_mode() {
    assert_rejects("delete x", &ParseOptions::strict(), SyntaxErrorKind::StrictModeViolation);
    assert_accepts("delete x", &script());
}

#[test]
fn test_optional_chain_restrictions() {
    assert_rejects("new a?.b", &script(), SyntaxErrorKind::UnexpectedToken);
    assert_rejects("a?.b`c`", &script(), SyntaxErrorKind::UnexpectedToken);
    assert_accepts("new a.b; a.b`c`", &script());
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_lexical_redeclaration() {
    assert_rejects("let a; let a;", &script(), SyntaxErrorKind::DuplicateBinding);
    assert_rejects("let a; var a;", &script(), SyntaxErrorKind::DuplicateBinding);
    assert_rejects("{ var a; } let a;", &script(), SyntaxErrorKind::DuplicateBinding);
    assert_accepts("var a; var a; { let a; }", &script());
}

#[test]
fn test_catch_parameter_redeclaration() {
    assert_rejects("try {} catch (e) { let e; }", &script(), SyntaxErrorKind::DuplicateBinding);
    assert_rejects(
        "try {} catch (e) { var e; }",
        &script().with_compat_mode(false),
        SyntaxErrorKind::DuplicateBinding,
    );
    assert_accepts("try {} catch (e) { var e; }", &script());
}

#[test]
fn test_duplicate_parameters() {
    assert_rejects(
        "function f(a, a) {}",
        &ParseOptions::strict(),
        SyntaxErrorKind::DuplicateParameter,
    );
    assert_rejects("(a, a) => 1", &script(), SyntaxErrorKind::DuplicateParameter);
    assert_rejects("function f(a, [a]) {}", &script(), SyntaxErrorKind::DuplicateParameter);
    assert_accepts("function f(a, a) {}", &script());
}

#[test]
fn test_missing_initializers() {
    assert_rejects("const a;", &script(), SyntaxErrorKind::MissingInitializer);
    assert_rejects("var [a];", &script(), SyntaxErrorKind::MissingInitializer);
    assert_accepts("const a = 1; var [b] = c; for (const d of e);", &script());
}

#[test]
fn test_let_cannot_name_lexical_binding() {
    assert_rejects("let let = 1", &script(), SyntaxErrorKind::ReservedWord);
    assert_accepts("var let = 1", &script());
}

#[test]
fn test_strict_reserved_words() {
    let strict = ParseOptions::strict();
    assert_rejects("var implements = 1", &strict, SyntaxErrorKind::ReservedWord);
    assert_rejects("var static = 1", &module(), SyntaxErrorKind::ReservedWord);
    assert_accepts("var implements = 1; var static = 2", &script());
}

#[test]
fn test_restricted_names_in_strict_mode() {
    assert_rejects("var eval = 1", &ParseOptions::strict(), SyntaxErrorKind::StrictModeViolation);
    assert_accepts("var eval = 1", &script());
}

// ============================================================================
// Strict mode and directives
// ============================================================================

#[test]
fn test_with_statement() {
    assert_rejects("'use strict'; with (a) {}", &script(), SyntaxErrorKind::StrictModeViolation);
    assert_rejects("with (a) {}", &module(), SyntaxErrorKind::StrictModeViolation);
    assert_accepts("with (a) {}", &script());
}

#[test]
fn test_legacy_octal_literals() {
    assert_rejects("'use strict'; 010", &script(), SyntaxErrorKind::StrictModeViolation);
    assert_rejects("010", &script().with_compat_mode(false), SyntaxErrorKind::InvalidNumber);
    assert_accepts("010; 08; '\\07'", &script());
}

#[test]
fn test_directive_makes_earlier_parameters_invalid() {
    assert_rejects(
        "function f(a, a) { 'use strict'; }",
        &script(),
        SyntaxErrorKind::RetroactiveStrictViolation,
    );
    assert_rejects(
        "function f(eval) { 'use strict'; }",
        &script(),
        SyntaxErrorKind::RetroactiveStrictViolation,
    );
    assert_rejects(
        "function f(static) { 'use strict'; }",
        &script(),
        SyntaxErrorKind::RetroactiveStrictViolation,
    );
    assert_accepts("function f(a, a, eval, static) { }", &script());
}

#[test]
fn test_directive_makes_earlier_octal_escape_invalid() {
    assert_rejects(
        "function f() { '\\07'; 'use strict'; }",
        &script(),
        SyntaxErrorKind::RetroactiveStrictViolation,
    );
    assert_accepts("function f() { '\\07'; 'not strict'; }", &script());
}

#[test]
fn test_use_strict_with_non_simple_parameters() {
    assert_rejects(
        "function f(a = 1) { 'use strict'; }",
        &script(),
        SyntaxErrorKind::InvalidUseStrict,
    );
    assert_rejects("({a}) => { 'use strict'; }", &script(), SyntaxErrorKind::InvalidUseStrict);
    assert_accepts("function f(a) { 'use strict'; }", &script());
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_break_and_continue_targets() {
    assert_rejects("break;", &script(), SyntaxErrorKind::IllegalBreakContinue);
    assert_rejects("continue;", &script(), SyntaxErrorKind::IllegalBreakContinue);
    assert_rejects("a: { continue a; }", &script(), SyntaxErrorKind::IllegalBreakContinue);
    assert_rejects("while (x) { break b; }", &script(), SyntaxErrorKind::IllegalBreakContinue);
    assert_rejects(
        "switch (x) { case 1: continue; }",
        &script(),
        SyntaxErrorKind::IllegalBreakContinue,
    );
    assert_accepts(
        "while (x) break; a: { break a; } b: while (x) continue b; switch (x) { case 1: break; }",
        &script(),
    );
}

#[test]
fn test_labels_do_not_cross_function_boundaries() {
    assert_rejects(
        "a: while (x) { function f() { break a; } }",
        &script(),
        SyntaxErrorKind::IllegalBreakContinue,
    );
    assert_rejects("a: a: ;", &script(), SyntaxErrorKind::DuplicateBinding);
    assert_accepts("a: ; a: ;", &script());
}

#[test]
fn test_return_outside_function() {
    assert_rejects("return 1", &script(), SyntaxErrorKind::IllegalReturn);
    assert_rejects("class A { static { return; } }", &script(), SyntaxErrorKind::IllegalReturn);
    assert_accepts("function f() { return 1 }", &script());
}

#[test]
fn test_static_block_restrictions_reach_into_arrows() {
    assert_rejects("class C { static { () => await } }", &script(), SyntaxErrorKind::ReservedWord);
    assert_rejects(
        "class C { static { (x = await) => x } }",
        &script(),
        SyntaxErrorKind::ReservedWord,
    );
    assert_rejects(
        "class C { static { () => arguments } }",
        &script(),
        SyntaxErrorKind::InvalidClassElement,
    );
    assert_accepts(
        "class C { static { async () => await 1; function f() { var await; return arguments; } } }",
        &script(),
    );
}

#[test]
fn test_throw_argument_on_same_line() {
    assert_rejects("throw\n1", &script(), SyntaxErrorKind::LineTerminatorRestriction);
    assert_accepts("throw 1", &script());
}

#[test]
fn test_duplicate_default_clause() {
    assert_rejects("switch (a) { default: default: }", &script(), SyntaxErrorKind::UnexpectedToken);
    assert_accepts("switch (a) { case 1: default: case 2: }", &script());
}

#[test]
fn test_missing_semicolon_without_line_break() {
    assert_rejects("a b", &script(), SyntaxErrorKind::UnexpectedToken);
    assert_accepts("a\nb", &script());
}

#[test]
fn test_declarations_in_statement_position() {
    assert_rejects("if (a) let x = 1;", &script(), SyntaxErrorKind::InvalidDeclarationPosition);
    assert_rejects(
        "while (a) const x = 1;",
        &script(),
        SyntaxErrorKind::InvalidDeclarationPosition,
    );
    assert_rejects(
        "while (a) function f() {}",
        &script(),
        SyntaxErrorKind::InvalidDeclarationPosition,
    );
    assert_rejects("if (a) class A {}", &script(), SyntaxErrorKind::UnexpectedToken);
    assert_accepts("if (a) { let x = 1; }", &script());
}

#[test]
fn test_if_function_declarations() {
    let source = "if (a) function f() {}";
    assert_rejects(source, &ParseOptions::strict(), SyntaxErrorKind::InvalidDeclarationPosition);
    assert_rejects(
        source,
        &script().with_compat_mode(false),
        SyntaxErrorKind::InvalidDeclarationPosition,
    );
    assert_rejects(
        "if (a) async function f() {}",
        &script(),
        SyntaxErrorKind::InvalidDeclarationPosition,
    );
    assert_accepts(source, &script());
}

#[test]
fn test_labeled_function_declarations() {
    assert_rejects("a: function* g() {}", &script(), SyntaxErrorKind::InvalidDeclarationPosition);
    assert_rejects(
        "a: function f() {}",
        &ParseOptions::strict(),
        SyntaxErrorKind::InvalidDeclarationPosition,
    );
    assert_accepts("a: function f() {}", &script());
}

#[test]
fn test_duplicate_block_functions() {
    let source = "{ function f() {} function f() {} }";
    assert_rejects(source, &ParseOptions::strict(), SyntaxErrorKind::DuplicateBinding);
    assert_rejects(source, &script().with_compat_mode(false), SyntaxErrorKind::DuplicateBinding);
    assert_accepts(source, &script());
}

// ============================================================================
// For heads
// ============================================================================

#[test]
fn test_for_of_head_restrictions() {
    assert_rejects("for (let.x of y);", &script(), SyntaxErrorKind::InvalidForHead);
    assert_rejects("for (async of x);", &script(), SyntaxErrorKind::InvalidForHead);
    assert_rejects("for (let a, b of c);", &script(), SyntaxErrorKind::InvalidForHead);
    assert_rejects("for (var [a] = 1 of b);", &script(), SyntaxErrorKind::InvalidForHead);
    assert_accepts(
        "for (let.x in y); for (async of => {};;) break; for ((async) of x);",
        &script(),
    );
    assert_accepts("async function f() { for await (async of x); }", &script());
    assert_accepts("for await (async of x);", &module());
}

#[test]
fn test_for_in_initializer() {
    let source = "for (var a = 1 in b);";
    assert_rejects(source, &ParseOptions::strict(), SyntaxErrorKind::InvalidForHead);
    assert_rejects(source, &script().with_compat_mode(false), SyntaxErrorKind::InvalidForHead);
    assert_rejects("for (let a = 1 in b);", &script(), SyntaxErrorKind::InvalidForHead);
    assert_accepts(source, &script());
}

#[test]
fn test_for_await_requires_async_context() {
    assert_rejects(
        "function f() { for await (x of y); }",
        &script(),
        SyntaxErrorKind::InvalidAwaitOrYield,
    );
    assert_accepts("async function f() { for await (x of y); }", &script());
    assert_accepts("for await (x of y);", &module());
}

#[test]
fn test_for_target_must_be_simple() {
    assert_rejects("for (a() of b);", &script(), SyntaxErrorKind::InvalidAssignmentTarget);
    assert_accepts("for (a.b of c); for ([a, b] of c);", &script());
}

// ============================================================================
// Functions, yield and await
// ============================================================================

#[test]
fn test_await_in_async_parameters() {
    assert_rejects(
        "async function f(a = await 1) {}",
        &script(),
        SyntaxErrorKind::InvalidAwaitOrYield,
    );
    assert_accepts("async function f(a = 1) { await a; }", &script());
}

#[test]
fn test_yield_in_generator_parameters() {
    assert_rejects("function* g(a = yield) {}", &script(), SyntaxErrorKind::InvalidAwaitOrYield);
    assert_accepts("function* g(a) { yield a; }", &script());
}

#[test]
fn test_await_is_reserved_in_modules() {
    assert_rejects("var await;", &module(), SyntaxErrorKind::ReservedWord);
    assert_accepts("var await;", &script());
}

#[test]
fn test_super_outside_methods() {
    assert_rejects("function f() { super.x; }", &script(), SyntaxErrorKind::InvalidSuper);
    assert_rejects(
        "class A { constructor() { super(); } }",
        &script(),
        SyntaxErrorKind::InvalidSuper,
    );
    assert_rejects(
        "class A extends B { m() { super(); } }",
        &script(),
        SyntaxErrorKind::InvalidSuper,
    );
    assert_accepts(
        "({ m() { super.x; } }); class A extends B { constructor() { super(); } m() { super.m(); } }",
        &script(),
    );
}

#[test]
fn test_meta_properties() {
    assert_rejects("new.target", &script(), SyntaxErrorKind::InvalidMetaProperty);
    assert_rejects("import.meta", &script(), SyntaxErrorKind::InvalidMetaProperty);
    assert_accepts("function f() { new.target; }", &script());
    assert_accepts("import.meta.url", &module());
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_class_element_restrictions() {
    assert_rejects(
        "class A { constructor() {} constructor() {} }",
        &script(),
        SyntaxErrorKind::InvalidClassElement,
    );
    assert_rejects(
        "class A { get constructor() {} }",
        &script(),
        SyntaxErrorKind::InvalidClassElement,
    );
    assert_rejects(
        "class A { static prototype() {} }",
        &script(),
        SyntaxErrorKind::InvalidClassElement,
    );
    assert_rejects("class A { constructor = 1 }", &script(), SyntaxErrorKind::InvalidClassElement);
    assert_rejects("class A { x = arguments }", &script(), SyntaxErrorKind::InvalidClassElement);
    assert_rejects("class A { get x(a) {} }", &script(), SyntaxErrorKind::InvalidClassElement);
    assert_rejects("class A { set x() {} }", &script(), SyntaxErrorKind::InvalidClassElement);
    assert_accepts(
        "class A { constructor() {} static constructor() {} prototype() {} get x() {} set x(v) {} }",
        &script(),
    );
}

#[test]
fn test_private_name_restrictions() {
    assert_rejects("class A { #x; #x; }", &script(), SyntaxErrorKind::InvalidPrivateName);
    assert_rejects("class A { #constructor() {} }", &script(), SyntaxErrorKind::InvalidPrivateName);
    assert_rejects("class A { m() { this.#y; } }", &script(), SyntaxErrorKind::InvalidPrivateName);
    assert_rejects("this.#x", &script(), SyntaxErrorKind::InvalidPrivateName);
    assert_rejects(
        "class A { #x; m() { delete this.#x; } }",
        &script(),
        SyntaxErrorKind::InvalidPrivateName,
    );
    assert_accepts(
        "class A { get #x() {} set #x(v) {} #y; m() { class B { n() { this.#y; } } } }",
        &script(),
    );
}

#[test]
fn test_private_reference_before_declaration() {
    assert_accepts("class A { m() { return this.#later; } #later = 1; }", &script());
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_module_items_only_at_module_top_level() {
    assert_rejects("import x from 'm';", &script(), SyntaxErrorKind::InvalidDeclarationPosition);
    assert_rejects("export var x;", &script(), SyntaxErrorKind::InvalidDeclarationPosition);
    assert_rejects("{ export var x; }", &module(), SyntaxErrorKind::InvalidDeclarationPosition);
    assert_accepts("import x from 'm'; export var y;", &module());
}

#[test]
fn test_export_names() {
    assert_rejects("export { x };", &module(), SyntaxErrorKind::InvalidExport);
    assert_rejects(
        "export let a; export let b; export { a as b };",
        &module(),
        SyntaxErrorKind::InvalidExport,
    );
    assert_rejects(
        "export default 1; export default 2;",
        &module(),
        SyntaxErrorKind::InvalidExport,
    );
    assert_rejects(
        "let a; export { a as 'b' }; export { 'c' };",
        &module(),
        SyntaxErrorKind::InvalidExport,
    );
    assert_accepts("let x; export { x }; export { x as y }; export { 'c' } from 'm';", &module());
}

#[test]
fn test_imported_bindings_are_lexical() {
    assert_rejects("import a from 'm'; let a;", &module(), SyntaxErrorKind::DuplicateBinding);
    assert_rejects("import { if } from 'm';", &module(), SyntaxErrorKind::ReservedWord);
    assert_accepts("import { if as x } from 'm';", &module());
}

// ============================================================================
// Scanner errors surfaced through the parser
// ============================================================================

#[test]
fn test_lexical_errors() {
    assert_rejects("'\\x4'", &script(), SyntaxErrorKind::InvalidEscape);
    assert_rejects("'abc", &script(), SyntaxErrorKind::UnterminatedLiteral);
    assert_rejects("/a/gg", &script(), SyntaxErrorKind::InvalidRegExpFlags);
    assert_rejects("1_", &script(), SyntaxErrorKind::InvalidNumber);
    assert_rejects("3in []", &script(), SyntaxErrorKind::InvalidNumber);
    assert_rejects("@", &script(), SyntaxErrorKind::IllegalCharacter);
    assert_accepts("'\\x41'; /a/g; 1_0; 3 in []", &script());
}

#[test]
fn test_html_comments_only_in_compatible_scripts() {
    assert_accepts("x = 1 <!-- comment\n--> also a comment", &script());
    assert!(parse_with("x = 1\n--> not a comment", &module()).is_err());
    assert!(parse_with("x = 1\n--> not a comment", &script().with_compat_mode(false)).is_err());
}

#[test]
fn test_invalid_utf8_input() {
    let arena = Bump::new();
    let err = parse_bytes(&arena, &[b'a', b' ', 0xff, b';'], &script()).unwrap_err();
    assert_eq!(err.kind(), SyntaxErrorKind::InvalidEncoding);
    assert_eq!(err.span.start, 2);
}

#[test]
fn test_error_location_is_one_based() {
    let err = parse_with("let a;\nlet a;", &script()).unwrap_err();
    assert_eq!(err.kind(), SyntaxErrorKind::DuplicateBinding);
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 5);
}

// ============================================================================
// Resource limits
// ============================================================================

#[test]
fn test_deep_nesting_is_an_error() {
    let depth = 5_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || parse_with(&source, &ParseOptions::script()).map_err(|err| err.kind()))
        .unwrap();
    assert_eq!(handle.join().unwrap(), Err(SyntaxErrorKind::NestingTooDeep));
}

#[test]
fn test_moderate_nesting_is_accepted() {
    let source = format!("{}1{}", "[".repeat(50), "]".repeat(50));
    assert_accepts(&source, &script());
}

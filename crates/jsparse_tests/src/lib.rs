//! Conformance table for jsparse.
//!
//! Every case names a source, the options to parse it under and the
//! expected outcome: accepted, or rejected with a particular
//! [`SyntaxErrorKind`]. Cases are independent, so the runner parses them in
//! parallel with rayon, each in its own arena.

use bumpalo::Bump;
use jsparse_diagnostics::SyntaxErrorKind;
use jsparse_options::ParseOptions;
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt::Write as _;

/// What a case expects the parser to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Accept,
    Reject(SyntaxErrorKind),
}

/// A single conformance case.
#[derive(Debug, Clone)]
pub struct ConformanceCase {
    pub name: &'static str,
    pub category: &'static str,
    pub source: &'static str,
    pub options: ParseOptions,
    pub expected: Expected,
}

/// The outcome of running one case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: &'static str,
    pub category: &'static str,
    pub expected: Expected,
    /// `None` when the source parsed.
    pub actual: Option<SyntaxErrorKind>,
    /// The error message, if any.
    pub message: Option<String>,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        match self.expected {
            Expected::Accept => self.actual.is_none(),
            Expected::Reject(kind) => self.actual == Some(kind),
        }
    }
}

/// Parse one case in a fresh arena.
pub fn run_case(case: &ConformanceCase) -> CaseResult {
    let arena = Bump::new();
    let outcome = jsparse_parser::parse(&arena, case.source, &case.options);
    let (actual, message) = match outcome {
        Ok(_) => (None, None),
        Err(err) => (Some(err.kind()), Some(err.to_string())),
    };
    let result = CaseResult {
        name: case.name,
        category: case.category,
        expected: case.expected,
        actual,
        message,
    };
    if !result.passed() {
        debug!("conformance case {} failed: {:?}", case.name, result.message);
    }
    result
}

/// Run every case in parallel. Results come back in table order.
pub fn run_all(cases: &[ConformanceCase]) -> Vec<CaseResult> {
    cases.par_iter().map(run_case).collect()
}

/// Parse `source` twice, in separate arenas, and compare the serialized
/// trees. Sources that fail to parse compare their error kinds instead.
pub fn is_deterministic(source: &str, options: &ParseOptions) -> bool {
    let render = || {
        let arena = Bump::new();
        jsparse_parser::parse(&arena, source, options)
            .map(|program| program.to_json())
            .map_err(|err| (err.kind(), err.span))
    };
    render() == render()
}

// ============================================================================
// Summary
// ============================================================================

/// Pass counts over a set of results.
#[derive(Debug, Default)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    /// Category to `(passed, total)`.
    pub by_category: HashMap<&'static str, (usize, usize)>,
}

impl Summary {
    pub fn from_results(results: &[CaseResult]) -> Self {
        let mut summary = Summary::default();
        for result in results {
            let entry = summary.by_category.entry(result.category).or_insert((0, 0));
            if result.passed() {
                entry.0 += 1;
                summary.passed += 1;
            }
            entry.1 += 1;
            summary.total += 1;
        }
        summary
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    /// A printable report with per-category counts and the failing cases.
    pub fn render(&self, results: &[CaseResult]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== jsparse conformance ===");
        let _ = writeln!(
            out,
            "Total: {}  Passed: {}  Failed: {}",
            self.total,
            self.passed,
            self.failed()
        );

        let mut categories: Vec<_> = self.by_category.iter().collect();
        categories.sort_by_key(|(name, _)| **name);
        for (category, (passed, total)) in categories {
            let _ = writeln!(out, "  {}: {}/{}", category, passed, total);
        }

        let failures: Vec<_> = results.iter().filter(|r| !r.passed()).collect();
        if !failures.is_empty() {
            let _ = writeln!(out, "--- Failed cases ---");
            for failure in failures {
                let _ = writeln!(
                    out,
                    "  [{}] {}: expected {:?}, got {}",
                    failure.category,
                    failure.name,
                    failure.expected,
                    failure.message.as_deref().unwrap_or("no error")
                );
            }
        }
        out
    }
}

// ============================================================================
// Case table
// ============================================================================

fn case(
    name: &'static str,
    category: &'static str,
    source: &'static str,
    options: ParseOptions,
    expected: Expected,
) -> ConformanceCase {
    ConformanceCase {
        name,
        category,
        source,
        options,
        expected,
    }
}

/// The built-in conformance table.
pub fn cases() -> Vec<ConformanceCase> {
    use Expected::{Accept, Reject};
    use SyntaxErrorKind::*;

    let script = ParseOptions::script();
    let strict = ParseOptions::strict();
    let module = ParseOptions::module();
    let no_compat = ParseOptions::script().with_compat_mode(false);
    let expression = ParseOptions::expression();

    vec![
        // Regular expressions versus division.
        case("regexp_after_newline", "regexp", "1\n/x/g", script, Accept),
        case("division_after_paren", "regexp", "(1) / 2", script, Accept),
        case(
            "regexp_after_keyword",
            "regexp",
            "return /x/",
            ParseOptions::script(),
            Reject(IllegalReturn),
        ),
        case("regexp_in_condition", "regexp", "if (/^a/.test(s)) {}", script, Accept),
        case("regexp_bad_flags", "regexp", "/a/gg", script, Reject(InvalidRegExpFlags)),
        case("regexp_unterminated", "regexp", "/a\n/", script, Reject(UnterminatedLiteral)),
        // Automatic semicolon insertion.
        case("asi_prefix_increment", "asi", "{ a\n++b }", script, Accept),
        case("asi_return", "asi", "function f() { return\n1 }", script, Accept),
        case("asi_same_line", "asi", "a b", script, Reject(UnexpectedToken)),
        case("asi_throw_newline", "asi", "throw\n1", script, Reject(LineTerminatorRestriction)),
        case("asi_do_while", "asi", "do x; while (y) z", script, Accept),
        case("asi_for_header", "asi", "for (a\nb;;) {}", script, Reject(UnexpectedToken)),
        // Cover grammar.
        case("arrow_params", "cover", "(a, b) => a + b", script, Accept),
        case("arrow_default_trailing_comma", "cover", "(a = 1,) => a", script, Accept),
        case(
            "arrow_invalid_param",
            "cover",
            "(a + b) => a",
            script,
            Reject(InvalidDestructuringPattern),
        ),
        case(
            "arrow_rest_trailing_comma",
            "cover",
            "(...a,) => a",
            script,
            Reject(InvalidDestructuringPattern),
        ),
        case("parenthesized_sequence", "cover", "(a, b)", script, Accept),
        case("empty_parens", "cover", "()", script, Reject(UnexpectedToken)),
        case("shorthand_init_pattern", "cover", "({a = 1} = b)", script, Accept),
        case(
            "shorthand_init_literal",
            "cover",
            "({a = 1})",
            script,
            Reject(InvalidDestructuringPattern),
        ),
        case(
            "parenthesized_pattern",
            "cover",
            "([a]) = 1",
            script,
            Reject(InvalidDestructuringPattern),
        ),
        case("call_assignment", "cover", "f() = 1", script, Reject(InvalidAssignmentTarget)),
        case("async_arrow", "cover", "async (a) => await a", script, Accept),
        case("async_call", "cover", "async (a, b)", script, Accept),
        // Operators.
        case("coalesce_mix", "operators", "a ?? b || c", script, Reject(InvalidOperatorMix)),
        case("coalesce_parenthesized", "operators", "(a ?? b) || c", script, Accept),
        case("unary_exponent", "operators", "-a ** 2", script, Reject(InvalidOperatorMix)),
        case("optional_chain_call", "operators", "a?.b?.(c)?.[d]", script, Accept),
        case("new_optional_chain", "operators", "new a?.()", script, Reject(UnexpectedToken)),
        // Strict mode and directives.
        case("with_sloppy", "strict", "with (a) b", script, Accept),
        case("with_strict", "strict", "with (a) b", strict, Reject(StrictModeViolation)),
        case("octal_sloppy", "strict", "010", script, Accept),
        case("octal_strict", "strict", "'use strict'; 010", script, Reject(StrictModeViolation)),
        case("octal_no_compat", "strict", "010", no_compat, Reject(InvalidNumber)),
        case(
            "retro_duplicate_params",
            "strict",
            "function f(a, a) { 'use strict' }",
            script,
            Reject(RetroactiveStrictViolation),
        ),
        case(
            "retro_octal_escape",
            "strict",
            "function f() { '\\01'; 'use strict'; }",
            script,
            Reject(RetroactiveStrictViolation),
        ),
        case(
            "use_strict_non_simple",
            "strict",
            "function f(...a) { 'use strict' }",
            script,
            Reject(InvalidUseStrict),
        ),
        case("strict_reserved", "strict", "var package", strict, Reject(ReservedWord)),
        case("eval_assignment", "strict", "eval = 1", strict, Reject(StrictModeViolation)),
        // Declarations and scoping.
        case("let_redeclared", "scope", "let a; let a;", script, Reject(DuplicateBinding)),
        case("var_redeclared", "scope", "var a; var a;", script, Accept),
        case(
            "let_in_statement_position",
            "scope",
            "if (a) let b = 1;",
            script,
            Reject(InvalidDeclarationPosition),
        ),
        case("let_identifier_newline", "scope", "if (a) let\nb = 1", script, Accept),
        case("const_without_init", "scope", "const a;", script, Reject(MissingInitializer)),
        case("catch_var_redeclared", "scope", "try {} catch (e) { var e }", script, Accept),
        case(
            "catch_var_no_compat",
            "scope",
            "try {} catch (e) { var e }",
            no_compat,
            Reject(DuplicateBinding),
        ),
        case(
            "catch_for_of_var",
            "scope",
            "try {} catch (e) { for (var e of []); }",
            script,
            Reject(DuplicateBinding),
        ),
        // Annex-B function declarations.
        case("if_function", "annex_b", "if (a) function f() {}", script, Accept),
        case(
            "if_function_strict",
            "annex_b",
            "if (a) function f() {}",
            strict,
            Reject(InvalidDeclarationPosition),
        ),
        case(
            "if_function_module",
            "annex_b",
            "if (a) function f() {}",
            module,
            Reject(InvalidDeclarationPosition),
        ),
        case("labeled_function", "annex_b", "l: function f() {}", script, Accept),
        case(
            "labeled_generator",
            "annex_b",
            "l: function* g() {}",
            script,
            Reject(InvalidDeclarationPosition),
        ),
        case(
            "block_function_duplicate",
            "annex_b",
            "{ function f() {} function f() {} }",
            script,
            Accept,
        ),
        case(
            "block_function_duplicate_strict",
            "annex_b",
            "{ function f() {} function f() {} }",
            strict,
            Reject(DuplicateBinding),
        ),
        case("html_comment", "annex_b", "a <!-- b\n--> c", script, Accept),
        // Labels, break and continue.
        case("break_outside", "labels", "break", script, Reject(IllegalBreakContinue)),
        case(
            "continue_label_block",
            "labels",
            "l: { continue l; }",
            script,
            Reject(IllegalBreakContinue),
        ),
        case("break_label_block", "labels", "l: { break l; }", script, Accept),
        case("continue_chained_label", "labels", "a: b: for (;;) continue a;", script, Accept),
        case("duplicate_label", "labels", "a: { a: ; }", script, Reject(DuplicateBinding)),
        case("return_outside", "labels", "return", script, Reject(IllegalReturn)),
        // For heads.
        case("for_of_let", "for", "for (let.a of b);", script, Reject(InvalidForHead)),
        case("for_of_async", "for", "for (async of b);", script, Reject(InvalidForHead)),
        case("for_in_initializer", "for", "for (var a = 0 in b);", script, Accept),
        case(
            "for_in_initializer_strict",
            "for",
            "for (var a = 0 in b);",
            strict,
            Reject(InvalidForHead),
        ),
        case("for_of_two_bindings", "for", "for (let a, b of c);", script, Reject(InvalidForHead)),
        case("for_await_module", "for", "for await (const a of b);", module, Accept),
        case(
            "for_await_script",
            "for",
            "for await (const a of b);",
            script,
            Reject(InvalidAwaitOrYield),
        ),
        // Classes.
        case(
            "class_fields",
            "class",
            "class A { a = 1; #b; static c; static { this.c = 2; } }",
            script,
            Accept,
        ),
        case(
            "class_private_accessors",
            "class",
            "class A { get #a() {} set #a(v) {} }",
            script,
            Accept,
        ),
        case(
            "class_duplicate_private",
            "class",
            "class A { #a; #a() {} }",
            script,
            Reject(InvalidPrivateName),
        ),
        case(
            "class_undeclared_private",
            "class",
            "class A { m() { this.#a } }",
            script,
            Reject(InvalidPrivateName),
        ),
        case(
            "class_two_constructors",
            "class",
            "class A { constructor() {} constructor() {} }",
            script,
            Reject(InvalidClassElement),
        ),
        case(
            "class_super_call",
            "class",
            "class A extends B { constructor() { super() } }",
            script,
            Accept,
        ),
        case(
            "class_super_call_base",
            "class",
            "class A { constructor() { super() } }",
            script,
            Reject(InvalidSuper),
        ),
        case(
            "class_field_arguments",
            "class",
            "class A { a = arguments }",
            script,
            Reject(InvalidClassElement),
        ),
        // Modules.
        case("module_import_export", "module", "import a from 'a'; export { a };", module, Accept),
        case(
            "module_import_in_script",
            "module",
            "import a from 'a';",
            script,
            Reject(InvalidDeclarationPosition),
        ),
        case("module_undefined_export", "module", "export { a };", module, Reject(InvalidExport)),
        case(
            "module_duplicate_export",
            "module",
            "var a, b; export { a, b as a };",
            module,
            Reject(InvalidExport),
        ),
        case("module_await_identifier", "module", "var await;", module, Reject(ReservedWord)),
        case("module_import_meta", "module", "import.meta", module, Accept),
        case("module_html_comment", "module", "a\n--> b", module, Reject(UnexpectedToken)),
        // Lexical goal.
        case("expression_goal_object", "goal", "{ a: 1 }", expression, Accept),
        case("expression_goal_trailing", "goal", "a; b", expression, Reject(UnexpectedToken)),
        // Literals.
        case("numeric_separator", "literal", "1_000", script, Accept),
        case("numeric_separator_trailing", "literal", "1_", script, Reject(InvalidNumber)),
        case("bigint", "literal", "10n", script, Accept),
        case("hex_escape", "literal", "'\\x4g'", script, Reject(InvalidEscape)),
        case("template_octal", "literal", "`\\01`", script, Reject(InvalidEscape)),
        case("tagged_template_octal", "literal", "tag`\\01`", script, Accept),
        case("illegal_character", "literal", "a # b", script, Reject(IllegalCharacter)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_names_are_unique() {
        let cases = cases();
        let mut names: Vec<_> = cases.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), cases.len());
    }

    #[test]
    fn test_result_passes_only_on_matching_kind() {
        let result = CaseResult {
            name: "x",
            category: "c",
            expected: Expected::Reject(SyntaxErrorKind::DuplicateBinding),
            actual: Some(SyntaxErrorKind::UnexpectedToken),
            message: None,
        };
        assert!(!result.passed());
        let accepted = CaseResult {
            expected: Expected::Accept,
            actual: None,
            ..result
        };
        assert!(accepted.passed());
    }

    #[test]
    fn test_summary_counts_by_category() {
        let illegal_return = Expected::Reject(SyntaxErrorKind::IllegalReturn);
        let results = vec![
            run_case(&case("ok", "a", "x", ParseOptions::script(), Expected::Accept)),
            run_case(&case("bad", "a", "x", ParseOptions::script(), illegal_return)),
            run_case(&case("ok2", "b", "return", ParseOptions::script(), illegal_return)),
        ];
        let summary = Summary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.by_category["a"], (1, 2));
        assert_eq!(summary.by_category["b"], (1, 1));
        assert!(summary.render(&results).contains("[a] bad"));
    }
}

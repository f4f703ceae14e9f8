//! jsparse_diagnostics: the syntax error type and its message table.
//!
//! Parsing is fail-fast: the first problem found anywhere becomes a single
//! [`SyntaxError`]. Every error carries a [`SyntaxErrorKind`] so that callers
//! can tell sub-reasons apart without matching on message text.

use jsparse_core::text::{LineMap, TextRange, TextSpan};
use serde::Serialize;
use std::fmt;

/// The distinguishable sub-reasons of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxErrorKind {
    UnexpectedToken,
    IllegalCharacter,
    InvalidEscape,
    UnterminatedLiteral,
    InvalidNumber,
    InvalidRegExpFlags,
    InvalidRegExp,
    InvalidAssignmentTarget,
    InvalidDestructuringPattern,
    MissingInitializer,
    DuplicateBinding,
    DuplicateParameter,
    ReservedWord,
    IllegalBreakContinue,
    IllegalReturn,
    LineTerminatorRestriction,
    StrictModeViolation,
    /// A check that only failed because a later `"use strict"` directive
    /// turned the enclosing function (or script) strict.
    RetroactiveStrictViolation,
    InvalidUseStrict,
    InvalidAwaitOrYield,
    InvalidSuper,
    InvalidMetaProperty,
    InvalidClassElement,
    InvalidPrivateName,
    InvalidExport,
    InvalidOperatorMix,
    InvalidForHead,
    InvalidDeclarationPosition,
    InvalidEncoding,
    NestingTooDeep,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A message template with a numeric code and the kind it reports.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The error code, rendered as `JS<code>`.
    pub code: u32,
    pub kind: SyntaxErrorKind,
    /// The message template. May contain `{0}`, `{1}` placeholders.
    pub message: &'static str,
}

/// Replace `{0}`, `{1}`, ... in `template` with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A syntax error with its location resolved to line and column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({line}:{column})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub code: u32,
    pub message: String,
    pub span: TextSpan,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, in characters.
    pub column: u32,
}

impl SyntaxError {
    /// Build an error for `range` within `source`.
    pub fn new(source: &str, range: TextRange, message: &DiagnosticMessage, args: &[&str]) -> Self {
        let map = LineMap::new(source);
        let lc = map.line_and_column_of(source, range.start);
        Self {
            kind: message.kind,
            code: message.code,
            message: format_message(message.message, args),
            span: range.to_span(),
            line: lc.line + 1,
            column: lc.character + 1,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxErrorKind {
        self.kind
    }

    /// Attach the source text so miette can render a labeled snippet.
    pub fn into_report(self, source: &str) -> miette::Report {
        miette::Report::new(self).with_source_code(source.to_string())
    }
}

impl miette::Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("JS{}", self.code)))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let label = miette::LabeledSpan::new(
            Some(self.kind.to_string()),
            self.span.start as usize,
            self.span.length as usize,
        );
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// Message table
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $kind:ident, $msg:expr) => {
            DiagnosticMessage { code: $code, kind: SyntaxErrorKind::$kind, message: $msg }
        };
    }

    // ========================================================================
    // Scanner (1000-1099)
    // ========================================================================
    pub const INVALID_CHARACTER: DiagnosticMessage =
        diag!(1001, IllegalCharacter, "Invalid or unexpected character '{0}'.");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        diag!(1002, UnterminatedLiteral, "Unterminated string literal.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage =
        diag!(1003, UnterminatedLiteral, "Unterminated template literal.");
    pub const UNTERMINATED_REGEXP_LITERAL: DiagnosticMessage =
        diag!(1004, UnterminatedLiteral, "Unterminated regular expression literal.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage =
        diag!(1005, UnterminatedLiteral, "Unterminated comment.");
    pub const INVALID_HEX_ESCAPE: DiagnosticMessage =
        diag!(1006, InvalidEscape, "Invalid hexadecimal escape sequence.");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage =
        diag!(1007, InvalidEscape, "Invalid Unicode escape sequence.");
    pub const UNDEFINED_CODE_POINT: DiagnosticMessage =
        diag!(1008, InvalidEscape, "Undefined Unicode code-point.");
    pub const INVALID_IDENTIFIER_ESCAPE: DiagnosticMessage =
        diag!(1009, InvalidEscape, "Invalid Unicode escape in identifier.");
    pub const OCTAL_ESCAPE_IN_TEMPLATE: DiagnosticMessage =
        diag!(1010, InvalidEscape, "Octal escape sequences are not allowed in template strings.");
    pub const LEGACY_OCTAL_ESCAPE_DISABLED: DiagnosticMessage =
        diag!(1011, InvalidEscape, "Octal escape sequences require compatibility mode.");
    pub const NUMERIC_SEPARATOR_NOT_ALLOWED: DiagnosticMessage =
        diag!(1020, InvalidNumber, "Numeric separators are not allowed here.");
    pub const IDENTIFIER_AFTER_NUMBER: DiagnosticMessage = diag!(
        1021,
        InvalidNumber,
        "An identifier or keyword cannot immediately follow a numeric literal."
    );
    pub const INVALID_BIGINT: DiagnosticMessage =
        diag!(1022, InvalidNumber, "Invalid BigInt literal.");
    pub const DIGIT_EXPECTED: DiagnosticMessage = diag!(1023, InvalidNumber, "Digit expected.");
    pub const LEGACY_OCTAL_LITERAL_DISABLED: DiagnosticMessage =
        diag!(1024, InvalidNumber, "Legacy octal literals require compatibility mode.");
    pub const INVALID_REGEXP_FLAGS: DiagnosticMessage =
        diag!(1030, InvalidRegExpFlags, "Invalid regular expression flags '{0}'.");
    pub const INVALID_REGEXP: DiagnosticMessage =
        diag!(1031, InvalidRegExp, "Invalid regular expression: /{0}/: {1}.");

    // ========================================================================
    // Strict mode (1100-1199)
    // ========================================================================
    pub const OCTAL_LITERAL_IN_STRICT: DiagnosticMessage =
        diag!(1100, StrictModeViolation, "Octal literals are not allowed in strict mode.");
    pub const OCTAL_ESCAPE_IN_STRICT: DiagnosticMessage =
        diag!(1101, StrictModeViolation, "Octal escape sequences are not allowed in strict mode.");
    pub const WITH_IN_STRICT: DiagnosticMessage =
        diag!(1102, StrictModeViolation, "Strict mode code may not include a with statement.");
    pub const DELETE_IDENTIFIER_IN_STRICT: DiagnosticMessage =
        diag!(1103, StrictModeViolation, "Delete of an unqualified identifier in strict mode.");
    pub const RESTRICTED_NAME_IN_STRICT: DiagnosticMessage =
        diag!(1104, StrictModeViolation, "Unexpected '{0}' in strict mode.");
    pub const STRICT_RESERVED_WORD: DiagnosticMessage =
        diag!(1105, ReservedWord, "Unexpected strict mode reserved word '{0}'.");
    pub const RETRO_DUPLICATE_PARAMETER: DiagnosticMessage = diag!(
        1110,
        RetroactiveStrictViolation,
        "Duplicate parameter name '{0}' is not allowed once 'use strict' applies."
    );
    pub const RETRO_OCTAL_ESCAPE: DiagnosticMessage = diag!(
        1111,
        RetroactiveStrictViolation,
        "Octal escape sequence in a directive before 'use strict'."
    );
    pub const RETRO_RESTRICTED_NAME: DiagnosticMessage = diag!(
        1112,
        RetroactiveStrictViolation,
        "Binding '{0}' is not allowed once 'use strict' applies."
    );
    pub const RETRO_RESERVED_WORD: DiagnosticMessage = diag!(
        1113,
        RetroactiveStrictViolation,
        "'{0}' is a reserved word once 'use strict' applies."
    );

    // ========================================================================
    // Tokens (1200-1299)
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage =
        diag!(1200, UnexpectedToken, "Unexpected token '{0}'.");
    pub const UNEXPECTED_END: DiagnosticMessage =
        diag!(1201, UnexpectedToken, "Unexpected end of input.");
    pub const EXPECTED_TOKEN: DiagnosticMessage = diag!(1202, UnexpectedToken, "'{0}' expected.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage =
        diag!(1203, UnexpectedToken, "Identifier expected.");
    pub const DUPLICATE_DEFAULT_CLAUSE: DiagnosticMessage =
        diag!(1204, UnexpectedToken, "More than one default clause in switch statement.");
    pub const TAGGED_TEMPLATE_IN_CHAIN: DiagnosticMessage =
        diag!(1205, UnexpectedToken, "Invalid tagged template on optional chain.");
    pub const NEW_OPTIONAL_CHAIN: DiagnosticMessage =
        diag!(1206, UnexpectedToken, "Invalid optional chain from new expression.");
    pub const UNEXPECTED_RESERVED_WORD: DiagnosticMessage =
        diag!(1210, ReservedWord, "Unexpected reserved word '{0}'.");
    pub const ESCAPED_KEYWORD: DiagnosticMessage =
        diag!(1211, ReservedWord, "Keywords cannot contain escape characters.");
    pub const LET_IN_LEXICAL_BINDING: DiagnosticMessage =
        diag!(1212, ReservedWord, "'let' is disallowed as a lexically bound name.");

    // ========================================================================
    // Line terminator restrictions (1300-1399)
    // ========================================================================
    pub const NEWLINE_AFTER_THROW: DiagnosticMessage =
        diag!(1300, LineTerminatorRestriction, "Illegal newline after throw.");
    pub const NEWLINE_BEFORE_ARROW: DiagnosticMessage =
        diag!(1301, LineTerminatorRestriction, "Line terminator not permitted before arrow.");
    pub const NEWLINE_AFTER_ASYNC: DiagnosticMessage = diag!(
        1302,
        LineTerminatorRestriction,
        "Line terminator not permitted after 'async' in an arrow function."
    );

    // ========================================================================
    // Targets and patterns (1400-1499)
    // ========================================================================
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage =
        diag!(1400, InvalidAssignmentTarget, "Invalid left-hand side in assignment.");
    pub const INVALID_UPDATE_TARGET: DiagnosticMessage =
        diag!(1401, InvalidAssignmentTarget, "Invalid left-hand side expression in {0} operation.");
    pub const INVALID_FOR_TARGET: DiagnosticMessage =
        diag!(1402, InvalidAssignmentTarget, "Invalid left-hand side in for-{0} loop.");
    pub const INVALID_DESTRUCTURING_TARGET: DiagnosticMessage =
        diag!(1410, InvalidDestructuringPattern, "Invalid destructuring assignment target.");
    pub const INVALID_BINDING_PATTERN: DiagnosticMessage =
        diag!(1411, InvalidDestructuringPattern, "Invalid binding pattern.");
    pub const REST_NOT_LAST: DiagnosticMessage =
        diag!(1412, InvalidDestructuringPattern, "Rest element must be last element.");
    pub const REST_WITH_INITIALIZER: DiagnosticMessage = diag!(
        1413,
        InvalidDestructuringPattern,
        "Rest element may not have a default initializer."
    );
    pub const INVALID_SHORTHAND_INITIALIZER: DiagnosticMessage =
        diag!(1414, InvalidDestructuringPattern, "Invalid shorthand property initializer.");
    pub const PARENTHESIZED_PATTERN: DiagnosticMessage =
        diag!(1415, InvalidDestructuringPattern, "Invalid parenthesized pattern.");
    pub const INVALID_ARROW_PARAMETERS: DiagnosticMessage =
        diag!(1416, InvalidDestructuringPattern, "Invalid arrow function parameter list.");
    pub const INVALID_REST_ELEMENT: DiagnosticMessage =
        diag!(1417, InvalidDestructuringPattern, "Invalid rest element.");
    pub const MISSING_DESTRUCTURING_INITIALIZER: DiagnosticMessage =
        diag!(1420, MissingInitializer, "Missing initializer in destructuring declaration.");
    pub const MISSING_CONST_INITIALIZER: DiagnosticMessage =
        diag!(1421, MissingInitializer, "Missing initializer in const declaration.");

    // ========================================================================
    // Bindings (1500-1599)
    // ========================================================================
    pub const DUPLICATE_BINDING: DiagnosticMessage =
        diag!(1500, DuplicateBinding, "Identifier '{0}' has already been declared.");
    pub const DUPLICATE_LABEL: DiagnosticMessage =
        diag!(1501, DuplicateBinding, "Label '{0}' has already been declared.");
    pub const DUPLICATE_PROTO: DiagnosticMessage = diag!(
        1502,
        DuplicateBinding,
        "Duplicate __proto__ fields are not allowed in object literals."
    );
    pub const DUPLICATE_PARAMETER: DiagnosticMessage = diag!(
        1510,
        DuplicateParameter,
        "Duplicate parameter name '{0}' not allowed in this context."
    );
    pub const DUPLICATE_EXPORT: DiagnosticMessage =
        diag!(1520, InvalidExport, "Duplicate export of '{0}'.");
    pub const UNDEFINED_EXPORT: DiagnosticMessage =
        diag!(1521, InvalidExport, "Export '{0}' is not defined.");
    pub const STRING_EXPORT_WITHOUT_FROM: DiagnosticMessage =
        diag!(1522, InvalidExport, "A string export name requires a 'from' clause.");

    // ========================================================================
    // Control flow (1600-1699)
    // ========================================================================
    pub const ILLEGAL_BREAK: DiagnosticMessage =
        diag!(1600, IllegalBreakContinue, "Illegal break statement.");
    pub const ILLEGAL_CONTINUE: DiagnosticMessage = diag!(
        1601,
        IllegalBreakContinue,
        "Illegal continue statement: no surrounding iteration statement."
    );
    pub const UNDEFINED_LABEL: DiagnosticMessage =
        diag!(1602, IllegalBreakContinue, "Undefined label '{0}'.");
    pub const CONTINUE_TARGET_NOT_LOOP: DiagnosticMessage = diag!(
        1603,
        IllegalBreakContinue,
        "Illegal continue statement: '{0}' does not denote an iteration statement."
    );
    pub const ILLEGAL_RETURN: DiagnosticMessage =
        diag!(1610, IllegalReturn, "Illegal return statement.");

    // ========================================================================
    // Functions and classes (1700-1799)
    // ========================================================================
    pub const USE_STRICT_NON_SIMPLE: DiagnosticMessage = diag!(
        1700,
        InvalidUseStrict,
        "Illegal 'use strict' directive in function with non-simple parameter list."
    );
    pub const YIELD_IN_PARAMETER: DiagnosticMessage =
        diag!(1701, InvalidAwaitOrYield, "Yield expression not allowed in formal parameter.");
    pub const AWAIT_IN_PARAMETER: DiagnosticMessage =
        diag!(1702, InvalidAwaitOrYield, "Await expression not allowed in formal parameter.");
    pub const FOR_AWAIT_OUTSIDE_ASYNC: DiagnosticMessage =
        diag!(1703, InvalidAwaitOrYield, "for await is only valid in async functions and modules.");
    pub const AWAIT_IN_CLASS_FIELD: DiagnosticMessage = diag!(
        1704,
        InvalidAwaitOrYield,
        "Await expression not allowed in class field initializer."
    );
    pub const GETTER_PARAMETERS: DiagnosticMessage =
        diag!(1710, InvalidClassElement, "Getter must not have any formal parameters.");
    pub const SETTER_PARAMETERS: DiagnosticMessage =
        diag!(1711, InvalidClassElement, "Setter must have exactly one formal parameter.");
    pub const SETTER_REST_PARAMETER: DiagnosticMessage =
        diag!(1712, InvalidClassElement, "Setter function argument must not be a rest parameter.");
    pub const DUPLICATE_CONSTRUCTOR: DiagnosticMessage =
        diag!(1720, InvalidClassElement, "A class may only have one constructor.");
    pub const SPECIAL_CONSTRUCTOR: DiagnosticMessage =
        diag!(1721, InvalidClassElement, "Class constructor may not be {0}.");
    pub const STATIC_PROTOTYPE: DiagnosticMessage = diag!(
        1722,
        InvalidClassElement,
        "Classes may not have a static property named 'prototype'."
    );
    pub const FIELD_NAMED_CONSTRUCTOR: DiagnosticMessage =
        diag!(1723, InvalidClassElement, "Classes may not have a field named 'constructor'.");
    pub const ARGUMENTS_IN_CLASS_INIT: DiagnosticMessage = diag!(
        1724,
        InvalidClassElement,
        "'arguments' is not allowed in class field initializer or static initialization block."
    );
    pub const PRIVATE_CONSTRUCTOR: DiagnosticMessage = diag!(
        1730,
        InvalidPrivateName,
        "Classes may not have a private field named '#constructor'."
    );
    pub const DUPLICATE_PRIVATE_NAME: DiagnosticMessage =
        diag!(1731, InvalidPrivateName, "Identifier '#{0}' has already been declared.");
    pub const UNDECLARED_PRIVATE_NAME: DiagnosticMessage = diag!(
        1732,
        InvalidPrivateName,
        "Private field '#{0}' must be declared in an enclosing class."
    );
    pub const PRIVATE_DELETE: DiagnosticMessage =
        diag!(1733, InvalidPrivateName, "Private fields can not be deleted.");
    pub const UNEXPECTED_SUPER: DiagnosticMessage =
        diag!(1740, InvalidSuper, "'super' keyword unexpected here.");
    pub const NEW_TARGET_OUTSIDE_FUNCTION: DiagnosticMessage =
        diag!(1750, InvalidMetaProperty, "new.target expression is not allowed here.");
    pub const IMPORT_META_OUTSIDE_MODULE: DiagnosticMessage =
        diag!(1751, InvalidMetaProperty, "Cannot use 'import.meta' outside a module.");
    pub const INVALID_META_PROPERTY: DiagnosticMessage =
        diag!(1752, InvalidMetaProperty, "The only valid meta property for {0} is {0}.{1}.");

    // ========================================================================
    // Operators (1800-1899)
    // ========================================================================
    pub const MIXED_COALESCE: DiagnosticMessage =
        diag!(1800, InvalidOperatorMix, "Cannot mix '??' with '||' or '&&' without parentheses.");
    pub const UNARY_BEFORE_EXPONENT: DiagnosticMessage = diag!(
        1801,
        InvalidOperatorMix,
        "Unary operator used immediately before exponentiation expression; parentheses must be used to disambiguate operator precedence."
    );

    // ========================================================================
    // Statements and declarations (1900-1999)
    // ========================================================================
    pub const LEXICAL_IN_STATEMENT_POSITION: DiagnosticMessage = diag!(
        1900,
        InvalidDeclarationPosition,
        "Lexical declaration cannot appear in a single-statement context."
    );
    pub const FUNCTION_IN_STATEMENT_POSITION: DiagnosticMessage = diag!(
        1901,
        InvalidDeclarationPosition,
        "Function declarations are not allowed in this statement position."
    );
    pub const LABELED_GENERATOR_OR_ASYNC: DiagnosticMessage = diag!(
        1902,
        InvalidDeclarationPosition,
        "Generators and async functions cannot be labelled or used as an if-statement body."
    );
    pub const MODULE_ITEM_POSITION: DiagnosticMessage = diag!(
        1903,
        InvalidDeclarationPosition,
        "'{0}' declarations may only appear at the top level of a module."
    );
    pub const FOR_HEAD_SINGLE_BINDING: DiagnosticMessage = diag!(
        1910,
        InvalidForHead,
        "Invalid left-hand side in for-{0} loop: must have a single binding."
    );
    pub const FOR_HEAD_INITIALIZER: DiagnosticMessage = diag!(
        1911,
        InvalidForHead,
        "for-{0} loop variable declaration may not have an initializer."
    );
    pub const FOR_OF_LET: DiagnosticMessage =
        diag!(1912, InvalidForHead, "The left-hand side of a for-of loop may not be 'let'.");
    pub const FOR_OF_ASYNC: DiagnosticMessage =
        diag!(1913, InvalidForHead, "The left-hand side of a for-of loop may not be 'async'.");
    pub const NESTING_TOO_DEEP: DiagnosticMessage =
        diag!(1990, NestingTooDeep, "Maximum nesting depth exceeded.");
    pub const INVALID_ENCODING: DiagnosticMessage =
        diag!(1991, InvalidEncoding, "Source text is not valid UTF-8.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_format_message() {
        let msg = format_message("Identifier '{0}' has already been declared.", &["x"]);
        assert_eq!(msg, "Identifier 'x' has already been declared.");
        let msg =
            format_message("The only valid meta property for {0} is {0}.{1}.", &["new", "target"]);
        assert_eq!(msg, "The only valid meta property for new is new.target.");
    }

    #[test]
    fn test_error_line_and_column() {
        let source = "let a;\nlet a;";
        let err =
            SyntaxError::new(source, TextRange::new(11, 12), &messages::DUPLICATE_BINDING, &["a"]);
        assert_eq!(err.kind(), SyntaxErrorKind::DuplicateBinding);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 5);
        assert_eq!(err.to_string(), "Identifier 'a' has already been declared. (2:5)");
    }

    #[test]
    fn test_miette_code_and_label() {
        let err = SyntaxError::new("break;", TextRange::new(0, 5), &messages::ILLEGAL_BREAK, &[]);
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("JS1600"));
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 0);
        assert_eq!(labels[0].len(), 5);
        let report = err.into_report("break;");
        assert!(report.to_string().contains("Illegal break statement"));
    }
}

//! Parser utility functions.

use jsparse_ast::syntax_kind::SyntaxKind;

/// Words that are reserved only in strict mode code.
pub fn is_strict_reserved_word(name: &str) -> bool {
    matches!(
        name,
        "implements"
            | "interface"
            | "let"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "static"
            | "yield"
    )
}

/// Names that strict mode code may not bind or assign.
#[inline]
pub fn is_restricted_name(name: &str) -> bool {
    name == "eval" || name == "arguments"
}

/// Whether `name` is spelled like an always-reserved word.
#[inline]
pub fn is_reserved_word(name: &str) -> bool {
    SyntaxKind::from_keyword(name).is_some()
}

/// Whether a token kind can start an expression. Decides whether `yield`
/// has an operand.
pub fn can_start_expression(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::PrivateIdentifier
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateHead
            | SyntaxKind::OpenParenToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::NewKeyword
            | SyntaxKind::DeleteKeyword
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::SlashToken
            | SyntaxKind::SlashEqualsToken
            | SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::ImportKeyword
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
    )
}

/// The text between the quotes of a string literal token.
#[inline]
pub fn string_literal_body(raw: &str) -> &str {
    raw.get(1..raw.len().saturating_sub(1)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_word_tables() {
        assert!(is_strict_reserved_word("static"));
        assert!(!is_strict_reserved_word("await"));
        assert!(is_reserved_word("enum"));
        assert!(!is_reserved_word("let"));
        assert!(is_restricted_name("arguments"));
    }

    #[test]
    fn test_string_literal_body() {
        assert_eq!(string_literal_body("'use strict'"), "use strict");
        assert_eq!(string_literal_body("\"\""), "");
    }
}

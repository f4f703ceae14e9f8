//! Operator precedence for binary and logical operators.

use jsparse_ast::syntax_kind::SyntaxKind;

/// Operator precedence levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    NullishCoalescing = 1,
    LogicalOr = 2,
    LogicalAnd = 3,
    BitwiseOr = 4,
    BitwiseXor = 5,
    BitwiseAnd = 6,
    Equality = 7,
    Relational = 8,
    Shift = 9,
    Additive = 10,
    Multiplicative = 11,
    Exponentiation = 12,
    Invalid = 255,
}

impl OperatorPrecedence {
    /// `**` is the only right-associative binary operator.
    #[inline]
    pub fn is_right_associative(self) -> bool {
        self == OperatorPrecedence::Exponentiation
    }
}

/// Get the binary operator precedence for a given token kind.
///
/// `in` only counts when `allow_in` is set; it is excluded inside the
/// initializer of a `for` head.
pub fn get_binary_operator_precedence(kind: SyntaxKind, allow_in: bool) -> OperatorPrecedence {
    match kind {
        SyntaxKind::QuestionQuestionToken => OperatorPrecedence::NullishCoalescing,
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::BarToken => OperatorPrecedence::BitwiseOr,
        SyntaxKind::CaretToken => OperatorPrecedence::BitwiseXor,
        SyntaxKind::AmpersandToken => OperatorPrecedence::BitwiseAnd,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => OperatorPrecedence::Equality,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword => OperatorPrecedence::Relational,
        SyntaxKind::InKeyword if allow_in => OperatorPrecedence::Relational,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => OperatorPrecedence::Shift,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        SyntaxKind::AsteriskAsteriskToken => OperatorPrecedence::Exponentiation,
        _ => OperatorPrecedence::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        let add = get_binary_operator_precedence(SyntaxKind::PlusToken, true);
        let mul = get_binary_operator_precedence(SyntaxKind::AsteriskToken, true);
        let coalesce = get_binary_operator_precedence(SyntaxKind::QuestionQuestionToken, true);
        let or = get_binary_operator_precedence(SyntaxKind::BarBarToken, true);
        assert!(mul > add);
        assert!(or > coalesce);
        let exponent = get_binary_operator_precedence(SyntaxKind::AsteriskAsteriskToken, true);
        assert!(exponent.is_right_associative());
    }

    #[test]
    fn test_in_is_gated() {
        let precedence = |kind, allow_in| get_binary_operator_precedence(kind, allow_in);
        assert_eq!(precedence(SyntaxKind::InKeyword, true), OperatorPrecedence::Relational);
        assert_eq!(precedence(SyntaxKind::InKeyword, false), OperatorPrecedence::Invalid);
        assert_eq!(precedence(SyntaxKind::EqualsToken, true), OperatorPrecedence::Invalid);
    }
}

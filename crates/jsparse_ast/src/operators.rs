//! Operator enums for unary, update, binary, logical and assignment nodes.

use crate::syntax_kind::SyntaxKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    Equality,
    Inequality,
    StrictEquality,
    StrictInequality,
    LessThan,
    LessEqualThan,
    GreaterThan,
    GreaterEqualThan,
    ShiftLeft,
    ShiftRight,
    ShiftRightZeroFill,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Remainder,
    Exponential,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    In,
    Instanceof,
}

impl BinaryOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::EqualsEqualsToken => Self::Equality,
            SyntaxKind::ExclamationEqualsToken => Self::Inequality,
            SyntaxKind::EqualsEqualsEqualsToken => Self::StrictEquality,
            SyntaxKind::ExclamationEqualsEqualsToken => Self::StrictInequality,
            SyntaxKind::LessThanToken => Self::LessThan,
            SyntaxKind::LessThanEqualsToken => Self::LessEqualThan,
            SyntaxKind::GreaterThanToken => Self::GreaterThan,
            SyntaxKind::GreaterThanEqualsToken => Self::GreaterEqualThan,
            SyntaxKind::LessThanLessThanToken => Self::ShiftLeft,
            SyntaxKind::GreaterThanGreaterThanToken => Self::ShiftRight,
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken => Self::ShiftRightZeroFill,
            SyntaxKind::PlusToken => Self::Addition,
            SyntaxKind::MinusToken => Self::Subtraction,
            SyntaxKind::AsteriskToken => Self::Multiplication,
            SyntaxKind::SlashToken => Self::Division,
            SyntaxKind::PercentToken => Self::Remainder,
            SyntaxKind::AsteriskAsteriskToken => Self::Exponential,
            SyntaxKind::BarToken => Self::BitwiseOr,
            SyntaxKind::CaretToken => Self::BitwiseXor,
            SyntaxKind::AmpersandToken => Self::BitwiseAnd,
            SyntaxKind::InKeyword => Self::In,
            SyntaxKind::InstanceOfKeyword => Self::Instanceof,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equality => "==",
            Self::Inequality => "!=",
            Self::StrictEquality => "===",
            Self::StrictInequality => "!==",
            Self::LessThan => "<",
            Self::LessEqualThan => "<=",
            Self::GreaterThan => ">",
            Self::GreaterEqualThan => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::ShiftRightZeroFill => ">>>",
            Self::Addition => "+",
            Self::Subtraction => "-",
            Self::Multiplication => "*",
            Self::Division => "/",
            Self::Remainder => "%",
            Self::Exponential => "**",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::BitwiseAnd => "&",
            Self::In => "in",
            Self::Instanceof => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOperator {
    Or,
    And,
    Coalesce,
}

impl LogicalOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::BarBarToken => Some(Self::Or),
            SyntaxKind::AmpersandAmpersandToken => Some(Self::And),
            SyntaxKind::QuestionQuestionToken => Some(Self::Coalesce),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignmentOperator {
    Assign,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Remainder,
    Exponential,
    ShiftLeft,
    ShiftRight,
    ShiftRightZeroFill,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    LogicalOr,
    LogicalAnd,
    LogicalNullish,
}

impl AssignmentOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::EqualsToken => Self::Assign,
            SyntaxKind::PlusEqualsToken => Self::Addition,
            SyntaxKind::MinusEqualsToken => Self::Subtraction,
            SyntaxKind::AsteriskEqualsToken => Self::Multiplication,
            SyntaxKind::SlashEqualsToken => Self::Division,
            SyntaxKind::PercentEqualsToken => Self::Remainder,
            SyntaxKind::AsteriskAsteriskEqualsToken => Self::Exponential,
            SyntaxKind::LessThanLessThanEqualsToken => Self::ShiftLeft,
            SyntaxKind::GreaterThanGreaterThanEqualsToken => Self::ShiftRight,
            SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => Self::ShiftRightZeroFill,
            SyntaxKind::BarEqualsToken => Self::BitwiseOr,
            SyntaxKind::CaretEqualsToken => Self::BitwiseXor,
            SyntaxKind::AmpersandEqualsToken => Self::BitwiseAnd,
            SyntaxKind::BarBarEqualsToken => Self::LogicalOr,
            SyntaxKind::AmpersandAmpersandEqualsToken => Self::LogicalAnd,
            SyntaxKind::QuestionQuestionEqualsToken => Self::LogicalNullish,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Addition => "+=",
            Self::Subtraction => "-=",
            Self::Multiplication => "*=",
            Self::Division => "/=",
            Self::Remainder => "%=",
            Self::Exponential => "**=",
            Self::ShiftLeft => "<<=",
            Self::ShiftRight => ">>=",
            Self::ShiftRightZeroFill => ">>>=",
            Self::BitwiseOr => "|=",
            Self::BitwiseXor => "^=",
            Self::BitwiseAnd => "&=",
            Self::LogicalOr => "||=",
            Self::LogicalAnd => "&&=",
            Self::LogicalNullish => "??=",
        }
    }

    /// Only plain `=` accepts a destructuring pattern on its left.
    #[inline]
    pub fn is_plain(self) -> bool {
        self == Self::Assign
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    Minus,
    Plus,
    LogicalNot,
    BitwiseNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::MinusToken => Self::Minus,
            SyntaxKind::PlusToken => Self::Plus,
            SyntaxKind::ExclamationToken => Self::LogicalNot,
            SyntaxKind::TildeToken => Self::BitwiseNot,
            SyntaxKind::TypeOfKeyword => Self::Typeof,
            SyntaxKind::VoidKeyword => Self::Void,
            SyntaxKind::DeleteKeyword => Self::Delete,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Plus => "+",
            Self::LogicalNot => "!",
            Self::BitwiseNot => "~",
            Self::Typeof => "typeof",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl UpdateOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::PlusPlusToken => Some(Self::Increment),
            SyntaxKind::MinusMinusToken => Some(Self::Decrement),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "++",
            Self::Decrement => "--",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens() {
        assert_eq!(BinaryOperator::from_token(SyntaxKind::InKeyword), Some(BinaryOperator::In));
        assert_eq!(BinaryOperator::from_token(SyntaxKind::BarBarToken), None);
        assert_eq!(
            LogicalOperator::from_token(SyntaxKind::QuestionQuestionToken),
            Some(LogicalOperator::Coalesce)
        );
        assert_eq!(
            AssignmentOperator::from_token(SyntaxKind::QuestionQuestionEqualsToken)
                .map(AssignmentOperator::as_str),
            Some("??=")
        );
        assert!(!AssignmentOperator::LogicalAnd.is_plain());
    }
}

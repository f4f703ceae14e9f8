//! Token information produced by the scanner.

use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::TokenFlags;
use jsparse_core::text::TextRange;

/// A snapshot of one scanned token.
///
/// The parser reads the scanner's current token in place; this struct is
/// what lookahead and tests hand around.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub kind: SyntaxKind,
    pub range: TextRange,
    /// The decoded value for identifiers, strings and templates.
    pub value: String,
    pub flags: TokenFlags,
}

impl TokenInfo {
    /// Whether there was a line break before this token.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Whether this is the identifier `name`, spelled without escapes.
    pub fn is_contextual(&self, name: &str) -> bool {
        self.kind == SyntaxKind::Identifier
            && !self.flags.contains(TokenFlags::UNICODE_ESCAPE)
            && self.value == name
    }
}

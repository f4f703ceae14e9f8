//! Flag types and small enums shared by the scanner, parser and AST.

use serde::Serialize;
use std::fmt;

// Token flags from the scanner.
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u16 {
        const NONE                              = 0;
        /// A line terminator occurred between this token and the previous one.
        const PRECEDING_LINE_BREAK              = 1 << 0;
        const SCIENTIFIC                         = 1 << 1;
        /// Legacy octal integer literal (`017`).
        const OCTAL                              = 1 << 2;
        /// Leading-zero decimal literal (`08`, `09.5`).
        const NON_OCTAL_DECIMAL                  = 1 << 3;
        const HEX_SPECIFIER                      = 1 << 4;
        const BINARY_SPECIFIER                   = 1 << 5;
        const OCTAL_SPECIFIER                    = 1 << 6;
        const CONTAINS_SEPARATOR                 = 1 << 7;
        /// An identifier spelled with `\u` escapes.
        const UNICODE_ESCAPE                     = 1 << 8;
        /// A string literal with a legacy octal escape (`\1`, `\08`, `\8`).
        const OCTAL_ESCAPE                       = 1 << 9;
        /// A template segment whose cooked value is undefined.
        const CONTAINS_INVALID_ESCAPE            = 1 << 10;
        /// An HTML-like comment was skipped before this token.
        const PRECEDING_HTML_COMMENT             = 1 << 11;
        /// A string literal with any escape sequence or line continuation.
        const CONTAINS_ESCAPE                    = 1 << 12;

        const NUMERIC_LITERAL_FLAGS = Self::SCIENTIFIC.bits()
            | Self::OCTAL.bits()
            | Self::NON_OCTAL_DECIMAL.bits()
            | Self::HEX_SPECIFIER.bits()
            | Self::BINARY_SPECIFIER.bits()
            | Self::OCTAL_SPECIFIER.bits()
            | Self::CONTAINS_SEPARATOR.bits();

        /// Constructs that are only legal in sloppy code.
        const LEGACY_OCTAL = Self::OCTAL.bits()
            | Self::NON_OCTAL_DECIMAL.bits()
            | Self::OCTAL_ESCAPE.bits();
    }
}

/// Whether the program was parsed as a script or a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceType {
    Script,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }

    #[inline]
    pub fn is_lexical(self) -> bool {
        self != VariableKind::Var
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of an object literal property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

/// The kind of a class method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_octal_mask() {
        let flags = TokenFlags::NON_OCTAL_DECIMAL | TokenFlags::PRECEDING_LINE_BREAK;
        assert!(flags.intersects(TokenFlags::LEGACY_OCTAL));
        assert!(!TokenFlags::HEX_SPECIFIER.intersects(TokenFlags::LEGACY_OCTAL));
    }
}

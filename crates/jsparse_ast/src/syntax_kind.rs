//! SyntaxKind enum - every token kind the scanner produces.
//!
//! Only the always-reserved words get their own kinds. Contextual keywords
//! (`let`, `static`, `yield`, `await`, `async`, `of`, `get`, `set`, `from`,
//! `as`, ...) are scanned as [`SyntaxKind::Identifier`] and recognized by the
//! parser at each use site.

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // Literals
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,

    // Pseudo-literals (template)
    TemplateHead,
    TemplateMiddle,
    TemplateTail,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    QuestionDotToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionToken,
    ColonToken,
    QuestionQuestionToken,

    // Assignments
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    AsteriskAsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    BarBarEqualsToken,
    AmpersandAmpersandEqualsToken,
    QuestionQuestionEqualsToken,

    // Identifiers
    Identifier,
    /// `#name`
    PrivateIdentifier,

    // Reserved words
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    EnumKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,
}

impl SyntaxKind {
    pub const FIRST_PUNCTUATION: SyntaxKind = SyntaxKind::OpenBraceToken;
    pub const LAST_PUNCTUATION: SyntaxKind = SyntaxKind::QuestionQuestionEqualsToken;
    pub const FIRST_ASSIGNMENT: SyntaxKind = SyntaxKind::EqualsToken;
    pub const LAST_ASSIGNMENT: SyntaxKind = SyntaxKind::QuestionQuestionEqualsToken;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::WithKeyword;
    pub const FIRST_TEMPLATE_TOKEN: SyntaxKind = SyntaxKind::NoSubstitutionTemplateLiteral;
    pub const LAST_TEMPLATE_TOKEN: SyntaxKind = SyntaxKind::TemplateTail;
}

impl SyntaxKind {
    /// Whether this kind is a reserved word.
    #[inline]
    pub fn is_keyword(self) -> bool {
        let v = self as u16;
        v >= Self::FIRST_KEYWORD as u16 && v <= Self::LAST_KEYWORD as u16
    }

    #[inline]
    pub fn is_punctuation(self) -> bool {
        let v = self as u16;
        v >= Self::FIRST_PUNCTUATION as u16 && v <= Self::LAST_PUNCTUATION as u16
    }

    /// Whether this kind is a template token.
    #[inline]
    pub fn is_template(self) -> bool {
        let v = self as u16;
        v >= Self::FIRST_TEMPLATE_TOKEN as u16 && v <= Self::LAST_TEMPLATE_TOKEN as u16
    }

    /// Whether this kind represents an assignment operator.
    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        let v = self as u16;
        v >= Self::FIRST_ASSIGNMENT as u16 && v <= Self::LAST_ASSIGNMENT as u16
    }

    /// Whether this kind is `&&=`, `||=` or `??=`.
    #[inline]
    pub fn is_logical_assignment(self) -> bool {
        matches!(
            self,
            SyntaxKind::BarBarEqualsToken
                | SyntaxKind::AmpersandAmpersandEqualsToken
                | SyntaxKind::QuestionQuestionEqualsToken
        )
    }

    /// Whether this kind is an identifier or any reserved word. Reserved words
    /// are valid property names and export names.
    #[inline]
    pub fn is_identifier_name(self) -> bool {
        self == SyntaxKind::Identifier || self.is_keyword()
    }

    /// Get the keyword text for a keyword kind, or None if not a keyword.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::CaseKeyword => Some("case"),
            SyntaxKind::CatchKeyword => Some("catch"),
            SyntaxKind::ClassKeyword => Some("class"),
            SyntaxKind::ConstKeyword => Some("const"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::DebuggerKeyword => Some("debugger"),
            SyntaxKind::DefaultKeyword => Some("default"),
            SyntaxKind::DeleteKeyword => Some("delete"),
            SyntaxKind::DoKeyword => Some("do"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::EnumKeyword => Some("enum"),
            SyntaxKind::ExportKeyword => Some("export"),
            SyntaxKind::ExtendsKeyword => Some("extends"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::FinallyKeyword => Some("finally"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::FunctionKeyword => Some("function"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::ImportKeyword => Some("import"),
            SyntaxKind::InKeyword => Some("in"),
            SyntaxKind::InstanceOfKeyword => Some("instanceof"),
            SyntaxKind::NewKeyword => Some("new"),
            SyntaxKind::NullKeyword => Some("null"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::SuperKeyword => Some("super"),
            SyntaxKind::SwitchKeyword => Some("switch"),
            SyntaxKind::ThisKeyword => Some("this"),
            SyntaxKind::ThrowKeyword => Some("throw"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::TryKeyword => Some("try"),
            SyntaxKind::TypeOfKeyword => Some("typeof"),
            SyntaxKind::VarKeyword => Some("var"),
            SyntaxKind::VoidKeyword => Some("void"),
            SyntaxKind::WhileKeyword => Some("while"),
            SyntaxKind::WithKeyword => Some("with"),
            _ => None,
        }
    }

    /// Look up a reserved word from its text.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "break" => Some(SyntaxKind::BreakKeyword),
            "case" => Some(SyntaxKind::CaseKeyword),
            "catch" => Some(SyntaxKind::CatchKeyword),
            "class" => Some(SyntaxKind::ClassKeyword),
            "const" => Some(SyntaxKind::ConstKeyword),
            "continue" => Some(SyntaxKind::ContinueKeyword),
            "debugger" => Some(SyntaxKind::DebuggerKeyword),
            "default" => Some(SyntaxKind::DefaultKeyword),
            "delete" => Some(SyntaxKind::DeleteKeyword),
            "do" => Some(SyntaxKind::DoKeyword),
            "else" => Some(SyntaxKind::ElseKeyword),
            "enum" => Some(SyntaxKind::EnumKeyword),
            "export" => Some(SyntaxKind::ExportKeyword),
            "extends" => Some(SyntaxKind::ExtendsKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            "finally" => Some(SyntaxKind::FinallyKeyword),
            "for" => Some(SyntaxKind::ForKeyword),
            "function" => Some(SyntaxKind::FunctionKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "import" => Some(SyntaxKind::ImportKeyword),
            "in" => Some(SyntaxKind::InKeyword),
            "instanceof" => Some(SyntaxKind::InstanceOfKeyword),
            "new" => Some(SyntaxKind::NewKeyword),
            "null" => Some(SyntaxKind::NullKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "super" => Some(SyntaxKind::SuperKeyword),
            "switch" => Some(SyntaxKind::SwitchKeyword),
            "this" => Some(SyntaxKind::ThisKeyword),
            "throw" => Some(SyntaxKind::ThrowKeyword),
            "true" => Some(SyntaxKind::TrueKeyword),
            "try" => Some(SyntaxKind::TryKeyword),
            "typeof" => Some(SyntaxKind::TypeOfKeyword),
            "var" => Some(SyntaxKind::VarKeyword),
            "void" => Some(SyntaxKind::VoidKeyword),
            "while" => Some(SyntaxKind::WhileKeyword),
            "with" => Some(SyntaxKind::WithKeyword),
            _ => None,
        }
    }

    /// Get the punctuation text for a punctuation kind, or None.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::DotDotDotToken => Some("..."),
            SyntaxKind::SemicolonToken => Some(";"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::QuestionDotToken => Some("?."),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::EqualsEqualsEqualsToken => Some("==="),
            SyntaxKind::ExclamationEqualsEqualsToken => Some("!=="),
            SyntaxKind::EqualsGreaterThanToken => Some("=>"),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::AsteriskAsteriskToken => Some("**"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::PlusPlusToken => Some("++"),
            SyntaxKind::MinusMinusToken => Some("--"),
            SyntaxKind::LessThanLessThanToken => Some("<<"),
            SyntaxKind::GreaterThanGreaterThanToken => Some(">>"),
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken => Some(">>>"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::BarToken => Some("|"),
            SyntaxKind::CaretToken => Some("^"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::QuestionQuestionToken => Some("??"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::PlusEqualsToken => Some("+="),
            SyntaxKind::MinusEqualsToken => Some("-="),
            SyntaxKind::AsteriskEqualsToken => Some("*="),
            SyntaxKind::AsteriskAsteriskEqualsToken => Some("**="),
            SyntaxKind::SlashEqualsToken => Some("/="),
            SyntaxKind::PercentEqualsToken => Some("%="),
            SyntaxKind::LessThanLessThanEqualsToken => Some("<<="),
            SyntaxKind::GreaterThanGreaterThanEqualsToken => Some(">>="),
            SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => Some(">>>="),
            SyntaxKind::AmpersandEqualsToken => Some("&="),
            SyntaxKind::BarEqualsToken => Some("|="),
            SyntaxKind::CaretEqualsToken => Some("^="),
            SyntaxKind::BarBarEqualsToken => Some("||="),
            SyntaxKind::AmpersandAmpersandEqualsToken => Some("&&="),
            SyntaxKind::QuestionQuestionEqualsToken => Some("??="),
            _ => None,
        }
    }

    /// A short human-readable description, used in error messages.
    pub fn describe(self) -> &'static str {
        if let Some(text) = self.keyword_text().or_else(|| self.punctuation_text()) {
            return text;
        }
        match self {
            SyntaxKind::EndOfFileToken => "end of input",
            SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::RegularExpressionLiteral => "regular expression",
            SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateHead
            | SyntaxKind::TemplateMiddle
            | SyntaxKind::TemplateTail => "template",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::PrivateIdentifier => "private name",
            _ => "token",
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_round_trips() {
        let kind = SyntaxKind::from_keyword("instanceof");
        assert_eq!(kind, Some(SyntaxKind::InstanceOfKeyword));
        assert_eq!(SyntaxKind::InstanceOfKeyword.keyword_text(), Some("instanceof"));
        assert!(SyntaxKind::InstanceOfKeyword.is_keyword());
    }

    #[test]
    fn test_contextual_keywords_are_not_reserved() {
        for word in ["let", "static", "yield", "await", "async", "of", "get", "set"] {
            assert_eq!(SyntaxKind::from_keyword(word), None, "{word}");
        }
    }

    #[test]
    fn test_ranges() {
        assert!(SyntaxKind::QuestionQuestionEqualsToken.is_assignment_operator());
        assert!(SyntaxKind::QuestionQuestionEqualsToken.is_logical_assignment());
        assert!(!SyntaxKind::EqualsEqualsToken.is_assignment_operator());
        assert!(SyntaxKind::TemplateMiddle.is_template());
        assert!(!SyntaxKind::Identifier.is_keyword());
        assert!(SyntaxKind::EqualsGreaterThanToken.is_punctuation());
        assert!(!SyntaxKind::Identifier.is_punctuation());
    }
}

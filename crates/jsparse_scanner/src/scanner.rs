//! The scanner.
//!
//! Converts source text into tokens on demand. The scanner is context-free:
//! it never guesses whether `/` starts a regular expression or whether `}`
//! resumes a template. The parser knows the grammar position and calls
//! [`Scanner::rescan_slash_token`] or [`Scanner::rescan_template_continuation`]
//! when an operand is expected.
//!
//! Positions are byte offsets into the UTF-8 source.

use crate::char_codes::*;
use crate::regexp;
use crate::token::TokenInfo;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::TokenFlags;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::{messages, DiagnosticMessage, SyntaxError};
use std::borrow::Cow;

/// An invalid escape inside a template segment. Only an error if the
/// template is untagged.
#[derive(Debug, Clone, Copy)]
pub struct TemplateEscapeError {
    pub range: TextRange,
    pub message: &'static DiagnosticMessage,
}

/// Saved scanner state for lookahead.
#[derive(Debug, Clone)]
pub struct ScannerState {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    value_span: Option<(usize, usize)>,
    token_flags: TokenFlags,
    number_value: f64,
    template_error: Option<TemplateEscapeError>,
    regexp_flags_start: usize,
    first_token: bool,
}

/// The scanner converts source text into tokens.
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    /// Current position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    token: SyntaxKind,
    /// Decoded value when it differs from the source text.
    token_value: String,
    /// Source range of the value when it can be sliced directly.
    value_span: Option<(usize, usize)>,
    token_flags: TokenFlags,
    number_value: f64,
    template_error: Option<TemplateEscapeError>,
    regexp_flags_start: usize,
    /// No token has been scanned yet. `-->` is a comment at input start.
    first_token: bool,
    /// Recognize `<!--` and `-->` comments.
    html_comments: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            value_span: None,
            token_flags: TokenFlags::NONE,
            number_value: 0.0,
            template_error: None,
            regexp_flags_start: 0,
            first_token: true,
            html_comments: false,
        }
    }

    /// Enable HTML-like comments (script code under compatibility mode).
    pub fn set_html_comments(&mut self, enabled: bool) {
        self.html_comments = enabled;
    }

    /// Skip a `#!` line at the very beginning of the input. Call this before
    /// the first `scan()` call. Returns the line text after `#!`.
    pub fn skip_hashbang(&mut self) -> Option<&'a str> {
        if self.pos == 0 && self.bytes.starts_with(b"#!") {
            self.pos = 2;
            self.skip_line_comment();
            Some(&self.source[2..self.pos])
        } else {
            None
        }
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Look ahead: save state, call f, restore state and return the result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Save the full scanner state for lookahead.
    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            value_span: self.value_span,
            token_flags: self.token_flags,
            number_value: self.number_value,
            template_error: self.template_error,
            regexp_flags_start: self.regexp_flags_start,
            first_token: self.first_token,
        }
    }

    /// Restore the full scanner state from a saved state.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.value_span = state.value_span;
        self.token_flags = state.token_flags;
        self.number_value = state.number_value;
        self.template_error = state.template_error;
        self.regexp_flags_start = state.regexp_flags_start;
        self.first_token = state.first_token;
    }

    // ========================================================================
    // Current token
    // ========================================================================

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Start position of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// End position of the current token.
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn token_range(&self) -> TextRange {
        TextRange::new(self.token_start as u32, self.pos as u32)
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    /// Whether the current token was preceded by a line break.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// The raw source text of the current token.
    #[inline]
    pub fn token_text(&self) -> &'a str {
        &self.source[self.token_start..self.pos]
    }

    /// The decoded value of an identifier, private name, string or template.
    pub fn token_value(&self) -> &str {
        match self.value_span {
            Some((start, end)) => &self.source[start..end],
            None => &self.token_value,
        }
    }

    /// The decoded value when it is identical to a slice of the source.
    pub fn source_value(&self) -> Option<&'a str> {
        self.value_span.map(|(start, end)| &self.source[start..end])
    }

    /// The numeric value of a numeric literal token.
    #[inline]
    pub fn number_value(&self) -> f64 {
        self.number_value
    }

    /// Whether the current token is the identifier `name`, spelled without
    /// escapes. Escaped spellings never act as contextual keywords.
    pub fn is_contextual(&self, name: &str) -> bool {
        self.token == SyntaxKind::Identifier
            && !self.token_flags.contains(TokenFlags::UNICODE_ESCAPE)
            && self.token_value() == name
    }

    /// The raw text of a template segment, with `\r\n` and `\r` normalized.
    pub fn template_raw(&self) -> Cow<'a, str> {
        let start = self.token_start + 1;
        let end = match self.token {
            SyntaxKind::TemplateHead | SyntaxKind::TemplateMiddle => self.pos - 2,
            _ => self.pos - 1,
        };
        let raw = &self.source[start..end.max(start)];
        if raw.contains('\r') {
            Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Cow::Borrowed(raw)
        }
    }

    /// The cooked value of a template segment, or `None` if it contains an
    /// invalid escape.
    pub fn template_cooked(&self) -> Option<&str> {
        if self.token_flags.contains(TokenFlags::CONTAINS_INVALID_ESCAPE) {
            None
        } else {
            Some(&self.token_value)
        }
    }

    pub fn template_error(&self) -> Option<TemplateEscapeError> {
        self.template_error
    }

    /// The body and flags of a regular expression literal token.
    pub fn regexp_parts(&self) -> (&'a str, &'a str) {
        let body_end = self.regexp_flags_start.saturating_sub(1).max(self.token_start + 1);
        (
            &self.source[self.token_start + 1..body_end],
            &self.source[self.regexp_flags_start..self.pos],
        )
    }

    /// Get a TokenInfo for the current token.
    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            kind: self.token,
            range: self.token_range(),
            value: self.token_value().to_string(),
            flags: self.token_flags,
        }
    }

    /// Build an error located at `start..end`.
    pub fn error_at(
        &self,
        start: usize,
        end: usize,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> SyntaxError {
        SyntaxError::new(self.source, TextRange::new(start as u32, end as u32), message, args)
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    /// The character at the current position.
    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|s| s.chars().next())
    }

    /// Whether a U+2028 or U+2029 starts at `pos`.
    #[inline]
    fn is_ls_ps_at(&self, pos: usize) -> bool {
        self.byte_at(pos) == Some(LS_PS_LEAD)
            && self.byte_at(pos + 1) == Some(0x80)
            && matches!(self.byte_at(pos + 2), Some(0xA8 | 0xA9))
    }

    fn contains_line_break(&self, start: usize, end: usize) -> bool {
        let slice = &self.bytes[start..end];
        if memchr::memchr2(b'\n', b'\r', slice).is_some() {
            return true;
        }
        memchr::memchr_iter(LS_PS_LEAD, slice).any(|i| self.is_ls_ps_at(start + i))
    }

    /// Advance to the next line terminator (or the end of input).
    fn skip_line_comment(&mut self) {
        let mut from = self.pos;
        while let Some(i) = memchr::memchr3(b'\n', b'\r', LS_PS_LEAD, &self.bytes[from..]) {
            let at = from + i;
            if self.bytes[at] != LS_PS_LEAD || self.is_ls_ps_at(at) {
                self.pos = at;
                return;
            }
            from = at + 1;
        }
        self.pos = self.bytes.len();
    }

    fn skip_block_comment(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let body = start + 2;
        match memchr::memmem::find(&self.bytes[body..], b"*/") {
            Some(offset) => {
                if self.contains_line_break(body, body + offset) {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                }
                self.pos = body + offset + 2;
                Ok(())
            }
            None => Err(self.error_at(
                start,
                self.bytes.len(),
                &messages::UNTERMINATED_COMMENT,
                &[],
            )),
        }
    }

    /// Skip whitespace and comments, setting token_flags for line breaks.
    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        loop {
            let Some(b) = self.byte_at(self.pos) else {
                return Ok(());
            };
            match b {
                b'\n' | b'\r' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'/' => match self.byte_at(self.pos + 1) {
                    Some(b'/') => {
                        self.pos += 2;
                        self.skip_line_comment();
                    }
                    Some(b'*') => self.skip_block_comment()?,
                    _ => return Ok(()),
                },
                b'<' if self.html_comments && self.bytes[self.pos..].starts_with(b"<!--") => {
                    self.token_flags |= TokenFlags::PRECEDING_HTML_COMMENT;
                    self.pos += 4;
                    self.skip_line_comment();
                }
                b'-' if self.html_comments
                    && (self.first_token || self.has_preceding_line_break())
                    && self.bytes[self.pos..].starts_with(b"-->") =>
                {
                    self.token_flags |= TokenFlags::PRECEDING_HTML_COMMENT;
                    self.pos += 3;
                    self.skip_line_comment();
                }
                b if b >= 0x80 => {
                    let Some(ch) = self.peek_char() else {
                        return Ok(());
                    };
                    if ch == LINE_SEPARATOR || ch == PARAGRAPH_SEPARATOR {
                        self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    } else if !is_white_space_single_line(ch) {
                        return Ok(());
                    }
                    self.pos += ch.len_utf8();
                }
                _ => return Ok(()),
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> Result<SyntaxKind, SyntaxError> {
        self.token_flags = TokenFlags::NONE;
        self.token_value.clear();
        self.value_span = None;
        self.template_error = None;

        self.skip_trivia()?;
        self.first_token = false;
        self.token_start = self.pos;

        let Some(b) = self.byte_at(self.pos) else {
            self.token = SyntaxKind::EndOfFileToken;
            return Ok(self.token);
        };

        self.token = match b {
            b'(' => self.punct(1, SyntaxKind::OpenParenToken),
            b')' => self.punct(1, SyntaxKind::CloseParenToken),
            b'{' => self.punct(1, SyntaxKind::OpenBraceToken),
            b'}' => self.punct(1, SyntaxKind::CloseBraceToken),
            b'[' => self.punct(1, SyntaxKind::OpenBracketToken),
            b']' => self.punct(1, SyntaxKind::CloseBracketToken),
            b';' => self.punct(1, SyntaxKind::SemicolonToken),
            b',' => self.punct(1, SyntaxKind::CommaToken),
            b':' => self.punct(1, SyntaxKind::ColonToken),
            b'~' => self.punct(1, SyntaxKind::TildeToken),
            b'.' => self.scan_dot()?,
            b'?' => self.scan_question(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_exclamation(),
            b'+' => self.scan_repeatable(
                b'+',
                SyntaxKind::PlusToken,
                SyntaxKind::PlusPlusToken,
                SyntaxKind::PlusEqualsToken,
            ),
            b'-' => self.scan_repeatable(
                b'-',
                SyntaxKind::MinusToken,
                SyntaxKind::MinusMinusToken,
                SyntaxKind::MinusEqualsToken,
            ),
            b'*' => self.scan_asterisk(),
            b'/' => self.scan_with_equals(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken),
            b'%' => self.scan_with_equals(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            b'^' => self.scan_with_equals(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            b'&' => self.scan_logical(
                b'&',
                SyntaxKind::AmpersandToken,
                SyntaxKind::AmpersandEqualsToken,
                SyntaxKind::AmpersandAmpersandToken,
                SyntaxKind::AmpersandAmpersandEqualsToken,
            ),
            b'|' => self.scan_logical(
                b'|',
                SyntaxKind::BarToken,
                SyntaxKind::BarEqualsToken,
                SyntaxKind::BarBarToken,
                SyntaxKind::BarBarEqualsToken,
            ),
            b'\'' | b'"' => self.scan_string_literal(b)?,
            b'`' => {
                self.pos += 1;
                self.scan_template_segment(true)?
            }
            b'0'..=b'9' => self.scan_number()?,
            b'#' => self.scan_private_identifier()?,
            b'\\' | b'_' | b'$' => self.scan_identifier()?,
            b if b.is_ascii_alphabetic() => self.scan_identifier()?,
            _ => {
                let ch = self.peek_char().unwrap_or('\u{FFFD}');
                if ch as u32 > 0x7F && is_identifier_start(ch) {
                    self.scan_identifier()?
                } else {
                    return Err(self.invalid_character(ch));
                }
            }
        };

        Ok(self.token)
    }

    fn invalid_character(&self, ch: char) -> SyntaxError {
        let text = ch.to_string();
        self.error_at(self.pos, self.pos + ch.len_utf8(), &messages::INVALID_CHARACTER, &[&text])
    }

    // ========================================================================
    // Punctuation
    // ========================================================================

    #[inline]
    fn punct(&mut self, len: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += len;
        kind
    }

    #[inline]
    fn next_is(&self, offset: usize, b: u8) -> bool {
        self.byte_at(self.pos + offset) == Some(b)
    }

    fn scan_dot(&mut self) -> Result<SyntaxKind, SyntaxError> {
        if self.next_is(1, b'.') && self.next_is(2, b'.') {
            Ok(self.punct(3, SyntaxKind::DotDotDotToken))
        } else if self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit()) {
            self.scan_number()
        } else {
            Ok(self.punct(1, SyntaxKind::DotToken))
        }
    }

    fn scan_question(&mut self) -> SyntaxKind {
        if self.next_is(1, b'?') {
            if self.next_is(2, b'=') {
                self.punct(3, SyntaxKind::QuestionQuestionEqualsToken)
            } else {
                self.punct(2, SyntaxKind::QuestionQuestionToken)
            }
        } else if self.next_is(1, b'.')
            && !self.byte_at(self.pos + 2).is_some_and(|b| b.is_ascii_digit())
        {
            self.punct(2, SyntaxKind::QuestionDotToken)
        } else {
            self.punct(1, SyntaxKind::QuestionToken)
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        if self.next_is(1, b'<') {
            if self.next_is(2, b'=') {
                self.punct(3, SyntaxKind::LessThanLessThanEqualsToken)
            } else {
                self.punct(2, SyntaxKind::LessThanLessThanToken)
            }
        } else if self.next_is(1, b'=') {
            self.punct(2, SyntaxKind::LessThanEqualsToken)
        } else {
            self.punct(1, SyntaxKind::LessThanToken)
        }
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        if self.next_is(1, b'>') {
            if self.next_is(2, b'>') {
                if self.next_is(3, b'=') {
                    self.punct(4, SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken)
                } else {
                    self.punct(3, SyntaxKind::GreaterThanGreaterThanGreaterThanToken)
                }
            } else if self.next_is(2, b'=') {
                self.punct(3, SyntaxKind::GreaterThanGreaterThanEqualsToken)
            } else {
                self.punct(2, SyntaxKind::GreaterThanGreaterThanToken)
            }
        } else if self.next_is(1, b'=') {
            self.punct(2, SyntaxKind::GreaterThanEqualsToken)
        } else {
            self.punct(1, SyntaxKind::GreaterThanToken)
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        if self.next_is(1, b'=') {
            if self.next_is(2, b'=') {
                self.punct(3, SyntaxKind::EqualsEqualsEqualsToken)
            } else {
                self.punct(2, SyntaxKind::EqualsEqualsToken)
            }
        } else if self.next_is(1, b'>') {
            self.punct(2, SyntaxKind::EqualsGreaterThanToken)
        } else {
            self.punct(1, SyntaxKind::EqualsToken)
        }
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        if self.next_is(1, b'=') {
            if self.next_is(2, b'=') {
                self.punct(3, SyntaxKind::ExclamationEqualsEqualsToken)
            } else {
                self.punct(2, SyntaxKind::ExclamationEqualsToken)
            }
        } else {
            self.punct(1, SyntaxKind::ExclamationToken)
        }
    }

    fn scan_asterisk(&mut self) -> SyntaxKind {
        if self.next_is(1, b'*') {
            if self.next_is(2, b'=') {
                self.punct(3, SyntaxKind::AsteriskAsteriskEqualsToken)
            } else {
                self.punct(2, SyntaxKind::AsteriskAsteriskToken)
            }
        } else if self.next_is(1, b'=') {
            self.punct(2, SyntaxKind::AsteriskEqualsToken)
        } else {
            self.punct(1, SyntaxKind::AsteriskToken)
        }
    }

    /// `+`, `++`, `+=` and the `-` family.
    fn scan_repeatable(
        &mut self,
        b: u8,
        single: SyntaxKind,
        double: SyntaxKind,
        equals: SyntaxKind,
    ) -> SyntaxKind {
        if self.next_is(1, b) {
            self.punct(2, double)
        } else if self.next_is(1, b'=') {
            self.punct(2, equals)
        } else {
            self.punct(1, single)
        }
    }

    fn scan_with_equals(&mut self, single: SyntaxKind, equals: SyntaxKind) -> SyntaxKind {
        if self.next_is(1, b'=') {
            self.punct(2, equals)
        } else {
            self.punct(1, single)
        }
    }

    /// `&`, `&=`, `&&`, `&&=` and the `|` family.
    fn scan_logical(
        &mut self,
        b: u8,
        single: SyntaxKind,
        single_equals: SyntaxKind,
        double: SyntaxKind,
        double_equals: SyntaxKind,
    ) -> SyntaxKind {
        if self.next_is(1, b) {
            if self.next_is(2, b'=') {
                self.punct(3, double_equals)
            } else {
                self.punct(2, double)
            }
        } else if self.next_is(1, b'=') {
            self.punct(2, single_equals)
        } else {
            self.punct(1, single)
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn scan_identifier(&mut self) -> Result<SyntaxKind, SyntaxError> {
        let start = self.pos;
        let mut escaped: Option<String> = None;
        let mut first = true;

        while let Some(ch) = self.peek_char() {
            if ch == '\\' {
                let escape_start = self.pos;
                if self.byte_at(self.pos + 1) != Some(b'u') {
                    return Err(self.error_at(
                        escape_start,
                        self.pos + 1,
                        &messages::INVALID_IDENTIFIER_ESCAPE,
                        &[],
                    ));
                }
                self.pos += 2;
                let decoded = self
                    .read_unicode_escape()
                    .ok()
                    .and_then(char::from_u32)
                    .filter(|&c| {
                        if first {
                            is_identifier_start(c)
                        } else {
                            is_identifier_part(c)
                        }
                    });
                let Some(c) = decoded else {
                    return Err(self.error_at(
                        escape_start,
                        self.pos,
                        &messages::INVALID_IDENTIFIER_ESCAPE,
                        &[],
                    ));
                };
                escaped
                    .get_or_insert_with(|| self.source[start..escape_start].to_string())
                    .push(c);
            } else if (first && is_identifier_start(ch)) || (!first && is_identifier_part(ch)) {
                if let Some(value) = escaped.as_mut() {
                    value.push(ch);
                }
                self.pos += ch.len_utf8();
            } else {
                break;
            }
            first = false;
        }

        match escaped {
            Some(value) => {
                // An escaped keyword spelling is never the keyword.
                self.token_flags |= TokenFlags::UNICODE_ESCAPE;
                self.token_value = value;
                Ok(SyntaxKind::Identifier)
            }
            None => {
                self.value_span = Some((start, self.pos));
                let text = &self.source[start..self.pos];
                Ok(SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier))
            }
        }
    }

    fn scan_private_identifier(&mut self) -> Result<SyntaxKind, SyntaxError> {
        let hash = self.pos;
        self.pos += 1;
        match self.peek_char() {
            Some(ch) if ch == '\\' || is_identifier_start(ch) => {
                self.scan_identifier()?;
                Ok(SyntaxKind::PrivateIdentifier)
            }
            _ => {
                self.pos = hash;
                Err(self.invalid_character('#'))
            }
        }
    }

    // ========================================================================
    // Escapes
    // ========================================================================

    /// Read the part of a `\u` escape after the `u`: `XXXX` or `{X...}`.
    fn read_unicode_escape(&mut self) -> Result<u32, &'static DiagnosticMessage> {
        if self.byte_at(self.pos) == Some(b'{') {
            self.pos += 1;
            let digits_start = self.pos;
            let mut value: u32 = 0;
            while let Some(d) = self.byte_at(self.pos).and_then(|b| (b as char).to_digit(16)) {
                value = value.saturating_mul(16).saturating_add(d);
                self.pos += 1;
            }
            if self.pos == digits_start || self.byte_at(self.pos) != Some(b'}') {
                return Err(&messages::INVALID_UNICODE_ESCAPE);
            }
            self.pos += 1;
            if value > 0x10FFFF {
                return Err(&messages::UNDEFINED_CODE_POINT);
            }
            Ok(value)
        } else {
            self.read_hex_digits(4).ok_or(&messages::INVALID_UNICODE_ESCAPE)
        }
    }

    /// Read exactly `count` hex digits.
    fn read_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut value = 0;
        for _ in 0..count {
            let d = self.byte_at(self.pos).and_then(|b| (b as char).to_digit(16))?;
            value = value * 16 + d;
            self.pos += 1;
        }
        Some(value)
    }

    /// Decode one escape sequence. `self.pos` is at the backslash.
    ///
    /// In templates every legacy octal form is invalid; in strings it is
    /// decoded and flagged so the parser can reject it in strict code.
    fn scan_escape(
        &mut self,
        out: &mut String,
        in_template: bool,
    ) -> Result<(), (usize, &'static DiagnosticMessage)> {
        let escape_start = self.pos;
        self.pos += 1;
        let Some(ch) = self.peek_char() else {
            return Ok(());
        };
        self.pos += ch.len_utf8();
        match ch {
            '\r' => {
                if self.byte_at(self.pos) == Some(b'\n') {
                    self.pos += 1;
                }
                self.token_flags |= TokenFlags::CONTAINS_ESCAPE;
            }
            '\n' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => {
                self.token_flags |= TokenFlags::CONTAINS_ESCAPE;
            }
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{C}'),
            'v' => out.push('\u{B}'),
            '0' if !self.byte_at(self.pos).is_some_and(|b| b.is_ascii_digit()) => out.push('\0'),
            '0'..='7' => {
                if in_template {
                    return Err((escape_start, &messages::OCTAL_ESCAPE_IN_TEMPLATE));
                }
                let mut value = ch as u32 - '0' as u32;
                let max_len = if ch <= '3' { 3 } else { 2 };
                let mut len = 1;
                while len < max_len {
                    match self.byte_at(self.pos) {
                        Some(b @ b'0'..=b'7') => {
                            value = value * 8 + (b - b'0') as u32;
                            self.pos += 1;
                            len += 1;
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
                self.token_flags |= TokenFlags::OCTAL_ESCAPE;
            }
            '8' | '9' => {
                if in_template {
                    return Err((escape_start, &messages::OCTAL_ESCAPE_IN_TEMPLATE));
                }
                out.push(ch);
                self.token_flags |= TokenFlags::OCTAL_ESCAPE;
            }
            'x' => match self.read_hex_digits(2) {
                Some(value) => out.push(char::from_u32(value).unwrap_or('\u{FFFD}')),
                None => return Err((escape_start, &messages::INVALID_HEX_ESCAPE)),
            },
            'u' => {
                let value = self.read_unicode_escape().map_err(|m| (escape_start, m))?;
                if (0xD800..0xDC00).contains(&value) && self.bytes[self.pos..].starts_with(b"\\u") {
                    let save = self.pos;
                    self.pos += 2;
                    match self.read_unicode_escape() {
                        Ok(low @ 0xDC00..=0xDFFF) => {
                            let combined = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
                            out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                            return Ok(());
                        }
                        _ => self.pos = save,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            _ => out.push(ch),
        }
        Ok(())
    }

    // ========================================================================
    // Strings and templates
    // ========================================================================

    fn scan_string_literal(&mut self, quote: u8) -> Result<SyntaxKind, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        let mut chunk_start = self.pos;
        let mut escaped = false;

        loop {
            let Some(b) = self.byte_at(self.pos) else {
                return Err(self.error_at(
                    start,
                    self.pos,
                    &messages::UNTERMINATED_STRING_LITERAL,
                    &[],
                ));
            };
            match b {
                _ if b == quote => {
                    value.push_str(&self.source[chunk_start..self.pos]);
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    value.push_str(&self.source[chunk_start..self.pos]);
                    if let Err((at, message)) = self.scan_escape(&mut value, false) {
                        return Err(self.error_at(at, self.pos, message, &[]));
                    }
                    escaped = true;
                    chunk_start = self.pos;
                }
                b'\n' | b'\r' => {
                    return Err(self.error_at(
                        start,
                        self.pos,
                        &messages::UNTERMINATED_STRING_LITERAL,
                        &[],
                    ));
                }
                _ => self.pos += 1,
            }
        }

        if escaped {
            self.token_flags |= TokenFlags::CONTAINS_ESCAPE;
            self.token_value = value;
        } else {
            self.value_span = Some((start + 1, self.pos - 1));
        }
        Ok(SyntaxKind::StringLiteral)
    }

    /// Scan a template segment. `self.pos` is just after the opening backtick
    /// or the `}` closing a substitution.
    fn scan_template_segment(&mut self, from_backtick: bool) -> Result<SyntaxKind, SyntaxError> {
        let mut cooked = String::new();
        let mut chunk_start = self.pos;

        let kind = loop {
            let Some(b) = self.byte_at(self.pos) else {
                return Err(self.error_at(
                    self.token_start,
                    self.pos,
                    &messages::UNTERMINATED_TEMPLATE_LITERAL,
                    &[],
                ));
            };
            match b {
                b'`' => {
                    cooked.push_str(&self.source[chunk_start..self.pos]);
                    self.pos += 1;
                    break if from_backtick {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                b'$' if self.next_is(1, b'{') => {
                    cooked.push_str(&self.source[chunk_start..self.pos]);
                    self.pos += 2;
                    break if from_backtick {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                b'\\' => {
                    cooked.push_str(&self.source[chunk_start..self.pos]);
                    if let Err((at, message)) = self.scan_escape(&mut cooked, true) {
                        if self.template_error.is_none() {
                            self.template_error = Some(TemplateEscapeError {
                                range: TextRange::new(at as u32, self.pos as u32),
                                message,
                            });
                        }
                        self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
                    }
                    chunk_start = self.pos;
                }
                b'\r' => {
                    cooked.push_str(&self.source[chunk_start..self.pos]);
                    cooked.push('\n');
                    self.pos += 1;
                    if self.byte_at(self.pos) == Some(b'\n') {
                        self.pos += 1;
                    }
                    chunk_start = self.pos;
                }
                _ => self.pos += 1,
            }
        };

        self.token_value = cooked;
        Ok(kind)
    }

    /// Rescan a `}` as the continuation of a template (called by the parser
    /// after a substitution expression).
    pub fn rescan_template_continuation(&mut self) -> Result<SyntaxKind, SyntaxError> {
        self.pos = self.token_start + 1;
        self.token_flags &= TokenFlags::PRECEDING_LINE_BREAK;
        self.token_value.clear();
        self.value_span = None;
        self.template_error = None;
        self.token = self.scan_template_segment(false)?;
        Ok(self.token)
    }

    // ========================================================================
    // Regular expressions
    // ========================================================================

    /// Rescan the current `/` or `/=` token as a regular expression literal
    /// (called by the parser when an operand is expected).
    pub fn rescan_slash_token(&mut self) -> Result<SyntaxKind, SyntaxError> {
        let start = self.token_start;
        self.pos = start + 1;
        let mut in_class = false;

        loop {
            let ch = match self.peek_char() {
                Some(ch) if !is_line_break(ch) => ch,
                _ => return Err(self.error_at(
                    start,
                    self.pos,
                    &messages::UNTERMINATED_REGEXP_LITERAL,
                    &[],
                )),
            };
            self.pos += ch.len_utf8();
            match ch {
                '\\' => match self.peek_char() {
                    Some(next) if !is_line_break(next) => self.pos += next.len_utf8(),
                    _ => return Err(self.error_at(
                        start,
                        self.pos,
                        &messages::UNTERMINATED_REGEXP_LITERAL,
                        &[],
                    )),
                },
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }

        let body_end = self.pos - 1;
        let flags_start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == '\\' || is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        let flags = &self.source[flags_start..self.pos];
        if !regexp::validate_flags(flags) {
            return Err(self.error_at(
                flags_start,
                self.pos,
                &messages::INVALID_REGEXP_FLAGS,
                &[flags],
            ));
        }
        let body = &self.source[start + 1..body_end];
        if let Err(reason) = regexp::validate_pattern(body, flags) {
            return Err(self.error_at(start, self.pos, &messages::INVALID_REGEXP, &[body, reason]));
        }

        self.regexp_flags_start = flags_start;
        self.token = SyntaxKind::RegularExpressionLiteral;
        Ok(self.token)
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn scan_number(&mut self) -> Result<SyntaxKind, SyntaxError> {
        let start = self.pos;
        let kind = if self.byte_at(start) == Some(b'0') {
            match self.byte_at(start + 1) {
                Some(b'x' | b'X') => self.scan_radix_number(16, TokenFlags::HEX_SPECIFIER)?,
                Some(b'o' | b'O') => self.scan_radix_number(8, TokenFlags::OCTAL_SPECIFIER)?,
                Some(b'b' | b'B') => self.scan_radix_number(2, TokenFlags::BINARY_SPECIFIER)?,
                Some(b'0'..=b'9' | b'_') => self.scan_leading_zero_number()?,
                _ => self.scan_decimal_number(true)?,
            }
        } else {
            self.scan_decimal_number(true)?
        };

        if let Some(ch) = self.peek_char() {
            if ch == '\\' || ch.is_ascii_digit() || is_identifier_start(ch) {
                return Err(self.error_at(
                    start,
                    self.pos + ch.len_utf8(),
                    &messages::IDENTIFIER_AFTER_NUMBER,
                    &[],
                ));
            }
        }
        Ok(kind)
    }

    /// Scan decimal digits with optional `_` separators between them.
    fn scan_decimal_digits(&mut self) -> Result<bool, SyntaxError> {
        let mut any = false;
        loop {
            match self.byte_at(self.pos) {
                Some(b'0'..=b'9') => {
                    self.pos += 1;
                    any = true;
                }
                Some(b'_') => {
                    if !any || !self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit()) {
                        return Err(self.error_at(
                            self.pos,
                            self.pos + 1,
                            &messages::NUMERIC_SEPARATOR_NOT_ALLOWED,
                            &[],
                        ));
                    }
                    self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
                    self.pos += 1;
                }
                _ => return Ok(any),
            }
        }
    }

    fn scan_decimal_number(&mut self, allow_bigint: bool) -> Result<SyntaxKind, SyntaxError> {
        let start = self.token_start;
        let mut is_integer = true;
        self.scan_decimal_digits()?;
        if self.byte_at(self.pos) == Some(b'.') {
            is_integer = false;
            self.pos += 1;
            self.scan_decimal_digits()?;
        }
        if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
            is_integer = false;
            self.token_flags |= TokenFlags::SCIENTIFIC;
            self.pos += 1;
            if matches!(self.byte_at(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.scan_decimal_digits()? {
                return Err(self.error_at(start, self.pos, &messages::DIGIT_EXPECTED, &[]));
            }
        }
        if self.byte_at(self.pos) == Some(b'n') {
            if !is_integer || !allow_bigint {
                return Err(self.error_at(start, self.pos + 1, &messages::INVALID_BIGINT, &[]));
            }
            self.pos += 1;
            return Ok(SyntaxKind::BigIntLiteral);
        }

        let text = &self.source[start..self.pos];
        let parsed = if self.token_flags.contains(TokenFlags::CONTAINS_SEPARATOR) {
            text.replace('_', "").parse::<f64>()
        } else {
            text.parse::<f64>()
        };
        self.number_value =
            parsed.map_err(|_| self.error_at(start, self.pos, &messages::DIGIT_EXPECTED, &[]))?;
        Ok(SyntaxKind::NumericLiteral)
    }

    /// `017` (legacy octal) or `089` (leading-zero decimal).
    fn scan_leading_zero_number(&mut self) -> Result<SyntaxKind, SyntaxError> {
        let start = self.pos;
        let mut octal = true;
        while let Some(b) = self.byte_at(self.pos) {
            match b {
                b'0'..=b'7' => {}
                b'8' | b'9' => octal = false,
                b'_' => return Err(self.error_at(
                    self.pos,
                    self.pos + 1,
                    &messages::NUMERIC_SEPARATOR_NOT_ALLOWED,
                    &[],
                )),
                _ => break,
            }
            self.pos += 1;
        }

        if octal {
            self.token_flags |= TokenFlags::OCTAL;
            self.number_value = self.source[start + 1..self.pos]
                .bytes()
                .fold(0.0, |acc, b| acc * 8.0 + (b - b'0') as f64);
            if self.byte_at(self.pos) == Some(b'n') {
                return Err(self.error_at(start, self.pos + 1, &messages::INVALID_BIGINT, &[]));
            }
            return Ok(SyntaxKind::NumericLiteral);
        }

        self.token_flags |= TokenFlags::NON_OCTAL_DECIMAL;
        self.pos = start;
        self.scan_decimal_number(false)
    }

    fn scan_radix_number(
        &mut self,
        radix: u32,
        flag: TokenFlags,
    ) -> Result<SyntaxKind, SyntaxError> {
        let start = self.pos;
        self.pos += 2;
        self.token_flags |= flag;
        let mut value = 0.0f64;
        let mut any = false;
        loop {
            match self.byte_at(self.pos) {
                Some(b'_') => {
                    let next_is_digit = self
                        .byte_at(self.pos + 1)
                        .and_then(|b| digit_value(b as char, radix))
                        .is_some();
                    if !any || !next_is_digit {
                        return Err(self.error_at(
                            self.pos,
                            self.pos + 1,
                            &messages::NUMERIC_SEPARATOR_NOT_ALLOWED,
                            &[],
                        ));
                    }
                    self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
                    self.pos += 1;
                }
                Some(b) => match digit_value(b as char, radix) {
                    Some(d) => {
                        value = value * radix as f64 + d as f64;
                        any = true;
                        self.pos += 1;
                    }
                    None => break,
                },
                None => break,
            }
        }
        if !any {
            return Err(self.error_at(start, self.pos, &messages::DIGIT_EXPECTED, &[]));
        }
        if self.byte_at(self.pos) == Some(b'n') {
            self.pos += 1;
            return Ok(SyntaxKind::BigIntLiteral);
        }
        self.number_value = value;
        Ok(SyntaxKind::NumericLiteral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let kind = scanner.scan().unwrap();
            if kind == SyntaxKind::EndOfFileToken {
                return out;
            }
            out.push(kind);
        }
    }

    #[test]
    fn test_scan_simple_tokens() {
        assert_eq!(
            kinds("( ) { } [ ] ; , : ~"),
            vec![
                SyntaxKind::OpenParenToken,
                SyntaxKind::CloseParenToken,
                SyntaxKind::OpenBraceToken,
                SyntaxKind::CloseBraceToken,
                SyntaxKind::OpenBracketToken,
                SyntaxKind::CloseBracketToken,
                SyntaxKind::SemicolonToken,
                SyntaxKind::CommaToken,
                SyntaxKind::ColonToken,
                SyntaxKind::TildeToken,
            ]
        );
    }

    #[test]
    fn test_scan_shift_operators() {
        assert_eq!(
            kinds(">> >>> >>= >>>= >="),
            vec![
                SyntaxKind::GreaterThanGreaterThanToken,
                SyntaxKind::GreaterThanGreaterThanGreaterThanToken,
                SyntaxKind::GreaterThanGreaterThanEqualsToken,
                SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken,
                SyntaxKind::GreaterThanEqualsToken,
            ]
        );
    }

    #[test]
    fn test_scan_optional_chaining_before_digit() {
        assert_eq!(
            kinds("a?.5:1"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::QuestionToken,
                SyntaxKind::NumericLiteral,
                SyntaxKind::ColonToken,
                SyntaxKind::NumericLiteral,
            ]
        );
    }

    #[test]
    fn test_escaped_keyword_is_identifier() {
        let mut scanner = Scanner::new("v\\u0061r");
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "var");
        assert!(scanner.token_flags().contains(TokenFlags::UNICODE_ESCAPE));
        assert!(!scanner.is_contextual("var"));
    }

    #[test]
    fn test_number_values() {
        let mut scanner = Scanner::new("0x1F 0b101 0o17 017 1_000 .5e1 089");
        let mut values = Vec::new();
        while scanner.scan().unwrap() != SyntaxKind::EndOfFileToken {
            values.push(scanner.number_value());
        }
        assert_eq!(values, vec![31.0, 5.0, 15.0, 15.0, 1000.0, 5.0, 89.0]);
    }

    #[test]
    fn test_block_comment_line_break() {
        let mut scanner = Scanner::new("a /*\n*/ b /* */ c");
        scanner.scan().unwrap();
        scanner.scan().unwrap();
        assert!(scanner.has_preceding_line_break());
        scanner.scan().unwrap();
        assert!(!scanner.has_preceding_line_break());
    }

    #[test]
    fn test_template_segments() {
        let mut scanner = Scanner::new("`a${b}c\\u{41}`");
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::TemplateHead);
        assert_eq!(scanner.template_cooked(), Some("a"));
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::Identifier);
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.rescan_template_continuation().unwrap(), SyntaxKind::TemplateTail);
        assert_eq!(scanner.template_cooked(), Some("cA"));
        assert_eq!(scanner.template_raw(), "c\\u{41}");
    }

    #[test]
    fn test_template_invalid_escape_is_deferred() {
        let mut scanner = Scanner::new("`\\unicode`");
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::NoSubstitutionTemplateLiteral);
        assert_eq!(scanner.template_cooked(), None);
        assert!(scanner.template_error().is_some());
        assert_eq!(scanner.template_raw(), "\\unicode");
    }

    #[test]
    fn test_hashbang() {
        let mut scanner = Scanner::new("#!/usr/bin/env node\nx");
        assert_eq!(scanner.skip_hashbang(), Some("/usr/bin/env node"));
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::Identifier);
        assert!(scanner.has_preceding_line_break());
    }

    #[test]
    fn test_look_ahead_restores() {
        let mut scanner = Scanner::new("let [a] = b");
        scanner.scan().unwrap();
        let next = scanner.look_ahead(|s| s.scan().ok());
        assert_eq!(next, Some(SyntaxKind::OpenBracketToken));
        assert!(scanner.is_contextual("let"));
    }
}

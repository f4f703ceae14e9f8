//! Scanner integration tests.
//!
//! Verifies tokenization of literals, comments, regular expressions and the
//! error cases the scanner reports on its own.

use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::TokenFlags;
use jsparse_diagnostics::SyntaxErrorKind;
use jsparse_scanner::Scanner;

/// Helper: scan all tokens from source and return as (kind, value) pairs.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan().expect("scan failed");
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

/// Helper: scan until the first error and return its kind.
fn scan_error(source: &str) -> SyntaxErrorKind {
    let mut scanner = Scanner::new(source);
    loop {
        match scanner.scan() {
            Ok(SyntaxKind::EndOfFileToken) => panic!("expected an error for {source:?}"),
            Ok(_) => {}
            Err(err) => return err.kind(),
        }
    }
}

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
}

#[test]
fn test_whitespace_and_comments_only() {
    assert!(scan_all("  \n\t // line\n /* block */ \u{feff}\u{a0}").is_empty());
}

#[test]
fn test_keywords_and_contextual_words() {
    assert_eq!(
        scan_kinds("var let yield async await of"),
        vec![
            SyntaxKind::VarKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_string_values() {
    let tokens = scan_all(r#"'a\nb' "\x41B\u{43}" 'line\
cont' '\u{1F600}' "😀""#);
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["a\nb", "ABC", "linecont", "\u{1F600}", "\u{1F600}"]);
}

#[test]
fn test_lone_surrogate_becomes_replacement_character() {
    let tokens = scan_all(r#""\uD800""#);
    assert_eq!(tokens[0].1, "\u{FFFD}");
}

#[test]
fn test_legacy_octal_escape_is_flagged() {
    let mut scanner = Scanner::new(r#"'\101' '\8'"#);
    scanner.scan().unwrap();
    assert_eq!(scanner.token_value(), "A");
    assert!(scanner.token_flags().contains(TokenFlags::OCTAL_ESCAPE));
    scanner.scan().unwrap();
    assert_eq!(scanner.token_value(), "8");
    assert!(scanner.token_flags().contains(TokenFlags::OCTAL_ESCAPE));
}

#[test]
fn test_legacy_octal_literal_is_flagged() {
    let mut scanner = Scanner::new("010 08 0.5");
    scanner.scan().unwrap();
    assert!(scanner.token_flags().contains(TokenFlags::OCTAL));
    assert_eq!(scanner.number_value(), 8.0);
    scanner.scan().unwrap();
    assert!(scanner.token_flags().contains(TokenFlags::NON_OCTAL_DECIMAL));
    scanner.scan().unwrap();
    assert!(!scanner.token_flags().intersects(TokenFlags::LEGACY_OCTAL));
}

#[test]
fn test_bigint_literals() {
    assert_eq!(
        scan_kinds("1n 0x1Fn 1_000n"),
        vec![SyntaxKind::BigIntLiteral, SyntaxKind::BigIntLiteral, SyntaxKind::BigIntLiteral]
    );
}

#[test]
fn test_number_errors() {
    assert_eq!(scan_error("1_"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(scan_error("1__0"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(scan_error("0_1"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(scan_error("1.5n"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(scan_error("3in x"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(scan_error("0x"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(scan_error("1e+"), SyntaxErrorKind::InvalidNumber);
}

#[test]
fn test_string_errors() {
    assert_eq!(scan_error("'abc"), SyntaxErrorKind::UnterminatedLiteral);
    assert_eq!(scan_error("'a\nb'"), SyntaxErrorKind::UnterminatedLiteral);
    assert_eq!(scan_error(r"'\x4'"), SyntaxErrorKind::InvalidEscape);
    assert_eq!(scan_error(r"'\u{110000}'"), SyntaxErrorKind::InvalidEscape);
    assert_eq!(scan_error("/* open"), SyntaxErrorKind::UnterminatedLiteral);
    assert_eq!(scan_error("a @ b"), SyntaxErrorKind::IllegalCharacter);
}

#[test]
fn test_line_separator_in_string_is_allowed() {
    let tokens = scan_all("'a\u{2028}b'");
    assert_eq!(tokens[0].1, "a\u{2028}b");
}

#[test]
fn test_regexp_rescan() {
    let mut scanner = Scanner::new("/[/]\\//gi.source");
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::SlashToken);
    assert_eq!(scanner.rescan_slash_token().unwrap(), SyntaxKind::RegularExpressionLiteral);
    assert_eq!(scanner.regexp_parts(), ("[/]\\/", "gi"));
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::DotToken);
}

#[test]
fn test_regexp_rescan_from_slash_equals() {
    let mut scanner = Scanner::new("/=x/");
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::SlashEqualsToken);
    assert_eq!(scanner.rescan_slash_token().unwrap(), SyntaxKind::RegularExpressionLiteral);
    assert_eq!(scanner.regexp_parts(), ("=x", ""));
}

#[test]
fn test_regexp_errors() {
    let rescan = |source: &str| {
        let mut scanner = Scanner::new(source);
        scanner.scan().unwrap();
        scanner.rescan_slash_token().map(|_| ()).map_err(|e| e.kind())
    };
    assert_eq!(rescan("/a/gg"), Err(SyntaxErrorKind::InvalidRegExpFlags));
    assert_eq!(rescan("/(/"), Err(SyntaxErrorKind::InvalidRegExp));
    assert_eq!(rescan("/a\n/"), Err(SyntaxErrorKind::UnterminatedLiteral));
    assert_eq!(rescan("/a/u"), Ok(()));
}

#[test]
fn test_html_comments_only_when_enabled() {
    let mut scanner = Scanner::new("x <!-- hidden\n--> also hidden\ny");
    scanner.set_html_comments(true);
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "y");

    assert_eq!(
        scan_kinds("x <!-- y"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::ExclamationToken,
            SyntaxKind::MinusMinusToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_close_html_comment_requires_line_start() {
    let mut scanner = Scanner::new("x --> y");
    scanner.set_html_comments(true);
    scanner.scan().unwrap();
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::MinusMinusToken);
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::GreaterThanToken);
}

#[test]
fn test_private_identifier() {
    let mut scanner = Scanner::new("#x #if");
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::PrivateIdentifier);
    assert_eq!(scanner.token_value(), "x");
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::PrivateIdentifier);
    assert_eq!(scanner.token_value(), "if");
}

#[test]
fn test_unicode_identifiers() {
    let tokens = scan_all("café \\u{63}afe πx");
    assert_eq!(tokens[0], (SyntaxKind::Identifier, "café".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::Identifier, "cafe".to_string()));
    assert_eq!(tokens[2].0, SyntaxKind::Identifier);
}

#[test]
fn test_template_crlf_normalization() {
    let mut scanner = Scanner::new("`a\r\nb\rc`");
    assert_eq!(scanner.scan().unwrap(), SyntaxKind::NoSubstitutionTemplateLiteral);
    assert_eq!(scanner.template_cooked(), Some("a\nb\nc"));
    assert_eq!(scanner.template_raw(), "a\nb\nc");
}

#[test]
fn test_template_octal_escape_is_invalid() {
    let mut scanner = Scanner::new("`\\01`");
    scanner.scan().unwrap();
    assert_eq!(scanner.template_cooked(), None);
    assert!(scanner.token_flags().contains(TokenFlags::CONTAINS_INVALID_ESCAPE));
}

#[test]
fn test_line_break_flags() {
    let mut scanner = Scanner::new("a\u{2028}b // c\nd");
    scanner.scan().unwrap();
    assert!(!scanner.has_preceding_line_break());
    scanner.scan().unwrap();
    assert!(scanner.has_preceding_line_break());
    scanner.scan().unwrap();
    assert!(scanner.has_preceding_line_break());
}

#[test]
fn test_error_position() {
    let mut scanner = Scanner::new("a\n  'open");
    scanner.scan().unwrap();
    let err = scanner.scan().unwrap_err();
    assert_eq!((err.line, err.column), (2, 3));
}

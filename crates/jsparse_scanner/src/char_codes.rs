//! Character classification used by the scanner.

pub const LINE_SEPARATOR: char = '\u{2028}';
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';
pub const ZWNJ: char = '\u{200C}';
pub const ZWJ: char = '\u{200D}';

/// First byte of the UTF-8 encoding of U+2028 and U+2029.
pub const LS_PS_LEAD: u8 = 0xE2;

/// Check if a character is a line terminator.
#[inline]
pub fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR)
}

/// Check if a character is whitespace (not line break).
#[inline]
pub fn is_white_space_single_line(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}' // vertical tab
            | '\u{000C}' // form feed
            | '\u{00A0}' // no-break space
            | '\u{1680}' // ogham space mark
            | '\u{2000}'..='\u{200A}' // various spaces
            | '\u{202F}' // narrow no-break space
            | '\u{205F}' // medium mathematical space
            | '\u{3000}' // ideographic space
            | '\u{FEFF}' // BOM / zero-width no-break space
    )
}

/// Check if a character can start an identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch.is_ascii_alphabetic()
        || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

/// Check if a character can be part of an identifier.
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch.is_ascii_alphanumeric()
        || ch == ZWNJ
        || ch == ZWJ
        || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}

/// The numeric value of a digit in the given radix.
#[inline]
pub fn digit_value(ch: char, radix: u32) -> Option<u32> {
    ch.to_digit(radix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classes() {
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('\u{e9}'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_part('1'));
        assert!(is_identifier_part(ZWJ));
        assert!(!is_identifier_start(ZWJ));
    }

    #[test]
    fn test_whitespace_and_terminators() {
        assert!(is_white_space_single_line('\u{3000}'));
        assert!(!is_white_space_single_line('\n'));
        assert!(is_line_break(PARAGRAPH_SEPARATOR));
    }
}

//! Early validation of regular expression literals.
//!
//! This is not a regex engine. It checks the flag set and the structural
//! errors that make a literal an early error: unbalanced groups, quantifiers
//! with nothing to repeat, malformed groups, duplicate group names, and in
//! unicode mode lone quantifier brackets and unknown identity escapes.

/// Validate the flags of a regular expression literal.
pub fn validate_flags(flags: &str) -> bool {
    let mut seen = 0u16;
    for ch in flags.chars() {
        let bit = match ch {
            'd' => 1 << 0,
            'g' => 1 << 1,
            'i' => 1 << 2,
            'm' => 1 << 3,
            's' => 1 << 4,
            'u' => 1 << 5,
            'y' => 1 << 6,
            'v' => 1 << 7,
            _ => return false,
        };
        if seen & bit != 0 {
            return false;
        }
        seen |= bit;
    }
    // `u` and `v` are mutually exclusive.
    seen & (1 << 5 | 1 << 7) != (1 << 5 | 1 << 7)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    Capturing,
    NonCapturing,
    Lookahead,
    Lookbehind,
}

/// Validate the body of a regular expression literal. Returns the reason on
/// failure.
pub fn validate_pattern(pattern: &str, flags: &str) -> Result<(), &'static str> {
    let unicode = flags.contains('u') || flags.contains('v');
    let chars: Vec<char> = pattern.chars().collect();
    let mut groups: Vec<GroupKind> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut can_quantify = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' => {
                i += 1;
                let Some(&next) = chars.get(i) else {
                    return Err("\\ at end of pattern");
                };
                if unicode && next.is_ascii_alphabetic() && !"dDsSwWbBfnrtvcxukpPq".contains(next) {
                    return Err("Invalid escape");
                }
                can_quantify = !matches!(next, 'b' | 'B');
                i += 1;
            }
            '[' => {
                i += 1;
                while i < chars.len() && chars[i] != ']' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= chars.len() {
                    return Err("Unterminated character class");
                }
                i += 1;
                can_quantify = true;
            }
            '(' => {
                let kind = if chars.get(i + 1) == Some(&'?') {
                    match (chars.get(i + 2), chars.get(i + 3)) {
                        (Some(':'), _) => {
                            i += 3;
                            GroupKind::NonCapturing
                        }
                        (Some('=' | '!'), _) => {
                            i += 3;
                            GroupKind::Lookahead
                        }
                        (Some('<'), Some('=' | '!')) => {
                            i += 4;
                            GroupKind::Lookbehind
                        }
                        (Some('<'), _) => {
                            let start = i + 3;
                            let mut end = start;
                            while end < chars.len() && chars[end] != '>' {
                                end += 1;
                            }
                            if end >= chars.len() || end == start {
                                return Err("Invalid capture group name");
                            }
                            let name: String = chars[start..end].iter().collect();
                            let valid = name.chars().enumerate().all(|(n, c)| {
                                if n == 0 {
                                    crate::char_codes::is_identifier_start(c)
                                } else {
                                    crate::char_codes::is_identifier_part(c)
                                }
                            });
                            if !valid {
                                return Err("Invalid capture group name");
                            }
                            if names.contains(&name) {
                                return Err("Duplicate capture group name");
                            }
                            names.push(name);
                            i = end + 1;
                            GroupKind::Capturing
                        }
                        _ => return Err("Invalid group"),
                    }
                } else {
                    i += 1;
                    GroupKind::Capturing
                };
                groups.push(kind);
                can_quantify = false;
            }
            ')' => {
                let Some(kind) = groups.pop() else {
                    return Err("Unmatched ')'");
                };
                can_quantify = match kind {
                    GroupKind::Lookbehind => false,
                    GroupKind::Lookahead => !unicode,
                    _ => true,
                };
                i += 1;
            }
            '|' | '^' | '$' => {
                can_quantify = false;
                i += 1;
            }
            '*' | '+' | '?' => {
                if !can_quantify {
                    return Err("Nothing to repeat");
                }
                i += 1;
                if chars.get(i) == Some(&'?') {
                    i += 1;
                }
                can_quantify = false;
            }
            '{' => match parse_braced_quantifier(&chars, i) {
                Some((min, max, end)) => {
                    if !can_quantify {
                        return Err("Nothing to repeat");
                    }
                    if max.is_some_and(|max| max < min) {
                        return Err("numbers out of order in {} quantifier");
                    }
                    i = end;
                    if chars.get(i) == Some(&'?') {
                        i += 1;
                    }
                    can_quantify = false;
                }
                None => {
                    if unicode {
                        return Err("Lone quantifier brackets");
                    }
                    can_quantify = true;
                    i += 1;
                }
            },
            '}' | ']' if unicode => return Err("Lone quantifier brackets"),
            _ => {
                can_quantify = true;
                i += 1;
            }
        }
    }

    if !groups.is_empty() {
        return Err("Unterminated group");
    }
    Ok(())
}

/// Parse `{n}`, `{n,}` or `{n,m}` starting at `start`. Returns the bounds and
/// the index just past the closing brace.
fn parse_braced_quantifier(chars: &[char], start: usize) -> Option<(u64, Option<u64>, usize)> {
    let mut i = start + 1;
    let min = parse_decimal(chars, &mut i)?;
    let max = if chars.get(i) == Some(&',') {
        i += 1;
        if chars.get(i) == Some(&'}') {
            None
        } else {
            Some(parse_decimal(chars, &mut i)?)
        }
    } else {
        Some(min)
    };
    if chars.get(i) != Some(&'}') {
        return None;
    }
    Some((min, max, i + 1))
}

fn parse_decimal(chars: &[char], i: &mut usize) -> Option<u64> {
    let start = *i;
    let mut value: u64 = 0;
    while let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d as u64);
        *i += 1;
    }
    (*i > start).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flags() {
        assert!(validate_flags(""));
        assert!(validate_flags("dgimsuy"));
        assert!(validate_flags("gv"));
        assert!(!validate_flags("gg"));
        assert!(!validate_flags("uv"));
        assert!(!validate_flags("x"));
    }

    #[test]
    fn test_valid_patterns() {
        let patterns = [
            "a|b",
            "(?:x)+",
            "(?<year>\\d{4})-(?<m>\\d\\d)",
            "[/]",
            "a{2,3}?",
            "(?=a)*",
            "a{",
        ];
        for pattern in patterns {
            assert_eq!(validate_pattern(pattern, ""), Ok(()), "{pattern}");
        }
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(validate_pattern("*a", ""), Err("Nothing to repeat"));
        assert_eq!(validate_pattern("a**", ""), Err("Nothing to repeat"));
        assert_eq!(validate_pattern("(a", ""), Err("Unterminated group"));
        assert_eq!(validate_pattern("a)", ""), Err("Unmatched ')'"));
        assert_eq!(validate_pattern("a{3,1}", ""), Err("numbers out of order in {} quantifier"));
        assert_eq!(validate_pattern("(?<n>a)(?<n>b)", ""), Err("Duplicate capture group name"));
        assert_eq!(validate_pattern("(?<=a)+", ""), Err("Nothing to repeat"));
    }

    #[test]
    fn test_unicode_mode_is_stricter() {
        assert_eq!(validate_pattern("a{", "u"), Err("Lone quantifier brackets"));
        assert_eq!(validate_pattern("\\a", "u"), Err("Invalid escape"));
        assert_eq!(validate_pattern("\\a", ""), Ok(()));
        assert_eq!(validate_pattern("(?=a)*", "u"), Err("Nothing to repeat"));
    }
}

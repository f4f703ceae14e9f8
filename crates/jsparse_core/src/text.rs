//! Text span and range types for source location tracking.
//!
//! Offsets are byte offsets into the UTF-8 source text. Line and column
//! lookups go through [`LineMap`], which understands every ECMAScript line
//! terminator.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A span in source text, defined by a start position and a length.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextSpan {
    /// The byte offset where this span starts.
    pub start: TextPos,
    /// The length of this span in bytes.
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// Create a span from start and end positions.
    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Convert to a byte range.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// A text range with start and end positions. Every AST node carries one.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize)]
pub struct TextRange {
    /// The byte offset where this range starts (inclusive).
    pub start: TextPos,
    /// The byte offset where this range ends (exclusive).
    pub end: TextPos,
}

impl TextRange {
    #[inline]
    pub fn new(start: TextPos, end: TextPos) -> Self {
        Self { start, end }
    }

    /// Create an empty range at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Return a range covering both this range and the other.
    #[inline]
    pub fn cover(&self, other: TextRange) -> TextRange {
        TextRange::new(self.start.min(other.start), self.end.max(other.end))
    }

    #[inline]
    pub fn to_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.start, self.end)
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end
    }

    /// The slice of `source` this range covers, or `""` if it is out of bounds.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.to_range()).unwrap_or("")
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        range.to_span()
    }
}

impl From<TextSpan> for TextRange {
    fn from(span: TextSpan) -> Self {
        TextRange::new(span.start, span.end())
    }
}

/// Line and column information derived from source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    /// 0-based line number.
    pub line: u32,
    /// 0-based column, counted in characters from the start of the line.
    pub character: u32,
}

/// A map from byte offsets to line numbers, built from source text.
///
/// Recognizes `\n`, `\r`, `\r\n`, U+2028 and U+2029 as line terminators.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut chars = text.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some(&(_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push((i + 2) as u32);
                    } else {
                        line_starts.push((i + 1) as u32);
                    }
                }
                '\n' => line_starts.push((i + 1) as u32),
                '\u{2028}' | '\u{2029}' => line_starts.push((i + ch.len_utf8()) as u32),
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Get the line number (0-based) for a byte offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => line.saturating_sub(1) as u32,
        }
    }

    /// Get the line and column for a byte offset into `text`.
    pub fn line_and_column_of(&self, text: &str, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize] as usize;
        let end = (pos as usize).min(text.len());
        let character = text
            .get(line_start..end)
            .map_or(end.saturating_sub(line_start), |s| s.chars().count()) as u32;
        LineAndColumn { line, character }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_range_cover() {
        let a = TextRange::new(5, 10);
        let b = TextRange::new(2, 7);
        assert_eq!(a.cover(b), TextRange::new(2, 10));
        assert_eq!(a.len(), 5);
        assert!(a.contains(5));
        assert!(!a.contains(10));
    }

    #[test]
    fn test_text_range_slice() {
        let src = "let x = 1;";
        assert_eq!(TextRange::new(4, 5).slice(src), "x");
        assert_eq!(TextRange::new(40, 50).slice(src), "");
    }

    #[test]
    fn test_line_map_terminators() {
        let text = "a\nb\r\nc\rd\u{2028}e";
        let map = LineMap::new(text);
        assert_eq!(map.line_count(), 5);
        assert_eq!(map.line_of(0), 0);
        assert_eq!(map.line_of(2), 1);
        assert_eq!(map.line_of(5), 2);
        assert_eq!(map.line_of(7), 3);
        let e = text.find('e').unwrap() as u32;
        assert_eq!(map.line_of(e), 4);
    }

    #[test]
    fn test_line_and_column_counts_chars() {
        let text = "x\n\u{e9}\u{e9}y";
        let map = LineMap::new(text);
        let y = text.find('y').unwrap() as u32;
        let lc = map.line_and_column_of(text, y);
        assert_eq!(lc.line, 1);
        assert_eq!(lc.character, 2);
    }
}

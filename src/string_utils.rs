//! UTF-8 Safe String and Line Utilities
//!
//! Offsets handed to the engine by the host (caret positions, visible
//! windows) are byte offsets that may land inside a multi-byte character,
//! and every classifier needs to find the line around an offset. These helpers
//! do both without ever scanning more than the lines they are asked about:
//! no whole-document line index is built on the hot path.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::{line_at, lines_in};
//!
//! let text = "# Title\nbody";
//! assert_eq!(line_at(text, 3), 0..7);
//! assert_eq!(lines_in(text, 0..text.len()).count(), 2);
//! ```

use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the largest index `<= index` that lies on a UTF-8 character boundary.
///
/// Indices past the end clamp to `s.len()`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Returns the smallest index `>= index` that lies on a UTF-8 character boundary.
///
/// Indices past the end clamp to `s.len()`.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Byte offset of the start of the line containing `pos`.
#[inline]
pub fn line_start(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset of the end of the line containing `pos` (the position of its
/// `\n`, or the text length for the last line). A trailing `\r` is excluded.
#[inline]
pub fn line_end(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    let end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
    if end > pos && text.as_bytes()[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

/// Content range of the line containing `pos`, without its terminator.
#[inline]
pub fn line_at(text: &str, pos: usize) -> Range<usize> {
    line_start(text, pos)..line_end(text, pos)
}

/// Content range of the line after the one ending at `line.end`, if any.
#[inline]
pub fn next_line(text: &str, line: &Range<usize>) -> Option<Range<usize>> {
    let rest = &text[line.end..];
    let skip = if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') {
        1
    } else {
        return None;
    };
    let start = line.end + skip;
    Some(start..line_end(text, start))
}

/// Iterate the content ranges of every line intersecting `range`
/// (both ends inclusive: a line starting exactly at `range.end` is yielded).
pub fn lines_in(text: &str, range: Range<usize>) -> Lines<'_> {
    let end = range.end.min(text.len());
    let first = if range.start > end {
        None
    } else {
        Some(line_at(text, range.start))
    };
    Lines {
        text,
        next: first,
        end,
    }
}

/// Lazy line iterator returned by [`lines_in`].
pub struct Lines<'a> {
    text: &'a str,
    next: Option<Range<usize>>,
    end: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current.start > self.end {
            return None;
        }
        self.next = next_line(self.text, &current);
        Some(current)
    }
}

/// Trim trailing `\n` / `\r` bytes from the end of `range`.
#[inline]
pub fn trim_line_terminators(text: &str, range: Range<usize>) -> Range<usize> {
    let bytes = text.as_bytes();
    let mut end = range.end.min(text.len());
    while end > range.start && matches!(bytes[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    range.start..end
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Boundary Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_floor_norwegian() {
        let s = "Hei på deg"; // 'å' occupies bytes 5..7
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(floor_char_boundary(s, 7), 7);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_ceil_emoji() {
        let s = "a🎉b"; // emoji occupies bytes 1..5
        assert_eq!(ceil_char_boundary(s, 2), 5);
        assert_eq!(ceil_char_boundary(s, 1), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_line_at() {
        let text = "one\ntwo\nthree";
        assert_eq!(line_at(text, 0), 0..3);
        assert_eq!(line_at(text, 3), 0..3);
        assert_eq!(line_at(text, 4), 4..7);
        assert_eq!(line_at(text, 13), 8..13);
    }

    #[test]
    fn test_line_at_crlf() {
        let text = "one\r\ntwo";
        assert_eq!(line_at(text, 1), 0..3);
        assert_eq!(line_at(text, 5), 5..8);
    }

    #[test]
    fn test_lines_in_partial_range() {
        let text = "a\nbb\nccc\ndddd";
        let lines: Vec<_> = lines_in(text, 3..6).collect();
        assert_eq!(lines, vec![2..4, 5..8]);
    }

    #[test]
    fn test_lines_in_includes_line_starting_at_end() {
        let text = "a\nb";
        let lines: Vec<_> = lines_in(text, 0..2).collect();
        assert_eq!(lines, vec![0..1, 2..3]);
    }

    #[test]
    fn test_lines_in_trailing_empty_line() {
        let text = "a\n";
        let lines: Vec<_> = lines_in(text, 0..2).collect();
        assert_eq!(lines, vec![0..1, 2..2]);
    }

    #[test]
    fn test_lines_in_inverted_range() {
        assert_eq!(lines_in("abc", 2..1).count(), 0);
    }

    #[test]
    fn test_trim_line_terminators() {
        let text = "abc\r\n\n";
        assert_eq!(trim_line_terminators(text, 0..6), 0..3);
        assert_eq!(trim_line_terminators(text, 0..3), 0..3);
    }
}

//! Visible windows
//!
//! The host reports the byte ranges currently on screen. They are snapped
//! outward to whole lines, sorted and merged so every classifier sees
//! line-aligned windows and never decorates a line that is not visible.

use crate::string_utils::{line_end, line_start};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Viewport {
    windows: Vec<Range<usize>>,
}

impl Viewport {
    /// Normalize host-reported ranges against `text`.
    pub fn new<I>(ranges: I, text: &str) -> Self
    where
        I: IntoIterator<Item = Range<usize>>,
    {
        let mut snapped: Vec<Range<usize>> = ranges
            .into_iter()
            .filter(|r| r.start <= r.end && r.start <= text.len())
            .map(|r| line_start(text, r.start)..line_end(text, r.end.min(text.len())))
            .collect();
        snapped.sort_by_key(|r| (r.start, r.end));

        let mut windows: Vec<Range<usize>> = Vec::with_capacity(snapped.len());
        for range in snapped {
            match windows.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => windows.push(range),
            }
        }
        Self { windows }
    }

    /// One window over the whole text.
    pub fn full(text: &str) -> Self {
        Self::new(std::iter::once(0..text.len()), text)
    }

    pub fn windows(&self) -> &[Range<usize>] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Whether `pos` lies inside any window (inclusive).
    pub fn contains(&self, pos: usize) -> bool {
        self.windows
            .iter()
            .any(|w| w.start <= pos && pos <= w.end)
    }
}

/// `max(span.start, window.start)..min(span.end, window.end)`, or `None`
/// when the span does not reach the window.
pub fn clamp(span: Range<usize>, window: &Range<usize>) -> Option<Range<usize>> {
    let start = span.start.max(window.start);
    let end = span.end.min(window.end);
    if start <= end {
        Some(start..end)
    } else {
        None
    }
}

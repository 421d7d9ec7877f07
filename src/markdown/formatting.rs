//! Markdown Formatting Operations
//!
//! Inline style toggles (bold, italic, strikethrough, inline code, underline)
//! over a possibly multi-range selection. Every range is handled on its own
//! and falls into exactly one case:
//!
//! 1. the selected text starts with the open symbol and ends with the close
//!    symbol: unwrap it;
//! 2. the open symbol sits right before the selection and the close symbol
//!    right after: unwrap outward;
//! 3. otherwise: wrap, including empty selections.
//!
//! All edits and the resulting selection form a single [`Transaction`].
//!
//! # Usage
//! ```ignore
//! use crate::markdown::formatting::{toggle_style, StyleCommand};
//!
//! let tx = StyleCommand::Bold.toggle("hello", &Selection::single(0, 5));
//! assert_eq!(tx.apply("hello"), "**hello**");
//! ```

use log::debug;

use crate::decorations::{Selection, SelectionRange};
use crate::editor::{TextChange, Transaction};
use crate::string_utils::{ceil_char_boundary, floor_char_boundary};

// ─────────────────────────────────────────────────────────────────────────────
// Style Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Inline styles that can be toggled on a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleCommand {
    /// Bold text (**text**)
    Bold,
    /// Italic text (*text*)
    Italic,
    /// Strikethrough (~~text~~)
    Strikethrough,
    /// Inline code (`code`)
    InlineCode,
    /// Underline (<u>text</u>)
    Underline,
}

impl StyleCommand {
    /// Opening and closing symbols.
    pub fn symbols(&self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("*", "*"),
            Self::Strikethrough => ("~~", "~~"),
            Self::InlineCode => ("`", "`"),
            Self::Underline => ("<u>", "</u>"),
        }
    }

    /// Toggle this style on every range of `selection`.
    pub fn toggle(&self, text: &str, selection: &Selection) -> Transaction {
        let (open, close) = self.symbols();
        toggle_style(text, selection, open, close)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Toggle
// ─────────────────────────────────────────────────────────────────────────────

/// Which of the three cases applied to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleCase {
    Unwrap,
    UnwrapOutward,
    Wrap,
}

/// Decide the case for `from..to`.
pub fn toggle_case(text: &str, from: usize, to: usize, open: &str, close: &str) -> ToggleCase {
    let selected = &text[from..to];
    if selected.len() >= open.len() + close.len()
        && selected.starts_with(open)
        && selected.ends_with(close)
    {
        return ToggleCase::Unwrap;
    }
    if from >= open.len()
        && text[..from].ends_with(open)
        && text[to..].starts_with(close)
    {
        return ToggleCase::UnwrapOutward;
    }
    ToggleCase::Wrap
}

/// Build the transaction toggling `open`/`close` around every selection
/// range. Ranges are expected not to overlap.
pub fn toggle_style(text: &str, selection: &Selection, open: &str, close: &str) -> Transaction {
    let mut order: Vec<usize> = (0..selection.ranges().len()).collect();
    order.sort_by_key(|i| selection.ranges()[*i].from());

    let mut changes = Vec::new();
    let mut ranges = selection.ranges().to_vec();
    // Net length change of everything before the current range
    let mut delta: isize = 0;

    for idx in order {
        let range = selection.ranges()[idx];
        let from = floor_char_boundary(text, range.from());
        let to = ceil_char_boundary(text, range.to()).max(from);
        let case = toggle_case(text, from, to, open, close);

        let (new_from, new_to) = match case {
            ToggleCase::Unwrap => {
                changes.push(TextChange::delete(from..from + open.len()));
                changes.push(TextChange::delete(to - close.len()..to));
                let start = shift(from, delta);
                let inner = to - from - open.len() - close.len();
                delta -= (open.len() + close.len()) as isize;
                (start, start + inner)
            }
            ToggleCase::UnwrapOutward => {
                changes.push(TextChange::delete(from - open.len()..from));
                changes.push(TextChange::delete(to..to + close.len()));
                let start = shift(from - open.len(), delta);
                delta -= (open.len() + close.len()) as isize;
                (start, start + (to - from))
            }
            ToggleCase::Wrap => {
                changes.push(TextChange::insert(from, open));
                changes.push(TextChange::insert(to, close));
                let start = shift(from, delta) + open.len();
                delta += (open.len() + close.len()) as isize;
                (start, start + (to - from))
            }
        };
        debug!("Style toggle {:?} on {}..{}", case, from, to);
        ranges[idx] = range.with_span(new_from, new_to);
    }

    Transaction::new(changes).with_selection(Selection::new(ranges, selection.main_index()))
}

fn shift(pos: usize, delta: isize) -> usize {
    (pos as isize + delta).max(0) as usize
}

/// Whether `range` is currently wrapped in `open`/`close` in either form.
pub fn is_wrapped(text: &str, range: SelectionRange, open: &str, close: &str) -> bool {
    let from = floor_char_boundary(text, range.from());
    let to = ceil_char_boundary(text, range.to()).max(from);
    toggle_case(text, from, to, open, close) != ToggleCase::Wrap
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

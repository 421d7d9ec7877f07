//! Host editor interface
//!
//! The engine never owns the document. It reads text, selection and visible
//! ranges from an [`EditorHost`] and hands edits back as [`Transaction`]s.
//! [`MemoryHost`] is a plain in-memory host used by tests and simple
//! integrations; [`Shell`] covers the two side effects widgets can ask for
//! (opening a URL and copying text).

use log::debug;
use std::ops::Range;

use crate::decorations::Selection;
use crate::error::{Error, Result};
use crate::string_utils::floor_char_boundary;

// ─────────────────────────────────────────────────────────────────────────────
// Transactions
// ─────────────────────────────────────────────────────────────────────────────

/// Replace `from..to` of the current document with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl TextChange {
    pub fn new(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self::new(pos, pos, text)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, String::new())
    }

    /// Length change caused by this edit.
    pub fn delta(&self) -> isize {
        self.insert.len() as isize - (self.to - self.from) as isize
    }
}

/// One atomic edit: changes expressed against the same document version,
/// plus an optional selection expressed against the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub changes: Vec<TextChange>,
    pub selection: Option<Selection>,
    /// Whether the host should focus the editor afterwards
    pub focus: bool,
}

impl Transaction {
    pub fn new(changes: Vec<TextChange>) -> Self {
        Self {
            changes,
            ..Self::default()
        }
    }

    /// A single replacement.
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self::new(vec![TextChange::new(range.start, range.end, text)])
    }

    /// A selection change without edits.
    pub fn select(selection: Selection) -> Self {
        Self {
            selection: Some(selection),
            ..Self::default()
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_focus(mut self) -> Self {
        self.focus = true;
        self
    }

    /// True when the transaction neither edits nor moves the selection.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.selection.is_none()
    }

    /// Apply the changes to `text`.
    ///
    /// Changes are applied from the end of the document backwards so earlier
    /// offsets stay valid. Changes sharing a start are applied in reverse
    /// list order, so two inserts at one position end up in list order.
    /// Out-of-range offsets are clamped to the text.
    pub fn apply(&self, text: &str) -> String {
        let mut order: Vec<usize> = (0..self.changes.len()).collect();
        order.sort_by(|a, b| {
            let (ca, cb) = (&self.changes[*a], &self.changes[*b]);
            cb.from.cmp(&ca.from).then(b.cmp(a))
        });

        let mut result = text.to_string();
        for idx in order {
            let change = &self.changes[idx];
            let from = floor_char_boundary(&result, change.from);
            let to = floor_char_boundary(&result, change.to.max(change.from));
            result.replace_range(from..to, &change.insert);
        }
        result
    }

    /// Map a position in the old document to the new one. Positions inside a
    /// replaced range move to the end of its insertion.
    pub fn map_pos(&self, pos: usize) -> usize {
        let mut shift: isize = 0;
        let mut inside = None;
        for change in &self.changes {
            if change.to < pos || (change.to == pos && change.from < pos) {
                shift += change.delta();
            } else if change.from < pos {
                inside = Some(change);
            }
        }
        match inside {
            Some(change) => (change.from as isize + shift).max(0) as usize + change.insert.len(),
            None => (pos as isize + shift).max(0) as usize,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host Editor
// ─────────────────────────────────────────────────────────────────────────────

/// What the engine needs from the editor that owns the document.
pub trait EditorHost {
    fn text(&self) -> &str;
    fn selection(&self) -> &Selection;
    /// Byte ranges currently on screen
    fn visible_ranges(&self) -> Vec<Range<usize>>;
    fn apply(&mut self, transaction: Transaction);

    /// Counter that changes whenever the text changes.
    ///
    /// Hosts that return `None` are compared by text instead.
    fn version(&self) -> Option<u64> {
        None
    }
}

/// An in-memory host: a string, a selection and an optional viewport.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    text: String,
    selection: Selection,
    /// `None` means the whole document is visible
    visible: Option<Vec<Range<usize>>>,
    focused: bool,
    version: u64,
}

impl MemoryHost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn set_visible(&mut self, ranges: Vec<Range<usize>>) {
        self.visible = Some(ranges);
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

impl EditorHost for MemoryHost {
    fn text(&self) -> &str {
        &self.text
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn visible_ranges(&self) -> Vec<Range<usize>> {
        match &self.visible {
            Some(ranges) => ranges.clone(),
            None => vec![0..self.text.len()],
        }
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }

    fn apply(&mut self, transaction: Transaction) {
        if !transaction.changes.is_empty() {
            self.text = transaction.apply(&self.text);
            self.version += 1;
        }
        self.selection = match transaction.selection {
            Some(selection) => selection,
            None => self.selection.map(|pos| transaction.map_pos(pos)),
        };
        let len = self.text.len();
        self.selection = self.selection.map(|pos| pos.min(len));
        self.focused |= transaction.focus;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shell
// ─────────────────────────────────────────────────────────────────────────────

/// Side effects requested by widgets.
pub trait Shell {
    fn open_url(&self, url: &str) -> Result<()>;
    fn copy_text(&self, text: &str) -> Result<()>;
}

/// Opens URLs in the system browser and copies to the system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn open_url(&self, url: &str) -> Result<()> {
        debug!("Opening URL: {}", url);
        open::that(url).map_err(|source| Error::OpenUrl {
            url: url.to_string(),
            source,
        })
    }

    fn copy_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }
}

/// Records requests instead of performing them.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingShell {
    pub opened: std::cell::RefCell<Vec<String>>,
    pub copied: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl Shell for RecordingShell {
    fn open_url(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn copy_text(&self, text: &str) -> Result<()> {
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_single_replace() {
        let tx = Transaction::replace(0..5, "howdy");
        assert_eq!(tx.apply("hello world"), "howdy world");
    }

    #[test]
    fn test_apply_changes_in_original_coordinates() {
        let tx = Transaction::new(vec![
            TextChange::insert(0, "**"),
            TextChange::insert(5, "**"),
            TextChange::insert(6, "*"),
            TextChange::insert(11, "*"),
        ]);
        assert_eq!(tx.apply("hello world"), "**hello** *world*");
    }

    #[test]
    fn test_apply_inserts_at_same_position_keep_order() {
        let tx = Transaction::new(vec![TextChange::insert(2, "**"), TextChange::insert(2, "__")]);
        assert_eq!(tx.apply("abcd"), "ab**__cd");
    }

    #[test]
    fn test_apply_clamps_out_of_range() {
        let tx = Transaction::replace(10..20, "!");
        assert_eq!(tx.apply("abc"), "abc!");
    }

    #[test]
    fn test_map_pos() {
        let tx = Transaction::new(vec![TextChange::insert(0, "**"), TextChange::delete(5..7)]);
        assert_eq!(tx.map_pos(0), 0);
        assert_eq!(tx.map_pos(3), 5);
        assert_eq!(tx.map_pos(6), 7);
        assert_eq!(tx.map_pos(9), 9);
    }

    #[test]
    fn test_memory_host_apply_maps_selection() {
        let mut host = MemoryHost::new("hello");
        host.set_selection(Selection::cursor(5));
        host.apply(Transaction::replace(0..0, ">> "));
        assert_eq!(host.text(), ">> hello");
        assert_eq!(host.selection(), &Selection::cursor(8));
        assert!(!host.is_focused());
    }

    #[test]
    fn test_memory_host_explicit_selection_and_focus() {
        let mut host = MemoryHost::new("abc");
        host.apply(Transaction::select(Selection::cursor(2)).with_focus());
        assert_eq!(host.text(), "abc");
        assert_eq!(host.selection(), &Selection::cursor(2));
        assert!(host.is_focused());
    }

    #[test]
    fn test_memory_host_version_counts_text_edits() {
        let mut host = MemoryHost::new("abc");
        assert_eq!(host.version(), Some(0));
        host.apply(Transaction::select(Selection::cursor(1)));
        assert_eq!(host.version(), Some(0));
        host.apply(Transaction::replace(0..1, "x"));
        assert_eq!(host.version(), Some(1));
    }

    #[test]
    fn test_memory_host_visible_ranges() {
        let mut host = MemoryHost::new("abc\ndef");
        assert_eq!(host.visible_ranges(), vec![0..7]);
        host.set_visible(vec![4..7]);
        assert_eq!(host.visible_ranges(), vec![4..7]);
    }

    #[test]
    fn test_recording_shell() {
        let shell = RecordingShell::default();
        shell.open_url("https://example.com").unwrap();
        shell.copy_text("code").unwrap();
        assert_eq!(shell.opened.borrow().as_slice(), ["https://example.com"]);
        assert_eq!(shell.copied.borrow().as_slice(), ["code"]);
    }
}

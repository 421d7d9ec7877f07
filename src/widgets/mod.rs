//! Interactive widgets
//!
//! A `ReplaceWithWidget` annotation names a [`WidgetSpec`]; this module turns
//! specs into live widgets and keeps them across render passes.
//!
//! Widgets are deliberately small state machines. They render into a
//! [`WidgetView`] the host can draw however it likes, and answer
//! [`WidgetEvent`]s with a [`WidgetAction`] for the engine to carry out.
//! A widget never touches the document directly: edits travel back as
//! [`Transaction`]s, which the engine validates against the text the widget
//! was built from.
//!
//! # Modules
//! - `code_copy` - copy button on fenced code blocks
//! - `image_preview` - hover preview for images
//! - `link_url` - collapsed link destination
//! - `modifier` - modifier key tracking
//! - `table` - editable table grid

pub mod code_copy;
pub mod image_preview;
pub mod link_url;
pub mod modifier;
pub mod table;

pub use code_copy::CodeCopyWidget;
pub use image_preview::{image_hover, ImageTooltip};
pub use link_url::LinkUrlWidget;
pub use modifier::{FixedModifier, InputEvent, InputHub, KeyStateObserver, ModifierKeys, ModifierState};
pub use table::{Alignment, TableGrid, TableWidget};

use log::debug;
use std::ops::Range;

use crate::config::Settings;
use crate::decorations::{AnnotationKind, DecorationSet, WidgetSpec};
use crate::editor::Transaction;

// ─────────────────────────────────────────────────────────────────────────────
// Widget Protocol
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identity of a live widget within a [`WidgetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(pub u64);

/// User input delivered to a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Click on the widget; `modified` when the link modifier was held
    Click { modified: bool },
    /// Click on a table cell, addressed by displayed row (0 = header)
    CellClick { row: usize, col: usize, modified: bool },
    /// New content of the open cell editor
    Input(String),
    /// Enter or focus loss
    Commit,
    /// Escape
    Cancel,
}

/// What the engine should do in response to a widget event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetAction {
    /// Apply a transaction to the host document
    Dispatch(Transaction),
    /// Open a URL in the system browser
    OpenUrl(String),
    /// Put text on the clipboard
    CopyText(String),
}

/// One rendered table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub text: String,
    /// `(label, url)` of the first inline link in the cell
    pub link: Option<(String, String)>,
    /// Draft text while this cell is being edited
    pub editing: Option<String>,
}

/// Rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub header: Vec<CellView>,
    pub rows: Vec<Vec<CellView>>,
    pub alignments: Vec<Alignment>,
}

/// What the host draws in place of a widget's range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetView {
    LinkIcon { glyph: String, tooltip: String },
    Table(TableView),
    CopyButton { label: String },
}

/// A live widget.
pub trait Widget: std::fmt::Debug {
    /// The spec this widget was built from
    fn spec(&self) -> &WidgetSpec;

    /// The document range the widget replaces
    fn span(&self) -> Range<usize>;

    /// Text the span must still hold for a write-back to be accepted
    fn expected_text(&self) -> &str;

    fn render(&self) -> WidgetView;

    fn on_event(&mut self, event: WidgetEvent) -> Option<WidgetAction>;
}

/// Build the widget for `spec` over `span`.
pub fn build(spec: &WidgetSpec, span: Range<usize>, settings: &Settings) -> Box<dyn Widget> {
    match spec {
        WidgetSpec::LinkUrl { url } => {
            Box::new(LinkUrlWidget::new(url, span, &settings.link_placeholder))
        }
        WidgetSpec::Table { raw } => Box::new(TableWidget::new(raw, span)),
        WidgetSpec::CodeCopy { language, code } => {
            Box::new(CodeCopyWidget::new(language, code, span))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget Store
// ─────────────────────────────────────────────────────────────────────────────

struct Entry {
    id: WidgetId,
    spec: WidgetSpec,
    span: Range<usize>,
    widget: Box<dyn Widget>,
}

/// Live widgets of the current render pass.
///
/// Widgets are keyed on `(spec, from, to)`. A widget whose key appears again
/// in the next pass is kept with its id and internal state (an open cell
/// editor survives a caret move); every other widget is dropped.
#[derive(Default)]
pub struct WidgetStore {
    entries: Vec<Entry>,
    next_id: u64,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the store in line with the widget annotations of `decorations`.
    pub fn reconcile(&mut self, decorations: &DecorationSet, settings: &Settings) {
        let mut previous = std::mem::take(&mut self.entries);
        let mut reused = 0;

        for annotation in decorations.of_kind(AnnotationKind::ReplaceWithWidget) {
            let Some(spec) = annotation.widget_spec() else {
                continue;
            };
            let span = annotation.span();
            if let Some(idx) = previous
                .iter()
                .position(|e| e.spec == *spec && e.span == span)
            {
                self.entries.push(previous.swap_remove(idx));
                reused += 1;
                continue;
            }
            let id = WidgetId(self.next_id);
            self.next_id += 1;
            self.entries.push(Entry {
                id,
                spec: spec.clone(),
                span: span.clone(),
                widget: build(spec, span, settings),
            });
        }

        if reused != self.entries.len() || !previous.is_empty() {
            debug!(
                "Widgets reconciled: {} kept, {} created, {} dropped",
                reused,
                self.entries.len() - reused,
                previous.len()
            );
        }
    }

    pub fn get(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.widget.as_ref())
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| e.widget.as_mut())
    }

    /// Ids in document order.
    pub fn ids(&self) -> Vec<WidgetId> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by_key(|e| (e.span.start, e.span.end));
        entries.into_iter().map(|e| e.id).collect()
    }

    /// Id of the widget covering exactly `span`.
    pub fn id_at(&self, span: Range<usize>) -> Option<WidgetId> {
        self.entries.iter().find(|e| e.span == span).map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for WidgetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetStore")
            .field("widgets", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

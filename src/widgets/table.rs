//! Table widget
//!
//! Renders a pipe table as a grid and lets the user edit a single cell in
//! place. A committed edit regenerates the whole table as `| a | b |` lines
//! and replaces exactly the span the widget was built over, so the raw text
//! stays the source of truth.
//!
//! Separator rows (`| --- | :-: |`) are not shown but are kept and written
//! back with their markers. Column padding is not preserved.

use log::debug;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use super::{CellView, TableView, Widget, WidgetAction, WidgetEvent, WidgetView};
use crate::decorations::WidgetSpec;
use crate::editor::Transaction;

// ─────────────────────────────────────────────────────────────────────────────
// Table Grid
// ─────────────────────────────────────────────────────────────────────────────

/// Column alignment read from a separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_marker(marker: &str) -> Self {
        match (marker.starts_with(':'), marker.ends_with(':') && marker.len() > 1) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        }
    }

    fn css(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// One source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub cells: Vec<String>,
    /// `---` / `:-:` separator row
    pub separator: bool,
}

/// Cells of a pipe table, trimmed, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableGrid {
    rows: Vec<GridRow>,
}

impl TableGrid {
    /// Parse the raw table text. Blank lines are skipped.
    pub fn parse(raw: &str) -> Self {
        let rows = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let cells = split_cells(line);
                let separator = !cells.is_empty() && cells.iter().all(|c| is_separator_cell(c));
                GridRow { cells, separator }
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Rows that are displayed: everything except separators. Row 0 is the
    /// header.
    pub fn visible_rows(&self) -> impl Iterator<Item = &GridRow> {
        self.rows.iter().filter(|r| !r.separator)
    }

    pub fn visible_row_count(&self) -> usize {
        self.visible_rows().count()
    }

    /// Widest row, separators included.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Cell at a visible row and column.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.visible_rows()
            .nth(row)
            .and_then(|r| r.cells.get(col))
            .map(String::as_str)
    }

    /// Set a cell at a visible row. Short rows are padded with empty cells.
    /// Returns `false` when the row does not exist.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> bool {
        let Some(index) = self.source_index(row) else {
            return false;
        };
        let cells = &mut self.rows[index].cells;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.trim().to_string();
        true
    }

    fn source_index(&self, visible: usize) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.separator)
            .nth(visible)
            .map(|(i, _)| i)
    }

    /// Alignment of each column, from the first separator row.
    pub fn alignments(&self) -> Vec<Alignment> {
        let mut alignments = vec![Alignment::None; self.column_count()];
        if let Some(separator) = self.rows.iter().find(|r| r.separator) {
            for (slot, marker) in alignments.iter_mut().zip(&separator.cells) {
                *slot = Alignment::from_marker(marker);
            }
        }
        alignments
    }

    /// Regenerate the table as Markdown, one `| c1 | c2 |` line per row,
    /// without a trailing newline.
    pub fn to_markdown(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("| {} |", row.cells.join(" | ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the table as HTML.
    pub fn to_html(&self) -> String {
        let alignments = self.alignments();
        let columns = self.column_count();
        let mut html = String::from("<table>\n");

        for (i, row) in self.visible_rows().enumerate() {
            let tag = if i == 0 { "th" } else { "td" };
            if i == 0 {
                html.push_str("<thead>\n");
            } else if i == 1 {
                html.push_str("<tbody>\n");
            }
            html.push_str("<tr>");
            for col in 0..columns {
                let cell = row.cells.get(col).map(String::as_str).unwrap_or("");
                match alignments.get(col).and_then(Alignment::css) {
                    Some(align) => html.push_str(&format!("<{} style=\"text-align: {}\">", tag, align)),
                    None => html.push_str(&format!("<{}>", tag)),
                }
                html.push_str(&cell_html(cell));
                html.push_str(&format!("</{}>", tag));
            }
            html.push_str("</tr>\n");
            if i == 0 {
                html.push_str("</thead>\n");
            }
        }
        if self.visible_row_count() > 1 {
            html.push_str("</tbody>\n");
        }
        html.push_str("</table>");
        html
    }
}

/// Split a row on unescaped `|`, dropping the empty cells produced by the
/// leading and trailing fence pipes.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in line.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                escaped = true;
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);

    if line.starts_with('|') && cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if ends_with_fence(line) && cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

fn ends_with_fence(line: &str) -> bool {
    let Some(body) = line.strip_suffix('|') else {
        return false;
    };
    let backslashes = body.chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 0
}

fn is_separator_cell(cell: &str) -> bool {
    cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':')
}

/// Escape bare `|` so a typed value stays in its cell.
fn escape_pipes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for ch in value.chars() {
        if ch == '|' && !escaped {
            out.push('\\');
        }
        escaped = ch == '\\' && !escaped;
        out.push(ch);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Cell Links
// ─────────────────────────────────────────────────────────────────────────────

fn link_regex() -> Option<&'static Regex> {
    static LINK: OnceLock<Option<Regex>> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(\s*<?([^)\s>]*)>?(?:\s+[^)]*)?\)").ok())
        .as_ref()
}

/// First `[label](url)` in a cell.
pub fn cell_link(cell: &str) -> Option<(String, String)> {
    let captures = link_regex()?.captures(cell)?;
    let label = captures.get(1)?.as_str().to_string();
    let url = captures.get(2)?.as_str().to_string();
    (!url.is_empty()).then_some((label, url))
}

fn display_text(cell: &str) -> String {
    cell.replace("\\|", "|")
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn cell_html(cell: &str) -> String {
    let Some(found) = link_regex().and_then(|re| re.find(cell)) else {
        return html_escape(&display_text(cell));
    };
    let Some((label, url)) = cell_link(cell) else {
        return html_escape(&display_text(cell));
    };
    format!(
        "{}<a href=\"{}\">{}</a>{}",
        html_escape(&display_text(&cell[..found.start()])),
        html_escape(&url),
        html_escape(&label),
        html_escape(&display_text(&cell[found.end()..]))
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Table Widget
// ─────────────────────────────────────────────────────────────────────────────

/// The single-line input over one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditor {
    pub row: usize,
    pub col: usize,
    pub original: String,
    pub draft: String,
}

/// Table replacement widget.
#[derive(Debug, Clone)]
pub struct TableWidget {
    spec: WidgetSpec,
    raw: String,
    span: Range<usize>,
    grid: TableGrid,
    editor: Option<CellEditor>,
}

impl TableWidget {
    pub fn new(raw: &str, span: Range<usize>) -> Self {
        Self {
            spec: WidgetSpec::Table {
                raw: raw.to_string(),
            },
            raw: raw.to_string(),
            span,
            grid: TableGrid::parse(raw),
            editor: None,
        }
    }

    pub fn grid(&self) -> &TableGrid {
        &self.grid
    }

    pub fn editor(&self) -> Option<&CellEditor> {
        self.editor.as_ref()
    }

    fn open_editor(&mut self, row: usize, col: usize) {
        let value = self.grid.cell(row, col).unwrap_or("").to_string();
        debug!("Editing table cell {},{}", row, col);
        self.editor = Some(CellEditor {
            row,
            col,
            original: value.clone(),
            draft: value,
        });
    }

    fn commit(&mut self) -> Option<WidgetAction> {
        let editor = self.editor.take()?;
        let value = escape_pipes(editor.draft.replace(|c| c == '\n' || c == '\r', " ").trim());
        if value == editor.original {
            return None;
        }
        let mut grid = self.grid.clone();
        if !grid.set_cell(editor.row, editor.col, &value) {
            return None;
        }
        let markdown = grid.to_markdown();
        Some(WidgetAction::Dispatch(Transaction::replace(
            self.span.clone(),
            markdown,
        )))
    }

    fn cell_view(&self, row: usize, col: usize, cell: &str) -> CellView {
        let editing = self
            .editor
            .as_ref()
            .filter(|e| e.row == row && e.col == col)
            .map(|e| e.draft.clone());
        CellView {
            text: display_text(cell),
            link: cell_link(cell),
            editing,
        }
    }
}

impl Widget for TableWidget {
    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    fn expected_text(&self) -> &str {
        &self.raw
    }

    fn render(&self) -> WidgetView {
        let columns = self.grid.column_count();
        let mut rows: Vec<Vec<CellView>> = self
            .grid
            .visible_rows()
            .enumerate()
            .map(|(r, row)| {
                (0..columns)
                    .map(|c| self.cell_view(r, c, row.cells.get(c).map(String::as_str).unwrap_or("")))
                    .collect()
            })
            .collect();
        let header = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };
        WidgetView::Table(TableView {
            header,
            rows,
            alignments: self.grid.alignments(),
        })
    }

    fn on_event(&mut self, event: WidgetEvent) -> Option<WidgetAction> {
        match event {
            WidgetEvent::CellClick { row, col, modified } => {
                if modified {
                    if let Some((_, url)) = self.grid.cell(row, col).and_then(cell_link) {
                        return Some(WidgetAction::OpenUrl(url));
                    }
                }
                // Header cells are not editable in place
                if row == 0 || row >= self.grid.visible_row_count() {
                    return None;
                }
                if self.editor.is_some() {
                    if let Some(action) = self.commit() {
                        return Some(action);
                    }
                }
                self.open_editor(row, col);
                None
            }
            WidgetEvent::Input(value) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.draft = value;
                }
                None
            }
            WidgetEvent::Commit => self.commit(),
            WidgetEvent::Cancel => {
                self.editor = None;
                None
            }
            WidgetEvent::Click { .. } => None,
        }
    }
}

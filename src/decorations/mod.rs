//! Decoration annotations
//!
//! This module defines what the engine hands to the host editor: a sorted,
//! duplicate-free list of [`Annotation`]s. Each annotation covers a byte
//! range of the document and says how to render it (line style, inline mark
//! style, hidden, or replaced by an interactive widget).
//!
//! # Modules
//! - `classify` - one classifier per Markdown construct
//! - `dedup` - canonical ordering and duplicate removal
//! - `selection` - caret/selection model read by the classifiers
//! - `viewport` - visible windows and range clamping

pub mod classify;
pub mod dedup;
pub mod selection;
pub mod viewport;

pub use dedup::dedup;
pub use selection::{Selection, SelectionRange};
pub use viewport::Viewport;

use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Annotation Types
// ─────────────────────────────────────────────────────────────────────────────

/// How an annotation affects its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    /// Style for the whole line; zero-width at the line start
    LineStyle,
    /// Inline style over `from..to`
    MarkStyle,
    /// `from..to` is not displayed
    Hidden,
    /// `from..to` is displayed as an interactive widget
    ReplaceWithWidget,
}

/// Style classes understood by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleClass {
    /// Heading line, levels 1-6
    Heading(u8),
    /// Visible `#` run while the caret is in the heading
    HeadingMark,
    /// Visible delimiter while the caret is in its construct
    ActiveMark,
    /// Blockquote line with a left border
    Blockquote,
    /// Faded `>` marker
    QuoteMark,
    /// Interior line of a fenced code block or front matter block
    CodeBlock,
    Emphasis,
    Strong,
    Strikethrough,
    Underline,
    InlineCode,
    /// Backticks of inline code (never hidden)
    CodeMark,
    Link,
}

impl StyleClass {
    /// CSS-like class name, for hosts that style by name.
    pub fn class_name(&self) -> String {
        match self {
            StyleClass::Heading(level) => format!("live-heading-{}", level),
            StyleClass::HeadingMark => "live-heading-mark".to_string(),
            StyleClass::ActiveMark => "live-active-mark".to_string(),
            StyleClass::Blockquote => "live-blockquote".to_string(),
            StyleClass::QuoteMark => "live-quote-mark".to_string(),
            StyleClass::CodeBlock => "live-code-block".to_string(),
            StyleClass::Emphasis => "live-emphasis".to_string(),
            StyleClass::Strong => "live-strong".to_string(),
            StyleClass::Strikethrough => "live-strikethrough".to_string(),
            StyleClass::Underline => "live-underline".to_string(),
            StyleClass::InlineCode => "live-inline-code".to_string(),
            StyleClass::CodeMark => "live-code-mark".to_string(),
            StyleClass::Link => "live-link".to_string(),
        }
    }
}

/// Syntax highlighting style of a code token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenStyle {
    /// Foreground as RGBA
    pub color: [u8; 4],
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Which widget replaces a range.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidgetSpec {
    /// Collapsed destination of an inline link
    LinkUrl { url: String },
    /// Rendered table; `raw` is the exact source text it replaces
    Table { raw: String },
    /// Copy button at the end of a fenced code block's opening line
    CodeCopy { language: String, code: String },
}

/// Rendering payload of an annotation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Payload {
    None,
    Style(StyleClass),
    Token(TokenStyle),
    Widget(WidgetSpec),
}

/// A single decoration over `from..to`.
///
/// The derived ordering is the canonical order of a [`DecorationSet`]:
/// `(from, to)` first, then kind and payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Annotation {
    pub from: usize,
    pub to: usize,
    pub kind: AnnotationKind,
    pub payload: Payload,
}

impl Annotation {
    /// Line style anchored at `line_start`.
    pub fn line(line_start: usize, class: StyleClass) -> Self {
        Self {
            from: line_start,
            to: line_start,
            kind: AnnotationKind::LineStyle,
            payload: Payload::Style(class),
        }
    }

    pub fn mark(range: Range<usize>, class: StyleClass) -> Self {
        Self {
            from: range.start,
            to: range.end,
            kind: AnnotationKind::MarkStyle,
            payload: Payload::Style(class),
        }
    }

    pub fn token(range: Range<usize>, style: TokenStyle) -> Self {
        Self {
            from: range.start,
            to: range.end,
            kind: AnnotationKind::MarkStyle,
            payload: Payload::Token(style),
        }
    }

    pub fn hidden(range: Range<usize>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            kind: AnnotationKind::Hidden,
            payload: Payload::None,
        }
    }

    pub fn widget(range: Range<usize>, spec: WidgetSpec) -> Self {
        Self {
            from: range.start,
            to: range.end,
            kind: AnnotationKind::ReplaceWithWidget,
            payload: Payload::Widget(spec),
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.from..self.to
    }

    pub fn style(&self) -> Option<StyleClass> {
        match self.payload {
            Payload::Style(class) => Some(class),
            _ => None,
        }
    }

    pub fn widget_spec(&self) -> Option<&WidgetSpec> {
        match &self.payload {
            Payload::Widget(spec) => Some(spec),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoration Set
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical, sorted and duplicate-free annotations for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    annotations: Vec<Annotation>,
}

impl DecorationSet {
    /// Build a set from annotations in any order, dropping duplicates.
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations: dedup(annotations),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Annotations of one kind, in canonical order.
    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.kind == kind)
    }

    /// Line style classes anchored at `line_start`.
    pub fn line_styles_at(&self, line_start: usize) -> Vec<StyleClass> {
        let first = self.annotations.partition_point(|a| a.from < line_start);
        self.annotations[first..]
            .iter()
            .take_while(|a| a.from == line_start)
            .filter(|a| a.kind == AnnotationKind::LineStyle)
            .filter_map(|a| a.style())
            .collect()
    }

    /// Whether `pos..pos + 1` falls inside a hidden range.
    pub fn is_hidden(&self, pos: usize) -> bool {
        self.of_kind(AnnotationKind::Hidden)
            .any(|a| a.from <= pos && pos < a.to)
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}

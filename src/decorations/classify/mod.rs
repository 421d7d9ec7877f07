//! Syntax classifiers
//!
//! One classifier per Markdown construct turns a syntax node into
//! annotations. Classifiers only see nodes that intersect a visible window
//! and never emit line styles outside it.
//!
//! Classifiers run in two passes. The static pass does not depend on the
//! caret and can be cached per document version and viewport; the cursor pass
//! implements the "reveal markup while the caret is inside" policy and is
//! recomputed on every selection change.

mod blockquote;
mod code_block;
mod emphasis;
mod front_matter;
mod heading;
mod inline_code;
mod link;
mod table;
mod underline;

use std::ops::Range;

use crate::config::Settings;
use crate::decorations::{Annotation, DecorationSet, Selection, Viewport};
use crate::markdown::{NodeKind, SyntaxNode, SyntaxTree};

/// Everything a classifier reads.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub text: &'a str,
    pub tree: &'a SyntaxTree,
    pub selection: &'a Selection,
    pub settings: &'a Settings,
    /// Resolved dark mode, used for code highlighting themes
    pub dark_mode: bool,
}

/// Classifier pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Output does not depend on the selection
    Static,
    /// Output depends on where the caret is
    Cursor,
}

/// The pass that handles a node kind, if any.
pub fn pass_for(kind: &NodeKind) -> Option<Pass> {
    match kind {
        NodeKind::FencedCode { .. }
        | NodeKind::FrontMatterBlock
        | NodeKind::Blockquote
        | NodeKind::QuoteMark
        | NodeKind::InlineCode => Some(Pass::Static),

        NodeKind::AtxHeading(_)
        | NodeKind::SetextHeading(_)
        | NodeKind::StrongEmphasis
        | NodeKind::Emphasis
        | NodeKind::Strikethrough
        | NodeKind::InlineHtml
        | NodeKind::Link
        | NodeKind::Table => Some(Pass::Cursor),

        // Images only get a hover preview; delimiters are handled by their
        // parent construct.
        NodeKind::Image
        | NodeKind::Document
        | NodeKind::Paragraph
        | NodeKind::IndentedCode
        | NodeKind::HeaderMark
        | NodeKind::EmphasisMark
        | NodeKind::StrikethroughMark
        | NodeKind::CodeMark
        | NodeKind::LinkMark
        | NodeKind::Url
        | NodeKind::TableRow
        | NodeKind::TableCell
        | NodeKind::List
        | NodeKind::ListItem
        | NodeKind::HtmlBlock
        | NodeKind::Other => None,
    }
}

/// Run one pass over every visible window.
pub fn classify(ctx: &ClassifyContext<'_>, viewport: &Viewport, pass: Pass) -> Vec<Annotation> {
    let mut out = Vec::new();
    for window in viewport.windows() {
        for node in ctx.tree.nodes_in(window.clone()) {
            if pass_for(&node.kind) == Some(pass) {
                dispatch(ctx, node, window, &mut out);
            }
        }
    }
    out
}

/// Both passes, deduplicated.
pub fn classify_all(ctx: &ClassifyContext<'_>, viewport: &Viewport) -> DecorationSet {
    let mut annotations = classify(ctx, viewport, Pass::Static);
    annotations.extend(classify(ctx, viewport, Pass::Cursor));
    DecorationSet::new(annotations)
}

fn dispatch(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    match &node.kind {
        NodeKind::FencedCode { info } => code_block::classify(ctx, node, info, window, out),
        NodeKind::FrontMatterBlock => front_matter::classify(ctx, node, window, out),
        NodeKind::Blockquote => blockquote::classify_lines(ctx, node, window, out),
        NodeKind::QuoteMark => blockquote::classify_mark(node, window, out),
        NodeKind::InlineCode => inline_code::classify(node, window, out),
        NodeKind::AtxHeading(_) => heading::classify_atx(ctx, node, window, out),
        NodeKind::SetextHeading(level) => heading::classify_setext(ctx, node, *level, window, out),
        NodeKind::StrongEmphasis | NodeKind::Emphasis | NodeKind::Strikethrough => {
            emphasis::classify(ctx, node, window, out)
        }
        NodeKind::InlineHtml => underline::classify(ctx, node, window, out),
        NodeKind::Link => link::classify(ctx, node, window, out),
        NodeKind::Table => table::classify(ctx, node, out),
        _ => {}
    }
}

/// Push `annotation` for the part of `span` inside `window`.
fn push_clamped<F>(span: Range<usize>, window: &Range<usize>, out: &mut Vec<Annotation>, build: F)
where
    F: FnOnce(Range<usize>) -> Annotation,
{
    if let Some(range) = super::viewport::clamp(span, window) {
        if range.start < range.end {
            out.push(build(range));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

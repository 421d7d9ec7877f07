use std::ops::Range;

use super::{push_clamped, ClassifyContext};
use crate::decorations::{Annotation, StyleClass};
use crate::markdown::{NodeKind, SyntaxNode};

/// Emphasis, strong emphasis and strikethrough: style the full span, then
/// show or hide the delimiters depending on the caret.
pub(super) fn classify(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let (class, mark_kind) = match node.kind {
        NodeKind::Emphasis => (StyleClass::Emphasis, NodeKind::EmphasisMark),
        NodeKind::StrongEmphasis => (StyleClass::Strong, NodeKind::EmphasisMark),
        NodeKind::Strikethrough => (StyleClass::Strikethrough, NodeKind::StrikethroughMark),
        _ => return,
    };
    push_clamped(node.span(), window, out, |r| Annotation::mark(r, class));

    let active = ctx.selection.touches(node.start, node.end);
    for mark in node.children_of(&mark_kind) {
        if active {
            push_clamped(mark.span(), window, out, |r| {
                Annotation::mark(r, StyleClass::ActiveMark)
            });
        } else {
            push_clamped(mark.span(), window, out, Annotation::hidden);
        }
    }
}

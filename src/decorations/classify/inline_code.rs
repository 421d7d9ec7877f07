use std::ops::Range;

use super::push_clamped;
use crate::decorations::{Annotation, StyleClass};
use crate::markdown::{NodeKind, SyntaxNode};

/// Code spans keep their backticks visible regardless of the caret.
pub(super) fn classify(node: &SyntaxNode, window: &Range<usize>, out: &mut Vec<Annotation>) {
    push_clamped(node.span(), window, out, |r| {
        Annotation::mark(r, StyleClass::InlineCode)
    });
    for mark in node.children_of(&NodeKind::CodeMark) {
        push_clamped(mark.span(), window, out, |r| {
            Annotation::mark(r, StyleClass::CodeMark)
        });
    }
}

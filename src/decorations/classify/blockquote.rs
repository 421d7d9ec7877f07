use std::ops::Range;

use super::{push_clamped, ClassifyContext};
use crate::decorations::viewport::clamp;
use crate::decorations::{Annotation, StyleClass};
use crate::markdown::SyntaxNode;
use crate::string_utils::lines_in;

/// Left border on every covered line. Nested quotes emit the same line
/// styles again and are collapsed by dedup.
pub(super) fn classify_lines(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let Some(visible) = clamp(node.span(), window) else {
        return;
    };
    for line in lines_in(ctx.text, visible) {
        if line.start >= window.start {
            out.push(Annotation::line(line.start, StyleClass::Blockquote));
        }
    }
}

/// `>` markers are faded, never hidden.
pub(super) fn classify_mark(node: &SyntaxNode, window: &Range<usize>, out: &mut Vec<Annotation>) {
    push_clamped(node.span(), window, out, |r| {
        Annotation::mark(r, StyleClass::QuoteMark)
    });
}

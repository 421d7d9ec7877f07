//! Front matter block: interior lines styled like a code block.

use std::ops::Range;

use super::code_block::style_interior;
use super::ClassifyContext;
use crate::decorations::Annotation;
use crate::markdown::SyntaxNode;
use crate::string_utils::line_at;

pub(super) fn classify(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let open = line_at(ctx.text, node.start);
    let close = line_at(ctx.text, node.end);
    if close.start <= open.start {
        return;
    }
    style_interior(ctx.text, &open, close.start, window, out);
}

use std::ops::Range;

use super::{push_clamped, ClassifyContext};
use crate::decorations::{Annotation, StyleClass, WidgetSpec};
use crate::markdown::{NodeKind, SyntaxNode};

/// Inline links: style the span, and collapse a single-line destination into
/// the link widget while the caret is elsewhere.
pub(super) fn classify(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    push_clamped(node.span(), window, out, |r| {
        Annotation::mark(r, StyleClass::Link)
    });

    if ctx.selection.touches(node.start, node.end) {
        return;
    }
    let Some(url) = node.child(&NodeKind::Url) else {
        return;
    };
    let raw = &ctx.text[url.span()];
    if raw.is_empty() || raw.contains('\n') {
        return;
    }
    if url.start < window.start || url.end > window.end {
        return;
    }
    out.push(Annotation::widget(
        url.span(),
        WidgetSpec::LinkUrl {
            url: raw.to_string(),
        },
    ));
}

//! `<u>…</u>` underline pairs.
//!
//! The parser reports each tag as a separate inline HTML node, so pairs are
//! found by a literal scan of at most `underline_scan_cap` bytes: forwards
//! from an opener to the first closer, backwards from a closer to the
//! nearest opener. A pair only counts when both scans agree, so a tag whose
//! nearest partner already belongs to another tag stays inert.

use std::ops::Range;

use super::{push_clamped, ClassifyContext};
use crate::decorations::{Annotation, StyleClass};
use crate::markdown::SyntaxNode;
use crate::string_utils::{ceil_char_boundary, floor_char_boundary};

const OPEN_TAG: &str = "<u>";
const CLOSE_TAG: &str = "</u>";

pub(super) fn classify(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let text = ctx.text;
    let tag = &text[node.span()];
    let cap = ctx.settings.underline_scan_cap;

    let pair = if tag.eq_ignore_ascii_case(OPEN_TAG) {
        closer_after(text, node.end, cap)
            .filter(|close| opener_before(text, close.start, cap) == Some(node.span()))
            .map(|close| (node.span(), close))
    } else if tag.eq_ignore_ascii_case(CLOSE_TAG) {
        opener_before(text, node.start, cap)
            .filter(|open| closer_after(text, open.end, cap) == Some(node.span()))
            .map(|open| (open, node.span()))
    } else {
        None
    };
    let Some((open, close)) = pair else {
        return;
    };

    if open.end < close.start {
        push_clamped(open.end..close.start, window, out, |r| {
            Annotation::mark(r, StyleClass::Underline)
        });
    }

    let active = ctx.selection.touches(open.start, close.end);
    for tag in [open, close] {
        if active {
            push_clamped(tag, window, out, |r| {
                Annotation::mark(r, StyleClass::ActiveMark)
            });
        } else {
            push_clamped(tag, window, out, Annotation::hidden);
        }
    }
}

/// First `</u>` within `cap` bytes after `pos`.
fn closer_after(text: &str, pos: usize, cap: usize) -> Option<Range<usize>> {
    let limit = floor_char_boundary(text, pos.saturating_add(cap));
    let at = find_ignore_case(text.get(pos..limit)?, CLOSE_TAG)?;
    Some(pos + at..pos + at + CLOSE_TAG.len())
}

/// Nearest `<u>` within `cap` bytes before `pos`.
fn opener_before(text: &str, pos: usize, cap: usize) -> Option<Range<usize>> {
    let from = ceil_char_boundary(text, pos.saturating_sub(cap));
    let at = rfind_ignore_case(text.get(from..pos)?, OPEN_TAG)?;
    Some(from + at..from + at + OPEN_TAG.len())
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

fn rfind_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .rposition(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

//! Fenced code blocks: interior line styles, token highlighting and the copy
//! button.

use std::ops::Range;

use super::ClassifyContext;
use crate::decorations::viewport::clamp;
use crate::decorations::{Annotation, StyleClass, WidgetSpec};
use crate::markdown::syntax::get_highlighter;
use crate::markdown::SyntaxNode;
use crate::string_utils::{line_at, line_end, lines_in, next_line};

/// Opening fence: its character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    ch: u8,
    len: usize,
}

impl Fence {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_start_matches(|c| c == ' ' || c == '\t');
        let ch = *line.as_bytes().first()?;
        if ch != b'`' && ch != b'~' {
            return None;
        }
        let len = line.bytes().take_while(|b| *b == ch).count();
        (len >= 3).then_some(Self { ch, len })
    }

    /// A closing fence: same character, at least as long, nothing after it.
    /// Container prefixes (`>` and indentation) are skipped.
    fn is_closed_by(&self, line: &str) -> bool {
        let line = line.trim_start_matches(|c| c == ' ' || c == '\t' || c == '>');
        let run = line.bytes().take_while(|b| *b == self.ch).count();
        run >= self.len && line[run..].trim().is_empty()
    }
}

/// Style every line that starts after `open` and before `bound`, clamped to
/// `window`. Shared with front matter blocks.
pub(super) fn style_interior(
    text: &str,
    open: &Range<usize>,
    bound: usize,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let Some(first) = next_line(text, open) else {
        return;
    };
    if first.start >= bound {
        return;
    }
    let Some(visible) = clamp(first.start..bound - 1, window) else {
        return;
    };
    for line in lines_in(text, visible) {
        if line.start >= bound {
            break;
        }
        out.push(Annotation::line(line.start, StyleClass::CodeBlock));
    }
}

pub(super) fn classify(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    info: &str,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let text = ctx.text;
    let open = line_at(text, node.start);
    let Some(fence) = Fence::parse(&text[node.start..open.end.max(node.start)]) else {
        return;
    };

    let last = line_at(text, node.end);
    let closed = last.start > open.start && fence.is_closed_by(&text[last.clone()]);
    // Lines starting before `bound` are interior; an unterminated block
    // runs to its end.
    let bound = if closed { last.start } else { node.end + 1 };
    style_interior(text, &open, bound, window, out);

    let language = info.split_whitespace().next().unwrap_or("");
    if language.is_empty() {
        return;
    }
    let Some(first) = next_line(text, &open).filter(|l| l.start < bound) else {
        copy_button(ctx, &open, String::new(), language, window, out);
        return;
    };
    let interior = first.start..(bound - 1).min(text.len());

    if ctx.settings.highlight_code_blocks {
        highlight(ctx, interior.clone(), language, window, out);
    }
    let code = text[interior]
        .trim_end_matches(|c| c == '\n' || c == '\r')
        .to_string();
    copy_button(ctx, &open, code, language, window, out);
}

/// Token styles for the visible part of the interior.
///
/// Highlighting state is seeded from the first interior line, so the block
/// is highlighted from its start up to the end of the window. Blocks longer
/// than `max_highlight_lines` are skipped.
fn highlight(
    ctx: &ClassifyContext<'_>,
    interior: Range<usize>,
    language: &str,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let text = ctx.text;
    let cap = ctx.settings.max_highlight_lines;
    if lines_in(text, interior.clone()).take(cap + 1).count() > cap {
        return;
    }
    if window.end < interior.start || window.start > interior.end {
        return;
    }

    let end = line_end(text, interior.end.min(window.end)).min(interior.end);
    let highlighter = get_highlighter();
    let Some(theme) = highlighter.theme_for_settings(ctx.settings, ctx.dark_mode) else {
        return;
    };
    let Some(spans) = highlighter.highlight_spans(&text[interior.start..end], language, theme)
    else {
        return;
    };

    for (range, style) in spans {
        let absolute = range.start + interior.start..range.end + interior.start;
        if let Some(visible) = clamp(absolute, window) {
            if visible.start < visible.end {
                out.push(Annotation::token(visible, style));
            }
        }
    }
}

fn copy_button(
    ctx: &ClassifyContext<'_>,
    open: &Range<usize>,
    code: String,
    language: &str,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    if !ctx.settings.code_copy_button || open.end < window.start || open.end > window.end {
        return;
    }
    out.push(Annotation::widget(
        open.end..open.end,
        WidgetSpec::CodeCopy {
            language: language.to_string(),
            code,
        },
    ));
}

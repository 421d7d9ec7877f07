//! ATX and setext headings.

use std::ops::Range;

use super::{push_clamped, ClassifyContext};
use crate::decorations::viewport::clamp;
use crate::decorations::{Annotation, StyleClass};
use crate::markdown::{NodeKind, SyntaxNode};
use crate::string_utils::{line_at, line_start, lines_in};

const MAX_LEVEL: usize = 6;

/// `#` headings: line style per level, and the `#` run either hidden (with
/// one following space) or shown with the marker style.
pub(super) fn classify_atx(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let Some(mark) = node.child(&NodeKind::HeaderMark) else {
        return;
    };
    let level = mark.end - mark.start;
    if level == 0 || level > MAX_LEVEL {
        return;
    }

    let line = line_start(ctx.text, node.start);
    if window.start <= line && line <= window.end {
        out.push(Annotation::line(line, StyleClass::Heading(level as u8)));
    }

    // A caret parked before the first `#` does not count as inside
    if ctx.selection.touches(node.start + 1, node.end) {
        push_clamped(mark.span(), window, out, |r| {
            Annotation::mark(r, StyleClass::HeadingMark)
        });
    } else {
        let mut end = mark.end;
        if end < node.end && ctx.text.as_bytes()[end] == b' ' {
            end += 1;
        }
        push_clamped(mark.start..end, window, out, Annotation::hidden);
    }
}

/// Underlined headings: line style on the text lines, underline hidden or
/// shown with the marker style.
pub(super) fn classify_setext(
    ctx: &ClassifyContext<'_>,
    node: &SyntaxNode,
    level: u8,
    window: &Range<usize>,
    out: &mut Vec<Annotation>,
) {
    let Some(mark) = node.child(&NodeKind::HeaderMark) else {
        return;
    };
    let underline = line_at(ctx.text, mark.start);
    if underline.start <= node.start {
        return;
    }

    let text_end = underline.start - 1;
    if let Some(visible) = clamp(node.start..text_end, window) {
        for line in lines_in(ctx.text, visible) {
            if line.start >= underline.start {
                break;
            }
            out.push(Annotation::line(line.start, StyleClass::Heading(level)));
        }
    }

    if ctx.selection.touches(node.start, node.end) {
        push_clamped(mark.span(), window, out, |r| {
            Annotation::mark(r, StyleClass::HeadingMark)
        });
    } else {
        push_clamped(underline, window, out, Annotation::hidden);
    }
}

#[cfg(test)]
mod tests {
    use crate::decorations::classify::tests::{hidden, line_starts, marks, run};
    use crate::decorations::StyleClass;

    #[test]
    fn test_caret_at_line_start_hides_marks() {
        let set = run("# Title", 0);
        assert_eq!(line_starts(&set, StyleClass::Heading(1)), vec![0]);
        assert_eq!(hidden(&set), vec![0..2]);
        assert!(marks(&set, StyleClass::HeadingMark).is_empty());
    }

    #[test]
    fn test_caret_inside_shows_marks() {
        let set = run("# Title", 2);
        assert_eq!(line_starts(&set, StyleClass::Heading(1)), vec![0]);
        assert!(hidden(&set).is_empty());
        assert_eq!(marks(&set, StyleClass::HeadingMark), vec![0..1]);
    }

    #[test]
    fn test_caret_at_heading_end_is_inside() {
        let set = run("## Sub\n\nbody", 6);
        assert_eq!(marks(&set, StyleClass::HeadingMark), vec![0..2]);
    }

    #[test]
    fn test_caret_elsewhere_hides() {
        let set = run("### Three\n\nbody", 12);
        assert_eq!(line_starts(&set, StyleClass::Heading(3)), vec![0]);
        assert_eq!(hidden(&set), vec![0..4]);
    }

    #[test]
    fn test_empty_heading_hides_only_marks() {
        let set = run("##\n\nbody", 7);
        assert_eq!(hidden(&set), vec![0..2]);
    }

    #[test]
    fn test_level_bound() {
        for level in 1..=6 {
            let text = format!("{} H", "#".repeat(level));
            let set = run(&text, text.len() + 1);
            assert_eq!(
                line_starts(&set, StyleClass::Heading(level as u8)),
                vec![0],
                "level {}",
                level
            );
        }
        let set = run("####### H", 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_setext_caret_outside() {
        let text = "Title\n===\n\nbody";
        let set = run(text, 13);
        assert_eq!(line_starts(&set, StyleClass::Heading(1)), vec![0]);
        assert_eq!(hidden(&set), vec![6..9]);
    }

    #[test]
    fn test_setext_caret_inside() {
        let text = "Two\nlines\n---\n\nbody";
        let set = run(text, 1);
        assert_eq!(line_starts(&set, StyleClass::Heading(2)), vec![0, 4]);
        assert!(hidden(&set).is_empty());
        assert_eq!(marks(&set, StyleClass::HeadingMark), vec![10..13]);
    }
}

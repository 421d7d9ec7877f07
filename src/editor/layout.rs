//! egui layout binding
//!
//! Turns a [`DecorationSet`] into an [`egui::text::LayoutJob`] for use as a
//! `TextEdit` layouter. The job always contains the full document text byte
//! for byte, so cursor positions in egui stay document offsets. Hidden and
//! widget-replaced ranges are drawn transparent at a tiny size; the host paints
//! widgets on top of their range.

use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId, Stroke};
use std::ops::Range;

use crate::decorations::{
    Annotation, AnnotationKind, DecorationSet, Payload, StyleClass, TokenStyle,
};
use crate::string_utils::{floor_char_boundary, line_end};
use crate::theme::DecorationColors;

/// Font size used for collapsed text.
const COLLAPSED_SIZE: f32 = 0.5;

/// Build the layout job for `text` under `decorations`.
///
/// Segments between consecutive annotation bounds are visited in order while
/// the annotations covering the current segment are kept in active lists, so
/// each annotation is added and removed once.
pub fn layout_job(text: &str, decorations: &DecorationSet, colors: &DecorationColors) -> LayoutJob {
    let len = text.len();
    let mut lines: Vec<(Range<usize>, StyleClass)> = decorations
        .of_kind(AnnotationKind::LineStyle)
        .filter(|a| a.from <= len)
        .filter_map(|a| Some((a.from..line_end(text, a.from), a.style()?)))
        .collect();
    lines.sort_by_key(|(r, _)| r.start);
    let mut inline: Vec<&Annotation> = decorations
        .iter()
        .filter(|a| a.kind != AnnotationKind::LineStyle && a.from < a.to)
        .collect();
    inline.sort_by_key(|a| a.from);

    let mut bounds: Vec<usize> = vec![0, len];
    bounds.extend(lines.iter().flat_map(|(r, _)| [r.start, r.end]));
    bounds.extend(inline.iter().flat_map(|a| [a.from, a.to]));
    let mut bounds: Vec<usize> = bounds
        .into_iter()
        .map(|b| floor_char_boundary(text, b.min(len)))
        .collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut next_line = 0;
    let mut next_inline = 0;
    let mut active_lines: Vec<&(Range<usize>, StyleClass)> = Vec::new();
    let mut active_inline: Vec<&Annotation> = Vec::new();

    let mut job = LayoutJob::default();
    for pair in bounds.windows(2) {
        let (start, end) = (pair[0], pair[1]);

        while let Some(line) = lines.get(next_line).filter(|(r, _)| r.start <= start) {
            active_lines.push(line);
            next_line += 1;
        }
        active_lines.retain(|(r, _)| end <= r.end);
        while let Some(annotation) = inline.get(next_inline).filter(|a| a.from <= start) {
            active_inline.push(*annotation);
            next_inline += 1;
        }
        active_inline.retain(|a| end <= a.to);

        let mut format = base_format(colors);
        for (_, class) in &active_lines {
            apply_class(&mut format, *class, colors);
        }
        let mut collapsed = false;
        for annotation in &active_inline {
            match (&annotation.kind, &annotation.payload) {
                (AnnotationKind::MarkStyle, Payload::Style(class)) => {
                    apply_class(&mut format, *class, colors)
                }
                (AnnotationKind::MarkStyle, Payload::Token(token)) => apply_token(&mut format, token),
                (AnnotationKind::Hidden, _) | (AnnotationKind::ReplaceWithWidget, _) => {
                    collapsed = true
                }
                _ => {}
            }
        }
        if collapsed {
            format.color = Color32::TRANSPARENT;
            format.background = Color32::TRANSPARENT;
            format.font_id = FontId::monospace(COLLAPSED_SIZE);
        }
        job.append(&text[start..end], 0.0, format);
    }
    job
}

fn base_format(colors: &DecorationColors) -> TextFormat {
    TextFormat {
        font_id: FontId::monospace(colors.font_size),
        color: colors.text,
        ..Default::default()
    }
}

fn apply_class(format: &mut TextFormat, class: StyleClass, colors: &DecorationColors) {
    if let Some(color) = colors.color_for(class) {
        format.color = color;
    }
    if let Some(background) = colors.background_for(class) {
        format.background = background;
    }
    match class {
        StyleClass::Heading(level) => {
            format.font_id = FontId::proportional(colors.heading_size(level));
        }
        StyleClass::Emphasis => format.italics = true,
        StyleClass::Strikethrough => format.strikethrough = Stroke::new(1.0, format.color),
        StyleClass::Underline => format.underline = Stroke::new(1.0, format.color),
        StyleClass::Link => format.underline = Stroke::new(1.0, colors.link),
        _ => {}
    }
}

fn apply_token(format: &mut TextFormat, token: &TokenStyle) {
    let [r, g, b, a] = token.color;
    format.color = Color32::from_rgba_unmultiplied(r, g, b, a);
    format.italics |= token.italic;
    if token.underline {
        format.underline = Stroke::new(1.0, format.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_text(job: &LayoutJob) -> String {
        job.sections
            .iter()
            .map(|s| &job.text[s.byte_range.clone()])
            .collect()
    }

    #[test]
    fn test_text_is_preserved() {
        let text = "# Title\n**bold** and `code`";
        let set = DecorationSet::new(vec![
            Annotation::line(0, StyleClass::Heading(1)),
            Annotation::hidden(0..2),
            Annotation::mark(8..16, StyleClass::Strong),
            Annotation::hidden(8..10),
            Annotation::hidden(14..16),
            Annotation::mark(21..27, StyleClass::InlineCode),
        ]);
        let job = layout_job(text, &set, &DecorationColors::light());
        assert_eq!(job.text, text);
        assert_eq!(job_text(&job), text);
    }

    #[test]
    fn test_hidden_range_is_transparent() {
        let text = "## Heading";
        let set = DecorationSet::new(vec![
            Annotation::line(0, StyleClass::Heading(2)),
            Annotation::hidden(0..3),
        ]);
        let colors = DecorationColors::light();
        let job = layout_job(text, &set, &colors);
        let hidden = &job.sections[0];
        assert_eq!(hidden.byte_range, 0..3);
        assert_eq!(hidden.format.color, Color32::TRANSPARENT);
        let visible = &job.sections[1];
        assert_eq!(visible.format.color, colors.heading);
        assert_eq!(visible.format.font_id.size, colors.heading_size(2));
    }

    #[test]
    fn test_line_style_stops_at_line_end() {
        let text = "> quote\nplain";
        let set = DecorationSet::new(vec![Annotation::line(0, StyleClass::Blockquote)]);
        let colors = DecorationColors::dark();
        let job = layout_job(text, &set, &colors);
        let last = job.sections.last().unwrap();
        assert_eq!(&text[last.byte_range.clone()], "\nplain");
        assert_eq!(last.format.color, colors.text);
    }

    #[test]
    fn test_token_color() {
        let text = "let x";
        let token = TokenStyle {
            color: [10, 20, 30, 255],
            bold: false,
            italic: true,
            underline: false,
        };
        let set = DecorationSet::new(vec![Annotation::token(0..3, token)]);
        let job = layout_job(text, &set, &DecorationColors::light());
        assert_eq!(job.sections[0].format.color, Color32::from_rgb(10, 20, 30));
        assert!(job.sections[0].format.italics);
    }

    #[test]
    fn test_empty_document() {
        let job = layout_job("", &DecorationSet::default(), &DecorationColors::light());
        assert!(job.text.is_empty());
    }

    #[test]
    fn test_overlapping_annotations_across_many_lines() {
        let line = "**bold** ~~gone~~\n";
        let text = line.repeat(200);
        let mut annotations = Vec::new();
        for i in 0..200 {
            let base = i * line.len();
            annotations.push(Annotation::line(base, StyleClass::Blockquote));
            annotations.push(Annotation::mark(base..base + 8, StyleClass::Strong));
            annotations.push(Annotation::hidden(base..base + 2));
            annotations.push(Annotation::hidden(base + 6..base + 8));
            annotations.push(Annotation::mark(base + 9..base + 17, StyleClass::Strikethrough));
        }
        let set = DecorationSet::new(annotations);
        let colors = DecorationColors::light();
        let job = layout_job(&text, &set, &colors);
        assert_eq!(job_text(&job), text);

        let section_at = |pos: usize| {
            job.sections
                .iter()
                .find(|s| s.byte_range.contains(&pos))
                .unwrap()
        };
        let last = 199 * line.len();
        assert_eq!(section_at(last).format.color, Color32::TRANSPARENT);
        assert_eq!(section_at(last + 3).format.color, colors.strong);
        assert_eq!(section_at(last + 3).format.background, colors.blockquote_bg);
        assert!(section_at(last + 12).format.strikethrough.width > 0.0);
        assert_eq!(section_at(last + line.len() - 1).format.color, colors.text);
    }
}

//! Collapsed link destination
//!
//! Shown in place of a same-line URL while the caret is outside its link.
//! A modified click opens the URL; a plain click parks the caret at the start
//! of the hidden text, which reveals it on the next render.

use std::ops::Range;

use super::{Widget, WidgetAction, WidgetEvent, WidgetView};
use crate::decorations::{Selection, WidgetSpec};
use crate::editor::Transaction;

#[derive(Debug, Clone)]
pub struct LinkUrlWidget {
    spec: WidgetSpec,
    url: String,
    span: Range<usize>,
    glyph: String,
}

impl LinkUrlWidget {
    pub fn new(url: &str, span: Range<usize>, glyph: &str) -> Self {
        Self {
            spec: WidgetSpec::LinkUrl {
                url: url.to_string(),
            },
            url: url.to_string(),
            span,
            glyph: glyph.to_string(),
        }
    }

    /// Destination without `<...>` wrapping.
    pub fn target(&self) -> &str {
        strip_angle_brackets(&self.url)
    }
}

/// `<url>` becomes `url`; anything else is returned unchanged.
pub fn strip_angle_brackets(url: &str) -> &str {
    url.strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url)
}

impl Widget for LinkUrlWidget {
    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    fn expected_text(&self) -> &str {
        &self.url
    }

    fn render(&self) -> WidgetView {
        WidgetView::LinkIcon {
            glyph: self.glyph.clone(),
            tooltip: self.target().to_string(),
        }
    }

    fn on_event(&mut self, event: WidgetEvent) -> Option<WidgetAction> {
        match event {
            WidgetEvent::Click { modified: true } => {
                Some(WidgetAction::OpenUrl(self.target().to_string()))
            }
            WidgetEvent::Click { modified: false } => Some(WidgetAction::Dispatch(
                Transaction::select(Selection::cursor(self.span.start)).with_focus(),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modified_click_opens_url() {
        let mut widget = LinkUrlWidget::new("<https://a.b/c>", 8..23, "🔗");
        assert_eq!(
            widget.on_event(WidgetEvent::Click { modified: true }),
            Some(WidgetAction::OpenUrl("https://a.b/c".to_string()))
        );
    }

    #[test]
    fn test_plain_click_moves_caret() {
        let mut widget = LinkUrlWidget::new("http://x.y", 8..18, "🔗");
        let Some(WidgetAction::Dispatch(tx)) = widget.on_event(WidgetEvent::Click { modified: false })
        else {
            panic!("expected a dispatch");
        };
        assert!(tx.changes.is_empty());
        assert_eq!(tx.selection, Some(Selection::cursor(8)));
        assert!(tx.focus);
    }

    #[test]
    fn test_render_placeholder() {
        let widget = LinkUrlWidget::new("http://x.y", 0..10, "🔗");
        assert_eq!(
            widget.render(),
            WidgetView::LinkIcon {
                glyph: "🔗".to_string(),
                tooltip: "http://x.y".to_string()
            }
        );
        assert_eq!(widget.expected_text(), "http://x.y");
    }

    #[test]
    fn test_strip_angle_brackets() {
        assert_eq!(strip_angle_brackets("<a>"), "a");
        assert_eq!(strip_angle_brackets("<a"), "<a");
        assert_eq!(strip_angle_brackets("a"), "a");
    }

    #[test]
    fn test_other_events_ignored() {
        let mut widget = LinkUrlWidget::new("u", 0..1, "🔗");
        assert_eq!(widget.on_event(WidgetEvent::Commit), None);
    }
}

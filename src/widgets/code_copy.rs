//! Copy button on fenced code blocks

use std::ops::Range;

use super::{Widget, WidgetAction, WidgetEvent, WidgetView};
use crate::decorations::WidgetSpec;

#[derive(Debug, Clone)]
pub struct CodeCopyWidget {
    spec: WidgetSpec,
    language: String,
    code: String,
    span: Range<usize>,
}

impl CodeCopyWidget {
    pub fn new(language: &str, code: &str, span: Range<usize>) -> Self {
        Self {
            spec: WidgetSpec::CodeCopy {
                language: language.to_string(),
                code: code.to_string(),
            },
            language: language.to_string(),
            code: code.to_string(),
            span,
        }
    }
}

impl Widget for CodeCopyWidget {
    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    // Point widget: replaces nothing
    fn expected_text(&self) -> &str {
        ""
    }

    fn render(&self) -> WidgetView {
        WidgetView::CopyButton {
            label: format!("📋 {}", self.language),
        }
    }

    fn on_event(&mut self, event: WidgetEvent) -> Option<WidgetAction> {
        match event {
            WidgetEvent::Click { .. } => Some(WidgetAction::CopyText(self.code.clone())),
            _ => None,
        }
    }
}

//! Decoration palettes for egui hosts
//!
//! The engine itself only emits [`StyleClass`]es; hosts decide how they look.
//! This module holds the light and dark palettes used by
//! [`layout_job`](crate::editor::layout_job) to turn those classes into egui
//! text formats. The `Theme` setting (Light/Dark/System) selects a palette at
//! runtime.
//!
//! # Usage
//!
//! ```ignore
//! use ferrite_live::theme::DecorationColors;
//!
//! let colors = DecorationColors::from_settings(&settings, ctx.style().visuals.dark_mode);
//! let job = layout_job(text, &decorations, &colors);
//! ```

use egui::Color32;

use crate::config::Settings;
use crate::decorations::StyleClass;

// ─────────────────────────────────────────────────────────────────────────────
// Decoration Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors and sizes for every decoration style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationColors {
    /// Plain text
    pub text: Color32,
    /// Strong emphasis, drawn brighter than plain text
    pub strong: Color32,
    /// Heading text (H1-H6)
    pub heading: Color32,
    /// Visible markup while the caret is inside its construct
    pub active_mark: Color32,
    /// Faded `>` markers
    pub quote_mark: Color32,
    /// Blockquote text
    pub blockquote_text: Color32,
    /// Blockquote line background, standing in for the left border
    pub blockquote_bg: Color32,
    /// Fenced code and front matter line background
    pub code_block_bg: Color32,
    /// Inline code text
    pub code: Color32,
    /// Inline code background
    pub code_bg: Color32,
    pub link: Color32,
    /// Base font size in points
    pub font_size: f32,
}

impl DecorationColors {
    /// Light theme palette.
    pub fn light() -> Self {
        Self {
            text: Color32::from_rgb(30, 30, 30),
            strong: Color32::BLACK,
            heading: Color32::from_rgb(0, 100, 180),
            active_mark: Color32::from_rgb(120, 120, 120),
            quote_mark: Color32::from_rgb(160, 160, 160),
            blockquote_text: Color32::from_rgb(100, 100, 100),
            blockquote_bg: Color32::from_rgb(245, 245, 245),
            code_block_bg: Color32::from_rgb(233, 236, 239),
            code: Color32::from_rgb(80, 80, 80),
            code_bg: Color32::from_rgb(240, 242, 245),
            link: Color32::from_rgb(0, 100, 180),
            font_size: 14.0,
        }
    }

    /// Dark theme palette.
    pub fn dark() -> Self {
        Self {
            text: Color32::from_rgb(220, 220, 220),
            strong: Color32::WHITE,
            heading: Color32::from_rgb(100, 180, 255),
            active_mark: Color32::from_rgb(140, 140, 140),
            quote_mark: Color32::from_rgb(100, 100, 100),
            blockquote_text: Color32::from_rgb(180, 180, 180),
            blockquote_bg: Color32::from_rgb(40, 40, 40),
            code_block_bg: Color32::from_rgb(35, 39, 46),
            code: Color32::from_rgb(200, 200, 150),
            code_bg: Color32::from_rgb(45, 50, 60),
            link: Color32::from_rgb(100, 180, 255),
            font_size: 14.0,
        }
    }

    /// Palette for the configured theme; `System` follows `host_dark_mode`.
    pub fn from_settings(settings: &Settings, host_dark_mode: bool) -> Self {
        if settings.theme.is_dark(host_dark_mode) {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Font size for a heading level, scaled from the base size.
    pub fn heading_size(&self, level: u8) -> f32 {
        let scale = match level {
            1 => 2.0,
            2 => 1.6,
            3 => 1.35,
            4 => 1.2,
            5 => 1.1,
            _ => 1.0,
        };
        self.font_size * scale
    }

    /// Text color for a style class, if it changes the color.
    pub fn color_for(&self, class: StyleClass) -> Option<Color32> {
        match class {
            StyleClass::Heading(_) => Some(self.heading),
            StyleClass::HeadingMark | StyleClass::ActiveMark | StyleClass::CodeMark => {
                Some(self.active_mark)
            }
            StyleClass::QuoteMark => Some(self.quote_mark),
            StyleClass::Blockquote => Some(self.blockquote_text),
            StyleClass::InlineCode => Some(self.code),
            StyleClass::Link => Some(self.link),
            StyleClass::Strong => Some(self.strong),
            StyleClass::CodeBlock
            | StyleClass::Emphasis
            | StyleClass::Strikethrough
            | StyleClass::Underline => None,
        }
    }

    /// Background for a style class, if it sets one.
    pub fn background_for(&self, class: StyleClass) -> Option<Color32> {
        match class {
            StyleClass::CodeBlock => Some(self.code_block_bg),
            StyleClass::Blockquote => Some(self.blockquote_bg),
            StyleClass::InlineCode | StyleClass::CodeMark => Some(self.code_bg),
            _ => None,
        }
    }
}

impl Default for DecorationColors {
    fn default() -> Self {
        Self::light()
    }
}

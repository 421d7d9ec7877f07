//! Engine settings for Ferrite Live
//!
//! This module defines the `Settings` struct that holds the tunable bounds of
//! the decoration passes and the options of the interactive widgets, with
//! serde support for JSON persistence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Color theme used by the egui layout binding and code highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the host's dark mode flag
    System,
}

impl Theme {
    /// Resolve to a concrete dark/light decision.
    pub fn is_dark(&self, host_dark_mode: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => host_dark_mode,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// User-configurable engine settings.
///
/// The scan caps keep every decoration pass bounded on pathological input.
/// They are tunable: a construct larger than its cap is simply not
/// recognized (front matter) or not paired (underline tags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color theme
    pub theme: Theme,
    /// Maximum number of lines scanned for the closing `---` of front matter
    pub front_matter_line_cap: usize,
    /// Maximum number of bytes scanned to pair `<u>` with `</u>`
    pub underline_scan_cap: usize,
    /// Fenced code blocks with more lines than this are not highlighted
    pub max_highlight_lines: usize,
    /// Glyph shown in place of a collapsed link URL
    pub link_placeholder: String,
    /// Maximum width of the image hover preview, in points
    pub image_preview_max_width: f32,
    /// Maximum height of the image hover preview, in points
    pub image_preview_max_height: f32,
    /// Highlight fenced code blocks that carry a language tag
    pub highlight_code_blocks: bool,
    /// Show a copy button on fenced code blocks that carry a language tag
    pub code_copy_button: bool,
    /// Syntect theme name for code highlighting (None = follow `theme`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_theme: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            front_matter_line_cap: Self::DEFAULT_FRONT_MATTER_LINE_CAP,
            underline_scan_cap: Self::DEFAULT_UNDERLINE_SCAN_CAP,
            max_highlight_lines: 2000,
            link_placeholder: Self::DEFAULT_LINK_PLACEHOLDER.to_string(),
            image_preview_max_width: 320.0,
            image_preview_max_height: 240.0,
            highlight_code_blocks: true,
            code_copy_button: true,
            code_theme: None,
        }
    }
}

impl Settings {
    /// Default front matter scan bound, in lines.
    pub const DEFAULT_FRONT_MATTER_LINE_CAP: usize = 100;
    /// Default underline pairing bound, in bytes.
    pub const DEFAULT_UNDERLINE_SCAN_CAP: usize = 1000;
    /// Default placeholder glyph for collapsed URLs.
    pub const DEFAULT_LINK_PLACEHOLDER: &'static str = "🔗";

    /// Upper bound for any line/byte scan cap.
    pub const MAX_SCAN_CAP: usize = 1_000_000;
    /// Smallest accepted image preview edge.
    pub const MIN_PREVIEW_SIZE: f32 = 32.0;
    /// Largest accepted image preview edge.
    pub const MAX_PREVIEW_SIZE: f32 = 4096.0;

    /// Clamp out-of-range values back into a usable range.
    pub fn sanitize(&mut self) {
        // A zero cap would disable the construct entirely
        if self.front_matter_line_cap == 0 {
            self.front_matter_line_cap = Self::DEFAULT_FRONT_MATTER_LINE_CAP;
        }
        if self.underline_scan_cap == 0 {
            self.underline_scan_cap = Self::DEFAULT_UNDERLINE_SCAN_CAP;
        }
        self.front_matter_line_cap = self.front_matter_line_cap.min(Self::MAX_SCAN_CAP);
        self.underline_scan_cap = self.underline_scan_cap.min(Self::MAX_SCAN_CAP);
        self.max_highlight_lines = self.max_highlight_lines.min(Self::MAX_SCAN_CAP);

        if self.link_placeholder.trim().is_empty() {
            self.link_placeholder = Self::DEFAULT_LINK_PLACEHOLDER.to_string();
        }

        self.image_preview_max_width = sanitize_preview_size(self.image_preview_max_width, 320.0);
        self.image_preview_max_height =
            sanitize_preview_size(self.image_preview_max_height, 240.0);

        if matches!(&self.code_theme, Some(name) if name.trim().is_empty()) {
            self.code_theme = None;
        }
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

fn sanitize_preview_size(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(Settings::MIN_PREVIEW_SIZE, Settings::MAX_PREVIEW_SIZE)
    } else {
        default
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

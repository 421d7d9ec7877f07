//! Syntax Highlighting Module
//!
//! This module integrates syntect to highlight the interior of fenced code
//! blocks. Highlighting produces byte-range token styles that the code block
//! classifier turns into mark annotations.
//!
//! # Example
//! ```ignore
//! use crate::markdown::syntax::get_highlighter;
//!
//! let highlighter = get_highlighter();
//! let theme = highlighter.get_theme_for_mode(false);
//! let spans = highlighter.highlight_spans("fn main() {}", "rust", theme);
//! ```

use log::{debug, warn};
use std::ops::Range;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::config::Settings;
use crate::decorations::TokenStyle;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default dark theme name from syntect's built-in themes
pub const DEFAULT_DARK_THEME: &str = "base16-ocean.dark";

/// Default light theme name from syntect's built-in themes
pub const DEFAULT_LIGHT_THEME: &str = "InspiredGitHub";

/// Fallback theme if the specified theme is not found
pub const FALLBACK_THEME: &str = "base16-ocean.dark";

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Syntax highlighter that caches syntect sets for performance.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Load the syntaxes and themes bundled with syntect.
    ///
    /// Relatively expensive; use [`get_highlighter`] to share one instance.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    pub fn syntax_set(&self) -> &SyntaxSet {
        &self.syntax_set
    }

    /// Get a theme by name, falling back to the default if not found.
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Get the appropriate theme for dark or light mode.
    pub fn get_theme_for_mode(&self, dark_mode: bool) -> Option<&Theme> {
        let theme_name = if dark_mode {
            DEFAULT_DARK_THEME
        } else {
            DEFAULT_LIGHT_THEME
        };
        self.get_theme(theme_name)
    }

    /// Theme named in settings, or the default for the resolved mode.
    pub fn theme_for_settings(&self, settings: &Settings, dark_mode: bool) -> Option<&Theme> {
        match settings.code_theme.as_deref() {
            Some(name) if self.theme_set.themes.contains_key(name) => self.get_theme(name),
            _ => self.get_theme_for_mode(dark_mode),
        }
    }

    /// Whether a fenced block's language tag maps to a known syntax.
    pub fn supports_language(&self, language: &str) -> bool {
        self.find_syntax_for_language(language).is_some()
    }

    /// Highlight `code` and return the styled byte ranges within it.
    ///
    /// Whitespace-only pieces and line terminators are skipped. Returns
    /// `None` when the language is not recognized.
    pub fn highlight_spans(
        &self,
        code: &str,
        language: &str,
        theme: &Theme,
    ) -> Option<Vec<(Range<usize>, TokenStyle)>> {
        let syntax = self.find_syntax_for_language(language)?;
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut spans = Vec::new();
        let mut offset = 0;

        for line in LinesWithEndings::from(code) {
            let ranges = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => ranges,
                Err(e) => {
                    warn!("Failed to highlight line: {}", e);
                    break;
                }
            };
            for (style, piece) in ranges {
                let visible = piece.trim_end_matches(|c| c == '\n' || c == '\r');
                if !visible.trim().is_empty() {
                    spans.push((offset..offset + visible.len(), token_style(style)));
                }
                offset += piece.len();
            }
        }

        Some(spans)
    }

    /// Find syntax definition for a language identifier.
    ///
    /// Tries multiple strategies:
    /// 1. By extension (e.g., "rs" -> Rust)
    /// 2. By name (e.g., "Rust" -> Rust)
    /// 3. By case-insensitive name
    fn find_syntax_for_language(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }

        let lang_lower = language.to_lowercase();

        // Map common language aliases to extensions
        let extension = match lang_lower.as_str() {
            "rust" | "rs" => "rs",
            "python" | "py" => "py",
            "javascript" | "js" => "js",
            "typescript" | "ts" => "ts",
            "c" => "c",
            "cpp" | "c++" | "cxx" => "cpp",
            "csharp" | "c#" | "cs" => "cs",
            "java" => "java",
            "go" | "golang" => "go",
            "ruby" | "rb" => "rb",
            "php" => "php",
            "html" | "htm" => "html",
            "css" => "css",
            "json" => "json",
            "yaml" | "yml" => "yaml",
            "xml" => "xml",
            "markdown" | "md" => "md",
            "sql" => "sql",
            "shell" | "sh" | "bash" | "zsh" => "sh",
            "makefile" | "make" => "Makefile",
            "lua" => "lua",
            "perl" | "pl" => "pl",
            "r" => "r",
            "haskell" | "hs" => "hs",
            "erlang" | "erl" => "erl",
            "clojure" | "clj" => "clj",
            "diff" | "patch" => "diff",
            other => other,
        };

        if let Some(syntax) = self.syntax_set.find_syntax_by_extension(extension) {
            return Some(syntax);
        }

        if let Some(syntax) = self.syntax_set.find_syntax_by_name(language) {
            return Some(syntax);
        }

        self.syntax_set
            .syntaxes()
            .iter()
            .find(|syntax| syntax.name.to_lowercase() == lang_lower)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a syntect style to a token style.
fn token_style(style: Style) -> TokenStyle {
    let fg = style.foreground;
    TokenStyle {
        color: [fg.r, fg.g, fg.b, fg.a],
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
        underline: style.font_style.contains(FontStyle::UNDERLINE),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Highlighter Instance
// ─────────────────────────────────────────────────────────────────────────────

static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// Get or create the global syntax highlighter.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

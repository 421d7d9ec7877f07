//! YAML front matter detection and extraction
//!
//! A front matter block is recognized only when the very first line of the
//! document is exactly `---`; the closing `---` must appear within a bounded
//! number of lines. Detection is purely textual and never fails. Extraction
//! (used by hosts that show a metadata panel) additionally parses the block
//! as YAML and falls back to "no front matter" when it is invalid.

use crate::error::Result;
use crate::string_utils::{line_at, next_line};
use log::warn;
use std::ops::Range;

const DELIMITER: &str = "---";

/// Location of a detected front matter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterSpan {
    /// Content range of the opening `---` line
    pub open: Range<usize>,
    /// Content range of the closing `---` line
    pub close: Range<usize>,
    /// Offset where the document body begins (after the closing line)
    pub body_start: usize,
}

impl FrontMatterSpan {
    /// Whole block, from the opening delimiter to the end of the closing one.
    pub fn block(&self) -> Range<usize> {
        self.open.start..self.close.end
    }

    /// Raw text between the two delimiter lines, without the final newline.
    pub fn interior<'a>(&self, text: &'a str) -> &'a str {
        let start = next_line(text, &self.open)
            .map(|line| line.start)
            .unwrap_or(self.close.start)
            .min(self.close.start);
        text[start..self.close.start].trim_end_matches(|c| c == '\n' || c == '\r')
    }
}

/// Detect a front matter block, scanning at most `line_cap` lines after the
/// opening delimiter for the closing one.
pub fn detect_front_matter(text: &str, line_cap: usize) -> Option<FrontMatterSpan> {
    let open = line_at(text, 0);
    if &text[open.clone()] != DELIMITER {
        return None;
    }

    let mut line = open.clone();
    for _ in 0..line_cap {
        line = next_line(text, &line)?;
        if &text[line.clone()] == DELIMITER {
            let body_start = next_line(text, &line)
                .map(|next| next.start)
                .unwrap_or(text.len());
            return Some(FrontMatterSpan {
                open,
                close: line,
                body_start,
            });
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed front matter: its location and YAML value.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub span: FrontMatterSpan,
    pub data: serde_yaml::Value,
}

impl FrontMatter {
    /// Top-level `key: value` pairs rendered as display strings, in source order.
    pub fn fields(&self) -> Vec<(String, String)> {
        let Some(mapping) = self.data.as_mapping() else {
            return Vec::new();
        };
        mapping
            .iter()
            .map(|(k, v)| (display_value(k), display_value(v)))
            .collect()
    }

    /// Value of a top-level string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

fn display_value(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// A document split into its optional front matter and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument<'a> {
    pub front_matter: Option<FrontMatter>,
    pub body: &'a str,
}

/// Parse the YAML of a detected block.
pub fn parse_front_matter(text: &str, span: FrontMatterSpan) -> Result<FrontMatter> {
    let data: serde_yaml::Value = serde_yaml::from_str(span.interior(text))?;
    Ok(FrontMatter { span, data })
}

/// Split `text` into front matter and body.
///
/// Invalid YAML is not an error: the whole text is returned as body.
pub fn split_front_matter(text: &str, line_cap: usize) -> SplitDocument<'_> {
    let Some(span) = detect_front_matter(text, line_cap) else {
        return SplitDocument {
            front_matter: None,
            body: text,
        };
    };

    let body_start = span.body_start;
    match parse_front_matter(text, span) {
        Ok(front_matter) => SplitDocument {
            front_matter: Some(front_matter),
            body: &text[body_start..],
        },
        Err(e) => {
            warn!("Ignoring front matter: {}", e);
            SplitDocument {
                front_matter: None,
                body: text,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Markdown parsing module
//!
//! This module turns raw Markdown text into a span-annotated syntax tree
//! using the pulldown-cmark library, detects front matter, highlights code
//! blocks with syntect, and implements the inline style toggle commands.
//!
//! # Example
//! ```ignore
//! use crate::markdown::{CmarkParser, MarkdownParser, NodeKind};
//!
//! let tree = CmarkParser::default().parse("# Hello\n\nThis is **bold** text.");
//! let headings = tree
//!     .nodes_in(0..7)
//!     .filter(|n| matches!(n.kind, NodeKind::AtxHeading(_)))
//!     .count();
//! assert_eq!(headings, 1);
//! ```

pub mod formatting;
mod front_matter;
mod parser;
pub mod syntax;
mod tree;

pub use formatting::{toggle_style, StyleCommand, ToggleCase};
pub use front_matter::{
    detect_front_matter, parse_front_matter, split_front_matter, FrontMatter, FrontMatterSpan,
    SplitDocument,
};
pub use parser::{CmarkParser, MarkdownOptions, MarkdownParser};
pub use tree::{NodeKind, NodesIn, SyntaxNode, SyntaxTree};

//! Ferrite Live - Live Markdown Decoration Engine
//!
//! Scans the syntax tree of an editable Markdown document on every edit,
//! scroll or caret move and produces annotations for the host editor: hidden
//! markup symbols, collapsed URLs, line styles for headings, quotes and code,
//! and interactive widgets for tables. Markup is only revealed while the caret
//! is inside it, which gives a "WYSIWYG-lite" editing experience.
//!
//! # Example
//! ```ignore
//! use ferrite_live::{EngineEvent, LiveEngine, MemoryHost, Settings};
//!
//! let mut host = MemoryHost::new("# Title\n\nSome **bold** text");
//! let mut engine = LiveEngine::new(Settings::default());
//! let decorations = engine.update(&host, EngineEvent::DocumentChanged);
//! for annotation in decorations.iter() {
//!     println!("{:?}", annotation);
//! }
//! ```

pub mod config;
pub mod decorations;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod string_utils;
pub mod theme;
pub mod widgets;

pub use config::Settings;
pub use decorations::{Annotation, AnnotationKind, DecorationSet, Payload, Selection, StyleClass};
pub use editor::{EditorHost, EngineEvent, LiveEngine, MemoryHost, Shell, TextChange, Transaction};
pub use error::{Error, Result};
pub use markdown::{CmarkParser, MarkdownParser, NodeKind, SyntaxNode, SyntaxTree};

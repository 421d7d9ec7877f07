//! Editor integration for Ferrite Live
//!
//! This module connects the decoration engine to a host editor: the host
//! interface and transactions, the driver that recomputes decorations on
//! edits, scrolls and caret moves, and the egui layout binding.

mod driver;
mod host;
mod layout;

pub use driver::{EngineEvent, LiveEngine};
pub use host::{EditorHost, MemoryHost, Shell, SystemShell, TextChange, Transaction};
pub use layout::layout_job;

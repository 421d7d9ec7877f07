//! Configuration module for Ferrite Live
//!
//! This module holds the engine settings (scan bounds, widget options,
//! theme) and their JSON persistence in the platform config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;

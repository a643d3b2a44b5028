//! uibind-core
//!
//! Core library for declaring typed bindings against UI template assets and
//! synthesizing the matching source files.
//!
//! This crate defines the binding record model, stable-identity resolution
//! over scene templates, the uniqueness-enforcing name allocator, the
//! multi-strategy code synthesizer with rename propagation, and the project
//! persistence layer.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (editor windows, CLI, automation
//! scripts). Everything is single-threaded and synchronous; a binding set is
//! the unit of consistency and callers serialize mutations themselves.

pub mod codegen;
pub mod db;
pub mod model;
pub mod names;
pub mod scene;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

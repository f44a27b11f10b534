//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All command output goes through this module so quiet and JSON modes are
//! handled the same way everywhere. Diagnostics go through `tracing`
//! instead.

pub mod output;

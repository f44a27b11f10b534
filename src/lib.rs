//! metaselect - Metadata-backed selector controls for Dataverse hosts
//!
//! A selector lets a form author pick an entity, attribute, form, view, or
//! application by its display label while the host stores the stable
//! identifier. Every variant is one generic control driven by a table row.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`core`] - Domain types, label collation, configuration
//! - [`service`] - Abstraction for the remote metadata service
//! - [`selector`] - Resolver, reconciler, and the control state machine
//! - [`host`] - The adapter a hosting runtime drives
//! - [`cli`] - Command-line interface over the host adapter
//! - [`ui`] - Output formatting
//!
//! # Invariants
//!
//! 1. A metadata failure never reaches the host as an error; it shows up as
//!    an empty option list
//! 2. A resolve result is applied only if no newer scope was requested since
//! 3. The host's stored value is never rewritten except by a user selection
//! 4. Nothing fires after teardown

pub mod cli;
pub mod core;
pub mod host;
pub mod selector;
pub mod service;
pub mod ui;

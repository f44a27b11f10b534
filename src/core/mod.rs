//! core
//!
//! Core domain types and configuration for metaselect.
//!
//! # Modules
//!
//! - [`types`] - Metadata items, selection values, the collection wire form
//! - [`collation`] - Locale-style label ordering
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Host-facing strings are parsed once into typed values
//! - Schemas are strict and self-describing
//! - Ordering is deterministic

pub mod collation;
pub mod config;
pub mod types;

//! service
//!
//! Abstraction for the remote metadata service.
//!
//! # Architecture
//!
//! The `MetadataService` trait is the only way selectors reach the network.
//! It is a read endpoint and nothing more: one query in, the raw records of
//! the OData `value` array out. Base URL and credentials are injected at
//! construction rather than read from ambient state.
//!
//! - Service failures never compromise the host form; the resolver downgrades
//!   them to an empty item list
//! - No writes, retries, or caching happen at this layer
//!
//! # Modules
//!
//! - `traits`: `MetadataService` trait, `MetadataQuery`, `MetadataError`
//! - [`dataverse`]: Dataverse Web API client over `reqwest`
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `factory`: Service creation from configuration

pub mod dataverse;
mod factory;
pub mod mock;
mod traits;

pub use dataverse::DataverseService;
pub use factory::create_service;
pub use traits::*;

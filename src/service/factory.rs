//! service::factory
//!
//! Metadata service creation from configuration.
//!
//! # Design
//!
//! Callers use `create_service()` instead of constructing a concrete client,
//! so selectors only ever see `Arc<dyn MetadataService>` and tests can swap
//! in the mock.
//!
//! # Example
//!
//! ```ignore
//! use metaselect::core::config::Config;
//! use metaselect::service::create_service;
//!
//! let config = Config::load()?;
//! let service = create_service(&config)?;
//! println!("using {}", service.name());
//! ```

use std::sync::Arc;

use super::dataverse::DataverseService;
use super::traits::{MetadataError, MetadataService};
use crate::core::config::{Config, BASE_URL_ENV};

/// Create the metadata service described by the configuration.
///
/// The session bearer token, if the configured environment variable holds
/// one, is forwarded on every request.
///
/// # Errors
///
/// Returns `MetadataError::NotConfigured` if no base URL is configured.
pub fn create_service(config: &Config) -> Result<Arc<dyn MetadataService>, MetadataError> {
    let base_url = config.base_url().ok_or_else(|| {
        MetadataError::NotConfigured(format!(
            "no base URL; set [service].base_url in the config file, {} or --base-url",
            BASE_URL_ENV
        ))
    })?;

    let mut service = DataverseService::new(base_url, config.api_version());
    if let Some(token) = config.bearer_token() {
        service = service.with_bearer_token(token);
    }

    Ok(Arc::new(service))
}

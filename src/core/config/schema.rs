//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order of precedence:
//! 1. `$METASELECT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/metaselect/config.toml`
//! 3. `~/.metaselect/config.toml`
//!
//! # Validation
//!
//! Values are validated after parsing: the base URL must be an absolute
//! http(s) URL and the API version must look like `v9.1`.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [service]
/// base_url = "https://contoso.crm.dynamics.com"
/// api_version = "v9.1"
/// token_env = "METASELECT_TOKEN"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Metadata service settings
    pub service: Option<ServiceConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(service) = &self.service {
            service.validate()?;
        }
        Ok(())
    }
}

/// Metadata service connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Organization root URL (the part before `/api/data`)
    pub base_url: Option<String>,

    /// Web API version segment (default: "v9.1")
    pub api_version: Option<String>,

    /// Environment variable holding a session bearer token
    pub token_env: Option<String>,
}

impl ServiceConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        if let Some(version) = &self.api_version {
            validate_api_version(version)?;
        }
        if let Some(var) = &self.token_env {
            if var.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "token_env must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Check that a base URL is an absolute http(s) URL with a host.
pub fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(base_url).map_err(|e| {
        ConfigError::InvalidValue(format!("invalid base_url '{}': {}", base_url, e))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue(format!(
            "base_url must use http or https; got '{}://'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue(format!(
            "base_url '{}' must include a host",
            base_url
        )));
    }
    Ok(())
}

/// Check that an API version looks like `v<major>.<minor>`.
pub fn validate_api_version(version: &str) -> Result<(), ConfigError> {
    let valid = version
        .strip_prefix('v')
        .and_then(|rest| rest.split_once('.'))
        .map(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid api_version '{}', expected something like 'v9.1'",
            version
        )))
    }
}

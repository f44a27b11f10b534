//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. `METASELECT_BASE_URL` environment variable
//! 4. CLI flags (applied through [`Config::with_base_url`])
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$METASELECT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/metaselect/config.toml`
//! 3. `~/.metaselect/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use metaselect::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! if let Some(url) = config.base_url() {
//!     println!("Metadata service: {}/api/data/{}", url, config.api_version());
//! }
//! ```

pub mod schema;

pub use schema::{FileConfig, ServiceConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "METASELECT_CONFIG";

/// Environment variable overriding the service base URL.
pub const BASE_URL_ENV: &str = "METASELECT_BASE_URL";

/// Default Web API version segment.
pub const DEFAULT_API_VERSION: &str = "v9.1";

/// Default environment variable holding a session bearer token.
pub const DEFAULT_TOKEN_ENV: &str = "METASELECT_TOKEN";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Effective configuration after applying precedence.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file contents (defaults if no file was found)
    pub file: FileConfig,
    /// Base URL taken from the environment or a CLI flag
    base_url_override: Option<String>,
    /// Path to the loaded config file (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or if a
    /// configured value is invalid. Missing files are not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path)?,
            None => Config::default(),
        };
        config.with_env_overrides()
    }

    /// Apply `METASELECT_BASE_URL`, if set, over the file's base URL.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => self.with_base_url(url),
            _ => Ok(self),
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// The environment is not consulted; chain [`Config::with_env_overrides`]
    /// for that.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let file = Self::read_config(path)?;
        file.validate()?;
        Ok(Config {
            file,
            base_url_override: None,
            path: Some(path.to_path_buf()),
        })
    }

    /// Override the base URL (environment or CLI flag).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        schema::validate_base_url(&url)?;
        self.base_url_override = Some(url);
        Ok(self)
    }

    /// Locate the config file, if any.
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check $METASELECT_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/metaselect/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("metaselect/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.metaselect/config.toml
        let path = dirs::home_dir()?.join(".metaselect/config.toml");
        path.exists().then_some(path)
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the organization base URL, without a trailing slash.
    ///
    /// Returns `None` if not configured anywhere.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url_override
            .as_deref()
            .or_else(|| self.service().and_then(|s| s.base_url.as_deref()))
            .map(|url| url.trim_end_matches('/'))
    }

    /// Get the Web API version segment.
    ///
    /// Defaults to "v9.1" if not configured.
    pub fn api_version(&self) -> &str {
        self.service()
            .and_then(|s| s.api_version.as_deref())
            .unwrap_or(DEFAULT_API_VERSION)
    }

    /// Get the name of the environment variable holding a bearer token.
    ///
    /// Defaults to "METASELECT_TOKEN" if not configured.
    pub fn token_env(&self) -> &str {
        self.service()
            .and_then(|s| s.token_env.as_deref())
            .unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Read the session bearer token from the environment, if present.
    pub fn bearer_token(&self) -> Option<String> {
        std::env::var(self.token_env())
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn service(&self) -> Option<&ServiceConfig> {
        self.file.service.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests touching process environment run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::default();
        assert!(config.base_url().is_none());
        assert_eq!(config.api_version(), "v9.1");
        assert_eq!(config.token_env(), "METASELECT_TOKEN");
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            [service]
            base_url = "https://contoso.crm.dynamics.com/"
            api_version = "v9.2"
            "#,
        );

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.base_url(), Some("https://contoso.crm.dynamics.com"));
        assert_eq!(config.api_version(), "v9.2");
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            [service]
            api_version = "latest"
            "#,
        );

        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unparseable_file_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "[service\nbase_url = ");

        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from_path(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn override_takes_precedence() {
        let config = Config {
            file: FileConfig {
                service: Some(ServiceConfig {
                    base_url: Some("https://file.example.com".to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }
        .with_base_url("http://localhost:9000")
        .unwrap();

        assert_eq!(config.base_url(), Some("http://localhost:9000"));
    }

    #[test]
    fn override_validated() {
        assert!(Config::default().with_base_url("not a url").is_err());
    }

    #[test]
    fn load_uses_env_locations() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            [service]
            base_url = "https://file.example.com"
            "#,
        );

        std::env::set_var(CONFIG_ENV, &path);
        std::env::set_var(BASE_URL_ENV, "https://env.example.com");

        let config = Config::load().unwrap();

        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(BASE_URL_ENV);

        assert_eq!(config.loaded_from(), Some(path.as_path()));
        assert_eq!(config.base_url(), Some("https://env.example.com"));
    }

    #[test]
    fn env_override_applies_to_explicit_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            [service]
            base_url = "https://file.example.com"
            "#,
        );

        std::env::set_var(BASE_URL_ENV, "https://env.example.com");
        let plain = Config::load_from_path(&path).unwrap();
        let overridden = Config::load_from_path(&path).unwrap().with_env_overrides();
        std::env::remove_var(BASE_URL_ENV);

        assert_eq!(plain.base_url(), Some("https://file.example.com"));
        let overridden = overridden.unwrap();
        assert_eq!(overridden.base_url(), Some("https://env.example.com"));
        assert_eq!(overridden.loaded_from(), Some(path.as_path()));

        // A flag given after the environment wins.
        let flagged = overridden.with_base_url("http://localhost:9000").unwrap();
        assert_eq!(flagged.base_url(), Some("http://localhost:9000"));
    }

    #[test]
    fn blank_env_override_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(BASE_URL_ENV, "  ");
        let config = Config::default().with_env_overrides();
        std::env::remove_var(BASE_URL_ENV);

        assert!(config.unwrap().base_url().is_none());
    }

    #[test]
    fn bearer_token_read_from_configured_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config {
            file: FileConfig {
                service: Some(ServiceConfig {
                    token_env: Some("METASELECT_TEST_TOKEN_VAR".to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        };

        std::env::set_var("METASELECT_TEST_TOKEN_VAR", "session-token");
        let token = config.bearer_token();
        std::env::remove_var("METASELECT_TEST_TOKEN_VAR");

        assert_eq!(token.as_deref(), Some("session-token"));
        assert!(config.bearer_token().is_none());
    }
}

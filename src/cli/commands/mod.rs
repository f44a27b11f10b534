//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! `resolve` talks to the metadata service and is async. Like every async
//! handler here it builds its own `tokio` runtime and blocks on it, so
//! dispatch stays synchronous.

mod completion;
mod kinds;
mod resolve;

pub use completion::completion;
pub use kinds::kinds;
pub use resolve::{host_context, resolve};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Settings shared by every command, taken from the global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub verbosity: Verbosity,
    pub json: bool,
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Base URL from `--base-url`
    pub base_url: Option<String>,
}

impl Context {
    /// Load configuration, honoring `--config` and `--base-url`.
    ///
    /// Precedence for the base URL: `--base-url`, then
    /// `METASELECT_BASE_URL`, then the config file.
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from_path(path)
                .and_then(Config::with_env_overrides)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load().context("Failed to load config")?,
        };

        match &self.base_url {
            Some(url) => Ok(config.with_base_url(url.as_str()).context("Invalid --base-url")?),
            None => Ok(config),
        }
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Kinds => kinds::kinds(ctx),
        Command::Resolve(args) => resolve::resolve(ctx, &args),
        Command::Completion { shell } => completion::completion(shell),
    }
}

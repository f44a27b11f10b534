//! cli
//!
//! Command-line interface for metaselect.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and drives a
//! [`crate::host::HostAdapter`] exactly as a hosting runtime would, so what
//! the CLI prints is what a control would show.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};
pub use commands::Context;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let ctx = Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        json: cli.json,
        config: cli.config.clone(),
        base_url: cli.base_url.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Send diagnostics to stderr.
///
/// `RUST_LOG` sets the filter (default `warn`); `--debug` forces `debug`.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

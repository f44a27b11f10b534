//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//! - `--config <path>`: Read this config file instead of searching
//! - `--base-url <url>`: Organization root URL, overriding config

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::selector::SelectorKind;

/// metaselect - Resolve Dataverse metadata the way selector controls do
#[derive(Parser, Debug)]
#[command(name = "metaselect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to load instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Organization root URL (overrides config and environment)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the selector kinds and their host bindings
    #[command(
        name = "kinds",
        long_about = "List every selector kind.\n\n\
            Shows each kind's cardinality, the host parameter it binds, the \
            parameters that make up its scope, and its placeholder text."
    )]
    Kinds,

    /// Resolve a selector's options against the metadata service
    #[command(
        name = "resolve",
        long_about = "Resolve the options a selector would offer.\n\n\
            Drives one selector the way a host does: initialize with the given \
            value, render, wait for the metadata request, and render again. \
            Prints the options, the reconciled display text, and the bound \
            outputs. Service failures show up as an empty list with status \
            'failed', never as a command error.",
        after_help = "\
EXAMPLES:
    # Attributes of the account entity
    metaselect resolve attribute --entity account

    # What would a stored value display as?
    metaselect resolve form --entity account --value 8448b78f-8f42-454e-8e2a-f8196b0419af

    # Lookups on contact that point at account
    metaselect resolve related-attribute --form-entity contact --query-entity account

    # Activity entities only, as JSON
    metaselect --json resolve entity --activities-only Yes

    # Simulate picking an option and show the resulting outputs
    metaselect resolve model-driven-app --select <appmoduleid>"
    )]
    Resolve(ResolveArgs),

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion.",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    metaselect completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    metaselect completion zsh >> ~/.zshrc

    # Fish
    metaselect completion fish > ~/.config/fish/completions/metaselect.fish

    # PowerShell
    metaselect completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `resolve`.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Selector kind (see `metaselect kinds`)
    pub kind: SelectorKind,

    /// Entity logical name (attribute, form, and view kinds)
    #[arg(long)]
    pub entity: Option<String>,

    /// Entity whose lookups are listed (related-attribute)
    #[arg(long)]
    pub form_entity: Option<String>,

    /// Entity the lookups must target (related-attribute)
    #[arg(long)]
    pub query_entity: Option<String>,

    /// Activities-only flag; anything but "All" restricts (entity kinds)
    #[arg(long, value_name = "FLAG")]
    pub activities_only: Option<String>,

    /// Supports-activities flag; anything but "All" restricts (entity kinds)
    #[arg(long, value_name = "FLAG")]
    pub supports_activities: Option<String>,

    /// Current bound value (`;`-separated for collection kinds)
    #[arg(long)]
    pub value: Option<String>,

    /// Select this value after loading and report the new outputs
    #[arg(long, value_name = "VALUE")]
    pub select: Option<String>,

    /// Render the control as disabled by the host
    #[arg(long)]
    pub disabled: bool,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

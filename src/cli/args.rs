//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// rigup - Idempotent workstation provisioning.
#[derive(Debug, Parser)]
#[command(name = "rigup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (skips discovery of ~/.rigup and ./.rigup)
    #[arg(short, long, global = true, env = "RIGUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to discover project config in (overrides current directory)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Stream command output instead of showing spinners
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

use super::commands::cache::CacheArgs;

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the provisioning steps (default if no command specified)
    Run(RunArgs),

    /// Show which steps are already done and which would run
    Status(StatusArgs),

    /// Write a starter configuration
    Init(InitArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Manage the download cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Run only specified steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip specified steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Evaluate probes and report what would run, without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; omit steps that need a terminal
    #[arg(long)]
    pub non_interactive: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not run `gh auth login`
    #[arg(long, env = "RIGUP_SKIP_GITHUB_LOGIN")]
    pub skip_github_login: bool,

    /// Do not generate an SSH key
    #[arg(long = "skip-ssh-key", env = "RIGUP_SKIP_SSH_KEY")]
    pub skip_ssh_key_generation: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show status for specific step
    #[arg(long)]
    pub step: Option<String>,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Where to write the config (default: ~/.rigup/config.yml)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Write a minimal config with a single example step
    #[arg(long)]
    pub minimal: bool,

    /// Overwrite existing configuration
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the JSON schema of the config file instead
    #[arg(long, conflicts_with = "json")]
    pub schema: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

//! Cache command implementation.
//!
//! Provides `rigup cache list`, `rigup cache clear`, `rigup cache remove`
//! and `rigup cache path`.

use clap::{Args, Subcommand};

use crate::cache::CacheStore;
use crate::error::Result;
use crate::ui::{format_relative_time, format_size, Prompt, PromptResult, UserInterface};

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display::print_json;

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached downloads.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete every cached download.
    Clear {
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
    /// Delete the cached download for one URL.
    Remove {
        /// URL the artifact was downloaded from.
        url: String,
    },
    /// Print the cache directory.
    Path,
}

/// The cache command implementation.
pub struct CacheCommand {
    workspace: Workspace,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(workspace: Workspace, args: CacheArgs) -> Self {
        Self { workspace, args }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.workspace.load_config()?;
        let store = self.workspace.cache(&config);

        match &self.args.command {
            CacheSubcommand::List { json } => list_cache(&store, *json, ui)?,
            CacheSubcommand::Clear { force } => clear_cache(&store, *force, ui)?,
            CacheSubcommand::Remove { url } => {
                if store.remove(url)? {
                    ui.success(&format!("Removed {}", url));
                } else {
                    ui.warning(&format!("Not cached: {}", url));
                }
            }
            CacheSubcommand::Path => println!("{}", store.root().display()),
        }

        Ok(CommandResult::success())
    }
}

fn list_cache(store: &CacheStore, json: bool, ui: &mut dyn UserInterface) -> Result<()> {
    let artifacts = store.list()?;

    if json {
        print_json(&artifacts)?;
        return Ok(());
    }

    if artifacts.is_empty() {
        ui.message("Cache is empty");
        return Ok(());
    }

    ui.message(&format!("{} cached downloads:\n", artifacts.len()));
    for artifact in &artifacts {
        let name = artifact
            .filepath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let age = artifact
            .metadata
            .as_ref()
            .map(|m| format_relative_time(m.cached_at))
            .unwrap_or_else(|| "unknown age".to_string());

        ui.message(&format!(
            "  {}  {}  {}",
            name,
            format_size(artifact.size_bytes),
            age
        ));
        if let Some(meta) = &artifact.metadata {
            ui.message(&format!("    {}", meta.url));
        }
    }

    let total: u64 = artifacts.iter().map(|a| a.size_bytes).sum();
    ui.message(&format!(
        "\nTotal: {} in {}",
        format_size(total),
        store.root().display()
    ));
    Ok(())
}

fn clear_cache(store: &CacheStore, force: bool, ui: &mut dyn UserInterface) -> Result<()> {
    let count = store.list()?.len();
    if count == 0 {
        ui.message("Cache is already empty");
        return Ok(());
    }

    if !force && ui.is_interactive() {
        let prompt = Prompt::confirm("clear_cache", format!("Delete {} cached downloads?", count))
            .with_default("false");

        if ui.prompt(&prompt)? != PromptResult::Bool(true) {
            ui.message("Cancelled");
            return Ok(());
        }
    }

    let cleared = store.clear()?;
    ui.success(&format!("Cleared {} downloads", cleared));
    Ok(())
}

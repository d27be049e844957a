//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`Workspace`] for the directories and config every command resolves
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cache::CacheStore;
use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::{load_config, validate, RigupConfig};
use crate::error::{Result, RigupError};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command looks for configuration and the user's home.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory searched for `.rigup/config.yml`.
    pub dir: PathBuf,
    /// Home directory; `~` in configured paths expands to this.
    pub home: PathBuf,
    /// Explicit `--config` file, bypassing discovery.
    pub config_path: Option<PathBuf>,
}

impl Workspace {
    /// Create a workspace.
    pub fn new(dir: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            home: home.into(),
            config_path: None,
        }
    }

    /// Use exactly this config file.
    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Load, merge and validate the configuration.
    pub fn load_config(&self) -> Result<RigupConfig> {
        let config = load_config(&self.dir, Some(&self.home), self.config_path.as_deref())?;
        validate(&config)?;
        Ok(config)
    }

    /// The download cache configured for this workspace.
    pub fn cache(&self, config: &RigupConfig) -> CacheStore {
        CacheStore::new(config.settings.cache_dir(&self.home))
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    workspace: Workspace,
}

impl CommandDispatcher {
    /// Create a dispatcher from the global CLI flags.
    ///
    /// Fails if no home directory can be determined.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            RigupError::Other(anyhow::anyhow!("could not determine the home directory"))
        })?;
        let dir = match &cli.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        Ok(Self::new(
            Workspace::new(dir, home).with_config(cli.config.clone()),
        ))
    }

    /// Create a new dispatcher for the given workspace.
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// The workspace commands run against.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ws = self.workspace.clone();
        match &cli.command {
            Some(Commands::Run(args)) => super::run::RunCommand::new(ws, args.clone()).execute(ui),
            Some(Commands::Status(args)) => {
                super::status::StatusCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Init(args)) => {
                super::init::InitCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Config(args)) => {
                super::config::ConfigCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Cache(args)) => {
                super::cache::CacheCommand::new(ws, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::run::RunCommand::new(ws, RunArgs::default()).execute(ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn workspace_without_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path().join("project"), temp.path());

        let config = ws.load_config().unwrap();
        assert!(config.steps.is_empty());
        assert!(ws
            .cache(&config)
            .root()
            .ends_with(Path::new("rigup/downloads")));
    }

    #[test]
    fn workspace_cache_dir_expands_home() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("c.yml");
        fs::write(&config_path, "settings:\n  cache_dir: ~/cache\n").unwrap();

        let ws = Workspace::new(temp.path(), temp.path()).with_config(Some(config_path));
        let config = ws.load_config().unwrap();

        assert_eq!(ws.cache(&config).root(), temp.path().join("cache"));
    }

    #[test]
    fn workspace_rejects_invalid_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("c.yml");
        fs::write(
            &config_path,
            "steps:\n  - name: empty\n    action:\n      install_packages: []\n",
        )
        .unwrap();

        let ws = Workspace::new(temp.path(), temp.path()).with_config(Some(config_path));
        let err = ws.load_config().unwrap_err();
        assert!(err.is_config_error());
    }
}

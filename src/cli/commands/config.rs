//! Config command implementation.
//!
//! The `rigup config` command shows the resolved configuration, or the JSON
//! schema of the config file format.

use crate::cli::args::ConfigArgs;
use crate::config::{ConfigPaths, RigupConfig};
use crate::error::{Result, RigupError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display::print_json;

/// The config command implementation.
pub struct ConfigCommand {
    workspace: Workspace,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(workspace: Workspace, args: ConfigArgs) -> Self {
        Self { workspace, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }

    /// Config files that contributed, in merge order.
    fn sources(&self) -> Vec<String> {
        match &self.workspace.config_path {
            Some(path) => vec![path.display().to_string()],
            None => ConfigPaths::discover(&self.workspace.dir, Some(&self.workspace.home))
                .all_existing()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.schema {
            print_json(&schemars::schema_for!(RigupConfig))?;
            return Ok(CommandResult::success());
        }

        let config = self.workspace.load_config()?;

        if self.args.json {
            print_json(&config)?;
            return Ok(CommandResult::success());
        }

        let sources = self.sources();
        if sources.is_empty() {
            ui.message("# no config files found; showing defaults");
        }
        for source in &sources {
            ui.message(&format!("# {}", source));
        }
        ui.message("");

        let yaml = serde_yaml::to_string(&config).map_err(|e| RigupError::Other(e.into()))?;
        ui.message(&yaml);

        Ok(CommandResult::success())
    }
}

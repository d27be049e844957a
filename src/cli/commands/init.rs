//! Init command implementation.
//!
//! The `rigup init` command writes a starter configuration embedded in the
//! binary.

use include_dir::{include_dir, Dir};
use std::fs;
use std::path::PathBuf;

use crate::cli::args::InitArgs;
use crate::config::{parse_config, user_config_path};
use crate::error::{Result, RigupError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};

/// Starter configurations embedded at compile time.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Contents of an embedded template.
pub fn template(name: &str) -> Result<&'static str> {
    let file = TEMPLATES_DIR
        .get_file(name)
        .ok_or_else(|| RigupError::ConfigNotFound {
            path: PathBuf::from("templates").join(name),
        })?;

    file.contents_utf8()
        .ok_or_else(|| RigupError::ConfigParseError {
            path: PathBuf::from("templates").join(name),
            message: "Invalid UTF-8".to_string(),
        })
}

/// The init command implementation.
pub struct InitCommand {
    workspace: Workspace,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(workspace: Workspace, args: InitArgs) -> Self {
        Self { workspace, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &InitArgs {
        &self.args
    }

    /// Where the config will be written.
    pub fn target(&self) -> PathBuf {
        self.args
            .path
            .clone()
            .unwrap_or_else(|| user_config_path(&self.workspace.home))
    }

    fn template_name(&self) -> &'static str {
        if self.args.minimal {
            "minimal.yml"
        } else {
            "config.yml"
        }
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target = self.target();

        if target.exists() && !self.args.force {
            ui.error(&format!(
                "Configuration already exists at {}",
                target.display()
            ));
            ui.show_hint("Use --force to overwrite");
            return Ok(CommandResult::failure(1));
        }

        let name = self.template_name();
        let content = template(name)?;
        parse_config(content, &target)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content).map_err(|e| RigupError::FileWrite {
            path: target.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!("Wrote {} to {}", name, target.display());
        ui.success(&format!("Created {}", target.display()));
        ui.show_hint("Edit the steps, then run `rigup status` to see what would run");

        Ok(CommandResult::success())
    }
}

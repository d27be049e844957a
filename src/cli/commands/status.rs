//! Status command implementation.
//!
//! The `rigup status` command evaluates every probe and shows which steps
//! are already done. Nothing is executed.

use crate::cli::args::StatusArgs;
use crate::error::{Result, RigupError};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::host::{Host, LocalHost};
use crate::runner::Runner;
use crate::steps::{build_plan, ExecutionContext};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display::{print_json, show_previews};

/// The status command implementation.
pub struct StatusCommand {
    workspace: Workspace,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(workspace: Workspace, args: StatusArgs) -> Self {
        Self { workspace, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }

    /// Evaluate probes against an explicit host.
    pub fn execute_with(
        &self,
        host: &dyn Host,
        fetcher: &dyn Fetcher,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let config = self.workspace.load_config()?;
        let home = &self.workspace.home;
        let cache = self.workspace.cache(&config);

        let mut steps = build_plan(&config, &cache, home);
        if let Some(name) = &self.args.step {
            steps.retain(|s| &s.name == name);
            if steps.is_empty() {
                return Err(RigupError::UnknownStep { name: name.clone() });
            }
        }

        let ctx = ExecutionContext::new(host, &cache, fetcher, home.clone());
        let previews = Runner::new(steps).preview(&ctx);

        if self.args.json {
            print_json(&previews)?;
        } else {
            ui.show_header("rigup status");
            show_previews(ui, &previews);
        }

        Ok(CommandResult::success())
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = LocalHost::new();
        let fetcher = HttpFetcher::new()?;
        self.execute_with(&host, &fetcher, ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;
    use crate::ui::MockUI;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    struct NoNetwork;

    impl Fetcher for NoNetwork {
        fn fetch_to(&self, url: &str, _sink: &mut dyn Write) -> anyhow::Result<u64> {
            anyhow::bail!("offline: {}", url)
        }
    }

    fn workspace(temp: &TempDir) -> Workspace {
        let path = temp.path().join("config.yml");
        fs::write(
            &path,
            r#"
settings:
  skip_github_login: true
  skip_ssh_key_generation: true
steps:
  - name: curl
    action:
      install_packages: [curl]
  - name: jq
    action:
      install_packages: [jq]
"#,
        )
        .unwrap();
        Workspace::new(temp.path(), temp.path()).with_config(Some(path))
    }

    #[test]
    fn shows_done_and_pending() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().with_installed(&["curl"]);
        let mut ui = MockUI::new();

        let result = StatusCommand::new(workspace(&temp), StatusArgs::default())
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.skips(), ["curl - already done"]);
        assert!(ui.messages().iter().any(|m| m.contains("jq - would install jq")));
        assert!(host.calls().is_empty());
    }

    #[test]
    fn single_step_filter() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let mut ui = MockUI::new();
        let args = StatusArgs {
            step: Some("jq".into()),
            ..Default::default()
        };

        StatusCommand::new(workspace(&temp), args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert!(ui.messages().iter().any(|m| m.contains("1 of 1 steps would run")));
    }

    #[test]
    fn unknown_step_is_an_error() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let mut ui = MockUI::new();
        let args = StatusArgs {
            step: Some("nope".into()),
            ..Default::default()
        };

        let err = StatusCommand::new(workspace(&temp), args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap_err();

        assert!(matches!(err, RigupError::UnknownStep { .. }));
    }
}

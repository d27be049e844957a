//! Run command implementation.
//!
//! The `rigup run` command builds the step plan from configuration and
//! executes it.

use crate::cli::args::RunArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::host::{Host, LocalHost};
use crate::runner::{Runner, StepPreview};
use crate::steps::{build_plan, filter_steps, missing_identity, ExecutionContext, Step};
use crate::ui::{OutputMode, Prompt, UserInterface};

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display::{print_json, show_previews};

/// The run command implementation.
pub struct RunCommand {
    workspace: Workspace,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(workspace: Workspace, args: RunArgs) -> Self {
        Self { workspace, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Run against an explicit host and fetcher.
    pub fn execute_with(
        &self,
        host: &dyn Host,
        fetcher: &dyn Fetcher,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let mut config = self.workspace.load_config()?;
        self.apply_overrides(&mut config.settings, ui);

        // previews and JSON output must not stop for questions
        let unanswered = if self.args.dry_run || self.args.json {
            missing_identity(&config.settings)
        } else {
            fill_identity(&mut config.settings, ui)
        };

        let home = &self.workspace.home;
        let cache = self.workspace.cache(&config);
        let steps = build_plan(&config, &cache, home);
        let steps = filter_steps(steps, &self.args.only, &self.args.skip)?;
        let steps = drop_interactive(steps, ui);

        let ctx = ExecutionContext::new(host, &cache, fetcher, home.clone())
            .with_work_dir(Some(config.settings.download_dir(home)))
            .with_capture_output(!ui.output_mode().shows_command_output());

        let mut runner = Runner::new(steps);

        if self.args.dry_run {
            return self.dry_run(&runner, &ctx, &unanswered, ui);
        }

        if self.args.json {
            for (step, key) in unanswered.iter().filter(|(step, _)| self.selects(step)) {
                ui.warning(&unconfigured(key, step));
            }
            let report = runner.run(&ctx);
            print_json(&report)?;
            return Ok(exit_result(report.exit_code()));
        }

        ui.show_header(&format!("rigup · {} steps", runner.steps().len()));
        let report = runner.run_with_ui(&ctx, ui);
        Ok(exit_result(report.exit_code()))
    }

    /// CLI flags and the `verbose` setting on top of the loaded settings.
    fn apply_overrides(&self, settings: &mut Settings, ui: &mut dyn UserInterface) {
        settings.skip_github_login |= self.args.skip_github_login;
        settings.skip_ssh_key_generation |= self.args.skip_ssh_key_generation;

        if settings.verbose && ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(OutputMode::Verbose);
        }
    }

    fn dry_run(
        &self,
        runner: &Runner,
        ctx: &ExecutionContext<'_>,
        unanswered: &[(&'static str, &'static str)],
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let mut previews = runner.preview(ctx);
        previews.extend(
            unanswered
                .iter()
                .filter(|(step, _)| self.selects(step))
                .map(|(step, key)| StepPreview {
                    name: step.to_string(),
                    satisfied: false,
                    action: format!("ask for {}", key),
                    probe: format!("{} configured", key),
                    critical: false,
                }),
        );

        if self.args.json {
            print_json(&previews)?;
        } else {
            ui.show_header("rigup (dry run)");
            show_previews(ui, &previews);
        }

        Ok(CommandResult::success())
    }

    /// Whether `--only`/`--skip` keep a step by this name.
    fn selects(&self, step: &str) -> bool {
        let step = step.to_string();
        (self.args.only.is_empty() || self.args.only.contains(&step))
            && !self.args.skip.contains(&step)
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = LocalHost::new();
        let fetcher = HttpFetcher::new()?;
        self.execute_with(&host, &fetcher, ui)
    }
}

fn exit_result(code: i32) -> CommandResult {
    if code == 0 {
        CommandResult::success()
    } else {
        CommandResult::failure(code)
    }
}

fn unconfigured(key: &str, step: &str) -> String {
    format!("{} is not configured; skipping '{}'", key, step)
}

/// Ask for missing git identity; without an answer the step is left out.
///
/// Returns the identity settings that are still missing.
fn fill_identity(
    settings: &mut Settings,
    ui: &mut dyn UserInterface,
) -> Vec<(&'static str, &'static str)> {
    let mut unanswered = Vec::new();
    for (step, key) in missing_identity(settings) {
        let question = match key {
            "git_user_name" => "Full name for git commits",
            _ => "Email address for git commits",
        };

        let answer = ui
            .prompt(&Prompt::input(key, question))
            .map(|r| r.as_string())
            .unwrap_or_default();

        if answer.trim().is_empty() {
            ui.warning(&unconfigured(key, step));
            unanswered.push((step, key));
            continue;
        }

        match key {
            "git_user_name" => settings.git_user_name = Some(answer),
            _ => settings.git_user_email = Some(answer),
        }
    }
    unanswered
}

/// Steps that need a terminal cannot run without one.
fn drop_interactive(steps: Vec<Step>, ui: &mut dyn UserInterface) -> Vec<Step> {
    if ui.is_interactive() {
        return steps;
    }

    steps
        .into_iter()
        .filter(|step| {
            if step.is_interactive() {
                ui.warning(&format!(
                    "Skipping '{}': needs an interactive terminal",
                    step.name
                ));
                false
            } else {
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;
    use crate::ui::MockUI;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    struct NoNetwork;

    impl Fetcher for NoNetwork {
        fn fetch_to(&self, url: &str, _sink: &mut dyn Write) -> anyhow::Result<u64> {
            anyhow::bail!("offline: {}", url)
        }
    }

    const CONFIG: &str = r#"
settings:
  cache_dir: ~/cache
  skip_github_login: true
  skip_ssh_key_generation: true
steps:
  - name: base packages
    action:
      install_packages: [curl, git]
  - name: gh
    critical: true
    action:
      install_packages: [gh]
"#;

    fn workspace(temp: &Path, config: &str) -> Workspace {
        let path = temp.join("config.yml");
        fs::write(&path, config).unwrap();
        Workspace::new(temp, temp).with_config(Some(path))
    }

    #[test]
    fn runs_then_skips() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new();
        let mut ui = MockUI::new();
        ui.set_prompt_response("git_user_name", "Ada Lovelace");
        ui.set_prompt_response("git_user_email", "ada@example.com");

        let cmd = RunCommand::new(ws, RunArgs::default());
        let first = cmd.execute_with(&host, &NoNetwork, &mut ui).unwrap();
        assert!(first.success);
        assert_eq!(host.git_config("user.name").as_deref(), Some("Ada Lovelace"));

        let mut ui = MockUI::new();
        ui.set_prompt_response("git_user_name", "Ada Lovelace");
        ui.set_prompt_response("git_user_email", "ada@example.com");
        cmd.execute_with(&host, &NoNetwork, &mut ui).unwrap();

        assert!(ui.has_success("0 ran, 4 skipped, 0 failed"));
    }

    #[test]
    fn unanswered_identity_is_skipped_with_warning() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new();
        let mut ui = MockUI::new();

        let cmd = RunCommand::new(ws, RunArgs::default());
        cmd.execute_with(&host, &NoNetwork, &mut ui).unwrap();

        assert!(ui.has_warning("git_user_name is not configured"));
        assert!(ui.has_warning("git_user_email is not configured"));
        assert!(host.git_config("user.name").is_none());
    }

    #[test]
    fn critical_failure_exits_one() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new().fail_on("install:gh");
        let mut ui = MockUI::new();

        let args = RunArgs {
            only: vec!["base packages".into(), "gh".into()],
            ..Default::default()
        };
        let result = RunCommand::new(ws, args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Aborted"));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new().with_installed(&["curl", "git"]);
        let mut ui = MockUI::new();

        let args = RunArgs {
            dry_run: true,
            ..Default::default()
        };
        let result = RunCommand::new(ws, args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(host.calls().is_empty());
        assert!(ui.skips().iter().any(|s| s.contains("base packages")));
        assert!(ui.messages().iter().any(|m| m.contains("gh - would install gh")));
    }

    #[test]
    fn dry_run_previews_identity_without_asking() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new();
        let mut ui = MockUI::new();
        ui.set_prompt_response("git_user_name", "Ada Lovelace");

        let args = RunArgs {
            dry_run: true,
            ..Default::default()
        };
        RunCommand::new(ws, args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert!(ui.prompts_shown().is_empty());
        assert!(ui
            .messages()
            .iter()
            .any(|m| m.contains("git user.name - would ask for git_user_name")));
        assert!(ui.messages().iter().any(|m| m.contains("4 of 4 steps would run")));
    }

    #[test]
    fn json_run_never_asks() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new();
        let mut ui = MockUI::new();
        ui.set_prompt_response("git_user_name", "Ada Lovelace");

        let args = RunArgs {
            json: true,
            ..Default::default()
        };
        let result = RunCommand::new(ws, args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.prompts_shown().is_empty());
        assert!(ui.has_warning("git_user_name is not configured"));
        assert!(host.git_config("user.name").is_none());
    }

    #[test]
    fn unknown_only_name_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), CONFIG);
        let host = MockHost::new();
        let mut ui = MockUI::new();

        let args = RunArgs {
            only: vec!["nope".into()],
            ..Default::default()
        };
        let err = RunCommand::new(ws, args)
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap_err();

        assert!(err.is_config_error());
    }

    #[test]
    fn github_login_dropped_without_terminal() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), "settings:\n  skip_ssh_key_generation: true\n");
        let host = MockHost::new();
        let mut ui = MockUI::new();

        RunCommand::new(ws, RunArgs::default())
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert!(ui.has_warning("Skipping 'github login'"));
        assert!(!host.calls().iter().any(|c| c.starts_with("gh auth login")));
    }

    #[test]
    fn verbose_setting_switches_output_mode() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(
            temp.path(),
            "settings:\n  verbose: true\n  skip_github_login: true\n  skip_ssh_key_generation: true\n",
        );
        let host = MockHost::new();
        let mut ui = MockUI::new();

        RunCommand::new(ws, RunArgs::default())
            .execute_with(&host, &NoNetwork, &mut ui)
            .unwrap();

        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }
}

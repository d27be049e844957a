//! Sequential step execution.

use serde::Serialize;
use std::time::Instant;

use tracing::{info, warn};

use crate::steps::{ExecutionContext, Outcome, Step};
use crate::ui::{format_duration, UserInterface};

use super::report::{RunReport, RunState};

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        step: &'a Step,
        index: usize,
        total: usize,
    },
    /// A step finished.
    StepFinished {
        step: &'a Step,
        outcome: &'a Outcome,
        elapsed: std::time::Duration,
    },
}

/// What a step would do, without doing it.
#[derive(Debug, Clone, Serialize)]
pub struct StepPreview {
    /// Step name.
    pub name: String,
    /// The probe already holds; the step would be skipped.
    pub satisfied: bool,
    /// Human-readable action.
    pub action: String,
    /// Human-readable probe.
    pub probe: String,
    /// A failure would abort the run.
    pub critical: bool,
}

/// Executes an ordered list of steps.
///
/// The runner owns the step list for one invocation. Steps run strictly in
/// order; the first failed critical step aborts the rest.
pub struct Runner {
    steps: Vec<Step>,
    state: RunState,
}

impl Runner {
    /// Create a runner for the given steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            state: RunState::NotStarted,
        }
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Current global state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every step and return the report.
    pub fn run(&mut self, ctx: &ExecutionContext<'_>) -> RunReport {
        self.run_with_progress(ctx, |_| {})
    }

    /// Run every step, reporting progress through a callback.
    pub fn run_with_progress<F>(&mut self, ctx: &ExecutionContext<'_>, mut on_progress: F) -> RunReport
    where
        F: FnMut(RunProgress<'_>),
    {
        let run_start = Instant::now();
        let mut report = RunReport::new();
        let total = self.steps.len();

        self.state = RunState::Running;
        report.state = RunState::Running;

        for (index, step) in self.steps.iter().enumerate() {
            on_progress(RunProgress::StepStarting { step, index, total });

            let start = Instant::now();
            let outcome = step.run(ctx);
            let elapsed = start.elapsed();

            match &outcome {
                Outcome::Ran => {
                    info!("{}: ran ({})", step.name, format_duration(elapsed));
                    if step.requires_relogin() {
                        report.relogin_required = true;
                    }
                }
                Outcome::Skipped => info!("{}: skipped", step.name),
                Outcome::Failed { kind, message } if step.critical => {
                    tracing::error!("{}: {} (critical): {}", step.name, kind, message)
                }
                Outcome::Failed { kind, message } => {
                    warn!("{}: {}: {}", step.name, kind, message)
                }
            }

            on_progress(RunProgress::StepFinished {
                step,
                outcome: &outcome,
                elapsed,
            });

            let abort = outcome.is_failed() && step.critical;
            report.record(step.name.clone(), outcome, elapsed);

            if abort {
                self.state = RunState::Aborted;
                break;
            }
        }

        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }
        report.state = self.state;
        report.elapsed = run_start.elapsed();
        report
    }

    /// Run every step, showing each outcome through the UI.
    ///
    /// Captured steps get a spinner; interactive steps, and every step in
    /// streaming mode, are announced up front and run in the foreground.
    pub fn run_with_ui(
        &mut self,
        ctx: &ExecutionContext<'_>,
        ui: &mut dyn UserInterface,
    ) -> RunReport {
        let mut spinner = None;

        let report = self.run_with_progress(ctx, |event| match event {
            RunProgress::StepStarting { step, .. } => {
                let description = step.action.describe();
                if ctx.capture_output && !step.is_interactive() {
                    spinner = Some(ui.start_spinner(&format!("{} - {}", step.name, description)));
                } else {
                    ui.show_step(&step.name, &description);
                }
            }
            RunProgress::StepFinished {
                step,
                outcome,
                elapsed,
            } => {
                let line = match outcome {
                    Outcome::Ran => format!("{} ({})", step.name, format_duration(elapsed)),
                    Outcome::Skipped => format!("{} - already done", step.name),
                    Outcome::Failed { kind, message } => {
                        format!("{} - {}: {}", step.name, kind, message)
                    }
                };
                match (spinner.take(), outcome) {
                    (Some(mut s), Outcome::Ran) => s.finish_success(&line),
                    (Some(mut s), Outcome::Skipped) => s.finish_skipped(&line),
                    (Some(mut s), Outcome::Failed { .. }) => s.finish_error(&line),
                    (None, Outcome::Ran) => ui.success(&line),
                    (None, Outcome::Skipped) => ui.skipped(&line),
                    (None, Outcome::Failed { .. }) => ui.error(&line),
                }
            }
        });

        ui.show_summary(&report);
        report
    }

    /// Evaluate every probe without running any action.
    pub fn preview(&self, ctx: &ExecutionContext<'_>) -> Vec<StepPreview> {
        self.steps
            .iter()
            .map(|step| StepPreview {
                name: step.name.clone(),
                satisfied: step.is_satisfied(ctx),
                action: step.action.describe(),
                probe: step.probe.to_string(),
                critical: step.critical,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::error::ErrorKind;
    use crate::fetch::Fetcher;
    use crate::host::MockHost;
    use crate::steps::{Action, Probe};
    use crate::ui::MockUI;
    use std::io::Write;
    use tempfile::TempDir;

    struct NoNetwork;

    impl Fetcher for NoNetwork {
        fn fetch_to(&self, url: &str, _sink: &mut dyn Write) -> anyhow::Result<u64> {
            anyhow::bail!("offline: {}", url)
        }
    }

    fn install(name: &str) -> Step {
        Step::new(
            name,
            Probe::PackageInstalled(name.into()),
            Action::InstallPackages(vec![name.into()]),
        )
    }

    fn four_steps(second_critical: bool) -> Vec<Step> {
        vec![
            install("curl"),
            install("broken").with_critical(second_critical),
            install("git"),
            install("jq"),
        ]
    }

    #[test]
    fn empty_runner_completes() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        let mut runner = Runner::new(Vec::new());
        assert_eq!(runner.state(), RunState::NotStarted);

        let report = runner.run(&ctx);
        assert_eq!(runner.state(), RunState::Completed);
        assert!(report.steps.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn critical_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().fail_on("install:broken");
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        let mut runner = Runner::new(four_steps(true));
        let report = runner.run(&ctx);

        assert_eq!(report.state, RunState::Aborted);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].outcome, Outcome::Ran);
        assert!(matches!(
            report.steps[1].outcome,
            Outcome::Failed {
                kind: ErrorKind::PackageManagerError,
                ..
            }
        ));
        assert!(!host.calls().iter().any(|c| c.contains("git")));
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn non_critical_failure_continues() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().fail_on("install:broken");
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        let mut runner = Runner::new(four_steps(false));
        let report = runner.run(&ctx);

        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.steps.len(), 4);
        assert!(report.steps[1].outcome.is_failed());
        assert_eq!(report.steps[2].outcome, Outcome::Ran);
        assert_eq!(report.steps[3].outcome, Outcome::Ran);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn second_run_skips_everything() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());
        let steps = vec![install("curl"), install("git")];

        let first = Runner::new(steps.clone()).run(&ctx);
        let second = Runner::new(steps).run(&ctx);

        assert_eq!(first.counts.ran, 2);
        assert_eq!(second.counts.ran, 0);
        assert_eq!(second.counts.skipped, 2);
    }

    #[test]
    fn group_change_requires_relogin() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().with_user(Some("ada"));
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());
        let step = Step::new(
            "docker group",
            Probe::UserInGroup("docker".into()),
            Action::CreateGroupAndAddUser {
                group: "docker".into(),
                user: None,
            },
        );

        let report = Runner::new(vec![step]).run(&ctx);

        assert_eq!(report.outcomes(), vec![&Outcome::Ran]);
        assert!(report.relogin_required);
    }

    #[test]
    fn progress_events_bracket_each_step() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().with_installed(&["curl"]);
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        let mut events = Vec::new();
        Runner::new(vec![install("curl"), install("git")]).run_with_progress(&ctx, |e| {
            events.push(match e {
                RunProgress::StepStarting { step, index, total } => {
                    format!("start {} {}/{}", step.name, index + 1, total)
                }
                RunProgress::StepFinished { step, outcome, .. } => {
                    format!("end {} {}", step.name, outcome)
                }
            })
        });

        assert_eq!(
            events,
            vec![
                "start curl 1/2",
                "end curl skipped",
                "start git 2/2",
                "end git ran"
            ]
        );
    }

    #[test]
    fn ui_spinners_finish_per_outcome() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new()
            .with_installed(&["curl"])
            .fail_on("install:broken");
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());
        let mut ui = MockUI::new();

        Runner::new(vec![install("curl"), install("broken"), install("git")])
            .run_with_ui(&ctx, &mut ui);

        let finishes = ui.spinner_finishes();
        assert!(finishes[0].starts_with("skip: curl"));
        assert!(finishes[1].starts_with("error: broken - PackageManagerError"));
        assert!(finishes[2].starts_with("ok: git"));
        assert!(ui.has_warning("Finished with failures"));
        assert!(ui.has_error("broken [PackageManagerError]"));
    }

    #[test]
    fn streaming_mode_announces_steps() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path())
            .with_capture_output(false);
        let mut ui = MockUI::new();

        Runner::new(vec![install("curl")]).run_with_ui(&ctx, &mut ui);

        assert!(ui.spinners().is_empty());
        assert_eq!(ui.steps(), ["curl"]);
        assert!(ui.has_success("curl"));
    }

    #[test]
    fn preview_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().with_installed(&["curl"]);
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        let runner = Runner::new(vec![install("curl"), install("git").with_critical(true)]);
        let preview = runner.preview(&ctx);

        assert!(preview[0].satisfied);
        assert!(!preview[1].satisfied);
        assert!(preview[1].critical);
        assert_eq!(preview[1].action, "install git");
        assert!(host.calls().is_empty());
        assert_eq!(runner.state(), RunState::NotStarted);
    }
}

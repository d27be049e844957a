//! A named probe/action pair and the outcome of running it.

use serde::Serialize;
use std::fmt;

use super::action::Action;
use super::context::ExecutionContext;
use super::probe::Probe;
use crate::error::ErrorKind;

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The probe was false and the action succeeded.
    Ran,

    /// The probe was true; the action was not invoked.
    Skipped,

    /// The action failed.
    Failed { kind: ErrorKind, message: String },
}

impl Outcome {
    /// Whether this outcome is a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// Get a display character for this outcome.
    pub fn display_char(&self) -> char {
        match self {
            Outcome::Ran => '✓',
            Outcome::Skipped => '⊘',
            Outcome::Failed { .. } => '✗',
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ran => write!(f, "ran"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Failed { kind, .. } => write!(f, "failed ({})", kind),
        }
    }
}

/// A provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unique, human-readable label.
    pub name: String,

    /// Whether the effect is already present.
    pub probe: Probe,

    /// What establishes the effect.
    pub action: Action,

    /// Abort the run when this step fails.
    pub critical: bool,
}

impl Step {
    /// Create a non-critical step.
    pub fn new(name: impl Into<String>, probe: Probe, action: Action) -> Self {
        Self {
            name: name.into(),
            probe,
            action,
            critical: false,
        }
    }

    /// Set whether a failure aborts the run.
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Evaluate the probe now.
    pub fn is_satisfied(&self, ctx: &ExecutionContext<'_>) -> bool {
        self.probe.evaluate(ctx)
    }

    /// Skip if the probe holds, otherwise run the action.
    pub fn run(&self, ctx: &ExecutionContext<'_>) -> Outcome {
        if self.is_satisfied(ctx) {
            tracing::debug!("Step '{}' already satisfied ({})", self.name, self.probe);
            return Outcome::Skipped;
        }

        tracing::debug!("Step '{}': {}", self.name, self.action.describe());
        match self.action.execute(ctx, None) {
            Ok(_) => Outcome::Ran,
            Err(e) => Outcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }

    /// Whether a new login session is needed for this step's effect to show.
    pub fn requires_relogin(&self) -> bool {
        self.action.changes_groups()
    }

    /// Whether this step talks to the user directly.
    pub fn is_interactive(&self) -> bool {
        self.action.is_interactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::fetch::Fetcher;
    use crate::host::MockHost;
    use std::io::Write;
    use tempfile::TempDir;

    struct NoNetwork;

    impl Fetcher for NoNetwork {
        fn fetch_to(&self, url: &str, _sink: &mut dyn Write) -> anyhow::Result<u64> {
            anyhow::bail!("offline: {}", url)
        }
    }

    fn curl_step() -> Step {
        Step::new(
            "curl",
            Probe::PackageInstalled("curl".into()),
            Action::InstallPackages(vec!["curl".into()]),
        )
    }

    #[test]
    fn runs_when_probe_false() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        assert_eq!(curl_step().run(&ctx), Outcome::Ran);
        assert_eq!(host.calls(), vec!["apt-get install -y curl"]);
    }

    #[test]
    fn skips_without_invoking_action() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new().with_installed(&["curl"]);
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());

        assert_eq!(curl_step().run(&ctx), Outcome::Skipped);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn failure_carries_kind() {
        let temp = TempDir::new().unwrap();
        let host = MockHost::new();
        let cache = CacheStore::new(temp.path().join("cache"));
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());
        let step = Step::new(
            "chrome",
            Probe::Never,
            Action::DownloadAndCache("https://example.com/chrome.deb".into()),
        );

        match step.run(&ctx) {
            Outcome::Failed { kind, message } => {
                assert_eq!(kind, ErrorKind::NetworkError);
                assert!(message.contains("offline"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn probe_is_evaluated_at_run_time() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("marker");
        let host = MockHost::new();
        let cache = CacheStore::new(temp.path());
        let ctx = ExecutionContext::new(&host, &cache, &NoNetwork, temp.path());
        let step = Step::new(
            "marker",
            Probe::PathExists(marker.clone()),
            Action::RunShellSnippet(crate::steps::ShellScript::Inline("true".into())),
        );

        assert_eq!(step.run(&ctx), Outcome::Ran);
        std::fs::write(&marker, "").unwrap();
        assert_eq!(step.run(&ctx), Outcome::Skipped);
    }

    #[test]
    fn critical_defaults_to_false() {
        assert!(!curl_step().critical);
        assert!(curl_step().with_critical(true).critical);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let failed = Outcome::Failed {
            kind: ErrorKind::IoError,
            message: "disk full".into(),
        };
        let json = serde_json::to_value(&failed).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "IoError");
        assert_eq!(serde_json::to_value(Outcome::Ran).unwrap()["status"], "ran");
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Skipped.to_string(), "skipped");
        assert_eq!(
            Outcome::Failed {
                kind: ErrorKind::NetworkError,
                message: String::new()
            }
            .to_string(),
            "failed (NetworkError)"
        );
    }
}

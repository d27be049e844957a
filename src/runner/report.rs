//! The record of one run.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::error::ErrorKind;
use crate::steps::Outcome;

/// Global runner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No step has been attempted yet.
    NotStarted,
    /// Steps are being executed.
    Running,
    /// Every step was attempted.
    Completed,
    /// A critical step failed; later steps were never attempted.
    Aborted,
}

/// Outcome of one step, with its timing.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// What happened.
    pub outcome: Outcome,
    /// How long the step took, probe included.
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

/// Per-outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub ran: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Ordered outcomes of a run, built incrementally by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// One record per attempted step, in order.
    pub steps: Vec<StepRecord>,
    /// Outcome counts.
    pub counts: RunCounts,
    /// Wall-clock time of the whole run.
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// Terminal state of the runner.
    pub state: RunState,
    /// A step changed group membership; a new login session is needed.
    pub relogin_required: bool,
}

impl RunReport {
    /// An empty report starting now.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            steps: Vec::new(),
            counts: RunCounts::default(),
            elapsed: Duration::ZERO,
            state: RunState::NotStarted,
            relogin_required: false,
        }
    }

    /// Append a step outcome.
    pub fn record(&mut self, name: impl Into<String>, outcome: Outcome, duration: Duration) {
        match outcome {
            Outcome::Ran => self.counts.ran += 1,
            Outcome::Skipped => self.counts.skipped += 1,
            Outcome::Failed { .. } => self.counts.failed += 1,
        }
        self.steps.push(StepRecord {
            name: name.into(),
            outcome,
            duration,
        });
    }

    /// Outcomes in step order.
    pub fn outcomes(&self) -> Vec<&Outcome> {
        self.steps.iter().map(|r| &r.outcome).collect()
    }

    /// Failed steps as (name, kind, message).
    pub fn failures(&self) -> Vec<(&str, ErrorKind, &str)> {
        self.steps
            .iter()
            .filter_map(|r| match &r.outcome {
                Outcome::Failed { kind, message } => Some((r.name.as_str(), *kind, message.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Whether the run aborted on a critical failure.
    pub fn is_aborted(&self) -> bool {
        self.state == RunState::Aborted
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        if self.is_aborted() {
            1
        } else {
            0
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

//! Step execution orchestration.

pub mod report;
pub mod workflow;

pub use report::{RunCounts, RunReport, RunState, StepRecord};
pub use workflow::{RunProgress, Runner, StepPreview};

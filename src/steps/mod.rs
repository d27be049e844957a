//! Provisioning steps.
//!
//! This module provides the pieces a run is made of:
//!
//! - [`Probe`] - Side-effect-free "already done?" checks
//! - [`Action`] - The side effect that establishes a step's result
//! - [`Step`] - A named probe/action pair that decides skip vs. run
//! - [`Outcome`] - What happened when a step ran
//! - [`ExecutionContext`] - The host, cache and paths every step sees
//! - [`plan`] - Building the ordered step list from configuration
//!
//! # Example
//!
//! ```
//! use rigup::cache::CacheStore;
//! use rigup::fetch::HttpFetcher;
//! use rigup::host::MockHost;
//! use rigup::steps::{Action, ExecutionContext, Outcome, Probe, Step};
//!
//! let host = MockHost::new();
//! let cache = CacheStore::new(std::env::temp_dir().join("rigup-doc-cache"));
//! let fetcher = HttpFetcher::new().unwrap();
//! let ctx = ExecutionContext::new(&host, &cache, &fetcher, "/home/ada");
//!
//! let step = Step::new(
//!     "curl",
//!     Probe::PackageInstalled("curl".into()),
//!     Action::InstallPackages(vec!["curl".into()]),
//! );
//!
//! assert_eq!(step.run(&ctx), Outcome::Ran);
//! assert_eq!(step.run(&ctx), Outcome::Skipped);
//! ```

pub mod action;
pub mod context;
pub mod plan;
pub mod probe;
pub mod step;

pub use action::{Action, ActionOutput, ShellScript};
pub use context::ExecutionContext;
pub use plan::{build_plan, filter_steps, identity_steps, missing_identity};
pub use probe::Probe;
pub use step::{Outcome, Step};

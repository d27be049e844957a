//! rigup - Idempotent workstation provisioning.
//!
//! rigup runs an ordered list of provisioning steps. Each step pairs a
//! side-effect-free probe ("is this already done?") with an action, so the
//! whole list is safe to re-run after a partial failure.
//!
//! # Modules
//!
//! - [`cache`] - Download cache keyed by URL basename
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - HTTP artifact downloads
//! - [`host`] - The operating-system seam probes and actions go through
//! - [`runner`] - Sequential execution and the run report
//! - [`shell`] - Shell command execution
//! - [`steps`] - Probes, actions, steps and the step plan
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use rigup::cache::CacheStore;
//! use rigup::fetch::HttpFetcher;
//! use rigup::host::MockHost;
//! use rigup::runner::{RunState, Runner};
//! use rigup::steps::{Action, ExecutionContext, Probe, Step};
//!
//! let host = MockHost::new();
//! let cache = CacheStore::new(std::env::temp_dir().join("rigup-lib-doc"));
//! let fetcher = HttpFetcher::new().unwrap();
//! let ctx = ExecutionContext::new(&host, &cache, &fetcher, "/home/ada");
//!
//! let steps = vec![Step::new(
//!     "jq",
//!     Probe::PackageInstalled("jq".into()),
//!     Action::InstallPackages(vec!["jq".into()]),
//! )];
//!
//! let report = Runner::new(steps).run(&ctx);
//! assert_eq!(report.state, RunState::Completed);
//! assert_eq!(report.counts.ran, 1);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{Result, RigupError};

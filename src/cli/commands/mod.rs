//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command receives the same
//! [`Workspace`]: the discovery directory, the home directory and an
//! optional explicit config file.

pub mod cache;
pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod init;
pub mod run;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, Workspace};

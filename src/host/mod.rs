//! The operating-system seam used by probes and actions.
//!
//! Probes and actions never call the package manager, the group database
//! or `sudo` directly; they go through a [`Host`]. [`LocalHost`] talks to
//! the real machine, [`MockHost`] records calls and simulates state so the
//! runner can be exercised without root or network.

pub mod identity;
pub mod local;
pub mod mock;

pub use local::LocalHost;
pub use mock::MockHost;

use crate::error::Result;
use crate::shell::{CommandOptions, CommandResult};
use std::path::{Path, PathBuf};

/// Access to the machine being provisioned.
pub trait Host {
    /// Whether the package database reports `name` as installed.
    fn package_installed(&self, name: &str) -> Result<bool>;

    /// Install packages in a single batched package-manager call.
    fn install_packages(&self, names: &[String], options: &CommandOptions)
        -> Result<CommandResult>;

    /// Install a local package file (e.g. a downloaded `.deb`).
    fn install_package_file(&self, path: &Path, options: &CommandOptions)
        -> Result<CommandResult>;

    /// Refresh the package index.
    fn update_package_index(&self, options: &CommandOptions) -> Result<CommandResult>;

    /// Group names of the current session.
    fn current_groups(&self) -> Result<Vec<String>>;

    /// Login name of the invoking user.
    fn current_user(&self) -> Option<String>;

    /// Create `group` if missing and add `user` to it.
    fn add_user_to_group(
        &self,
        group: &str,
        user: &str,
        options: &CommandOptions,
    ) -> Result<CommandResult>;

    /// Create a directory and its parents through privilege escalation.
    fn create_dir_privileged(&self, path: &Path) -> Result<CommandResult>;

    /// Write a file through privilege escalation.
    fn write_privileged(&self, path: &Path, contents: &str) -> Result<CommandResult>;

    /// Run a shell snippet.
    fn run_shell(&self, script: &str, options: &CommandOptions) -> Result<CommandResult>;

    /// Run a program directly.
    fn run_program(
        &self,
        program: &str,
        args: &[String],
        options: &CommandOptions,
    ) -> Result<CommandResult>;

    /// Run a shell snippet purely as a check: true iff it exits 0.
    fn check(&self, command: &str) -> bool;

    /// Directories searched for executables.
    fn search_path(&self) -> Vec<PathBuf>;

    /// Whether the process already runs as root.
    fn is_elevated(&self) -> bool;
}

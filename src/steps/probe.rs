//! Probes: "is this step's effect already present?"
//!
//! A probe never changes the machine and never fails. Anything that goes
//! wrong while looking (a missing `dpkg-query`, an unreadable file) counts
//! as "not present", so the step's action is attempted instead of being
//! silently skipped.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::context::ExecutionContext;
use crate::shell::{resolve_tool_path, CommandOptions};

/// A side-effect-free check of whether a step's effect already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    /// The package database reports the package installed.
    PackageInstalled(String),

    /// A package source file exists.
    RepoFileExists(PathBuf),

    /// The current session belongs to the group.
    UserInGroup(String),

    /// An executable with this name resolves via the search path.
    CommandOnPath(String),

    /// The path exists.
    PathExists(PathBuf),

    /// The file exists and contains this exact line.
    LineInFile { path: PathBuf, line: String },

    /// `git config --global --get key` prints exactly `value`.
    GitConfigEquals { key: String, value: String },

    /// The shell command exits 0.
    CommandSucceeds(String),

    /// Every probe holds (true when empty).
    All(Vec<Probe>),

    /// At least one probe holds (false when empty).
    Any(Vec<Probe>),

    /// Never holds; the action always runs.
    Never,
}

impl Probe {
    /// Evaluate the probe against the machine right now.
    pub fn evaluate(&self, ctx: &ExecutionContext<'_>) -> bool {
        let present = match self {
            Probe::PackageInstalled(name) => match ctx.host.package_installed(name) {
                Ok(installed) => installed,
                Err(e) => {
                    tracing::debug!("Package query for {} failed: {}", name, e);
                    false
                }
            },
            Probe::RepoFileExists(path) => ctx.resolve(path).is_file(),
            Probe::UserInGroup(group) => match ctx.host.current_groups() {
                Ok(groups) => groups.iter().any(|g| g == group),
                Err(e) => {
                    tracing::debug!("Group lookup failed: {}", e);
                    false
                }
            },
            Probe::CommandOnPath(name) => {
                resolve_tool_path(name, &ctx.host.search_path()).is_some()
            }
            Probe::PathExists(path) => ctx.resolve(path).exists(),
            Probe::LineInFile { path, line } => std::fs::read_to_string(ctx.resolve(path))
                .map(|contents| contents.lines().any(|l| l == line))
                .unwrap_or(false),
            Probe::GitConfigEquals { key, value } => git_config_equals(ctx, key, value),
            Probe::CommandSucceeds(command) => ctx.host.check(command),
            Probe::All(probes) => probes.iter().all(|p| p.evaluate(ctx)),
            Probe::Any(probes) => probes.iter().any(|p| p.evaluate(ctx)),
            Probe::Never => false,
        };

        tracing::debug!("Probe {} -> {}", self, present);
        present
    }
}

fn git_config_equals(ctx: &ExecutionContext<'_>, key: &str, value: &str) -> bool {
    let args = vec![
        "config".to_string(),
        "--global".to_string(),
        "--get".to_string(),
        key.to_string(),
    ];
    match ctx
        .host
        .run_program("git", &args, &CommandOptions::captured())
    {
        Ok(result) => result.success && result.stdout.trim_end_matches(['\r', '\n']) == value,
        Err(e) => {
            tracing::debug!("git config lookup failed: {}", e);
            false
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::PackageInstalled(name) => write!(f, "package {} installed", name),
            Probe::RepoFileExists(path) => write!(f, "source {} exists", path.display()),
            Probe::UserInGroup(group) => write!(f, "in group {}", group),
            Probe::CommandOnPath(name) => write!(f, "{} on PATH", name),
            Probe::PathExists(path) => write!(f, "{} exists", path.display()),
            Probe::LineInFile { path, .. } => write!(f, "line present in {}", path.display()),
            Probe::GitConfigEquals { key, value } => write!(f, "git {} = {}", key, value),
            Probe::CommandSucceeds(command) => write!(f, "`{}` succeeds", command),
            Probe::All(probes) => write!(f, "all of {} checks", probes.len()),
            Probe::Any(probes) => write!(f, "any of {} checks", probes.len()),
            Probe::Never => write!(f, "never"),
        }
    }
}

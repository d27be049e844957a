//! Mock host for testing.
//!
//! `MockHost` simulates the parts of a machine that probes and actions
//! touch: an installed-package set, session groups, global git config and
//! a few well-known programs. Every mutating call is recorded for later
//! assertion, and individual operations can be made to fail.
//!
//! # Example
//!
//! ```
//! use rigup::host::{Host, MockHost};
//! use rigup::shell::CommandOptions;
//!
//! let host = MockHost::new().with_installed(&["git"]);
//! assert!(host.package_installed("git").unwrap());
//!
//! host.install_packages(&["curl".to_string()], &CommandOptions::captured()).unwrap();
//! assert!(host.package_installed("curl").unwrap());
//! assert_eq!(host.calls(), vec!["apt-get install -y curl"]);
//! ```

use super::Host;
use crate::error::{RigupError, Result};
use crate::shell::{display_command, CommandOptions, CommandResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mock host implementation for testing.
///
/// Group membership added through [`Host::add_user_to_group`] is recorded
/// in [`MockHost::group_members`] but does not change
/// [`Host::current_groups`], the same way a real login session keeps its
/// groups until the user logs in again.
#[derive(Debug, Default)]
pub struct MockHost {
    installed: RefCell<BTreeSet<String>>,
    groups: Vec<String>,
    group_members: RefCell<BTreeMap<String, BTreeSet<String>>>,
    user: Option<String>,
    elevated: bool,
    git_config: RefCell<BTreeMap<String, String>>,
    failing: HashSet<String>,
    passing_checks: HashSet<String>,
    path_entries: Vec<PathBuf>,
    calls: RefCell<Vec<String>>,
    broken_package_db: bool,
}

impl MockHost {
    /// Create an empty mock host for user "tester".
    pub fn new() -> Self {
        Self {
            user: Some("tester".to_string()),
            groups: vec!["tester".to_string()],
            ..Default::default()
        }
    }

    /// Mark packages as already installed.
    pub fn with_installed(self, names: &[&str]) -> Self {
        self.installed
            .borrow_mut()
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Set the groups of the current session.
    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    /// Set the invoking user (None simulates an unknown user).
    pub fn with_user(mut self, user: Option<&str>) -> Self {
        self.user = user.map(String::from);
        self
    }

    /// Simulate running as root.
    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    /// Set directories returned by [`Host::search_path`].
    pub fn with_path(mut self, entries: Vec<PathBuf>) -> Self {
        self.path_entries = entries;
        self
    }

    /// Make every package query fail, as if `dpkg-query` were missing.
    pub fn with_broken_package_db(mut self) -> Self {
        self.broken_package_db = true;
        self
    }

    /// Make an operation fail.
    ///
    /// Keys are `"install"` (or `"install:<package>"` for batches containing
    /// that package), `"install-file"`, `"update"`, `"group"`,
    /// `"mkdir"`, `"write"`, a program name for [`Host::run_program`], or the exact
    /// script text for [`Host::run_shell`].
    pub fn fail_on(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Make [`Host::check`] succeed for this exact command.
    pub fn pass_check(mut self, command: &str) -> Self {
        self.passing_checks.insert(command.to_string());
        self
    }

    /// Recorded mutating calls, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Currently installed packages, sorted.
    pub fn installed(&self) -> Vec<String> {
        self.installed.borrow().iter().cloned().collect()
    }

    /// Users added to `group` during this mock's lifetime.
    pub fn group_members(&self, group: &str) -> Vec<String> {
        self.group_members
            .borrow()
            .get(group)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Value of a simulated `git config --global` key.
    pub fn git_config(&self, key: &str) -> Option<String> {
        self.git_config.borrow().get(key).cloned()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn outcome(&self, key: &str) -> CommandResult {
        if self.failing.contains(key) {
            CommandResult::failure(
                Some(1),
                String::new(),
                format!("simulated failure: {}", key),
                Duration::ZERO,
            )
        } else {
            CommandResult::success(String::new(), String::new(), Duration::ZERO)
        }
    }

    fn git(&self, args: &[String]) -> CommandResult {
        let ok = |stdout: String| CommandResult::success(stdout, String::new(), Duration::ZERO);
        let rest: Vec<&str> = args.iter().map(String::as_str).collect();

        match rest.as_slice() {
            ["config", "--global", "--get", key] => match self.git_config.borrow().get(*key) {
                Some(value) => ok(format!("{}\n", value)),
                None => CommandResult::failure(Some(1), String::new(), String::new(), Duration::ZERO),
            },
            ["config", "--global", key, value] => {
                self.git_config
                    .borrow_mut()
                    .insert(key.to_string(), value.to_string());
                ok(String::new())
            }
            _ => ok(String::new()),
        }
    }

    fn ssh_keygen(&self, args: &[String]) -> CommandResult {
        let key_path = args
            .iter()
            .position(|a| a == "-f")
            .and_then(|i| args.get(i + 1));

        if let Some(path) = key_path {
            let private = PathBuf::from(path);
            let public = PathBuf::from(format!("{}.pub", path));
            let written = std::fs::write(&private, "mock private key")
                .and_then(|_| std::fs::write(&public, "ssh-ed25519 AAAA mock"));
            if let Err(e) = written {
                return CommandResult::failure(Some(1), String::new(), e.to_string(), Duration::ZERO);
            }
        }
        CommandResult::success(String::new(), String::new(), Duration::ZERO)
    }
}

impl Host for MockHost {
    fn package_installed(&self, name: &str) -> Result<bool> {
        if self.broken_package_db {
            return Err(RigupError::CommandFailed {
                command: format!("dpkg-query -W {}", name),
                code: None,
            });
        }
        Ok(self.installed.borrow().contains(name))
    }

    fn install_packages(
        &self,
        names: &[String],
        _options: &CommandOptions,
    ) -> Result<CommandResult> {
        self.record(format!("apt-get install -y {}", names.join(" ")));
        let result = match names
            .iter()
            .find(|n| self.failing.contains(&format!("install:{}", n)))
        {
            Some(name) => self.outcome(&format!("install:{}", name)),
            None => self.outcome("install"),
        };
        if result.success {
            self.installed.borrow_mut().extend(names.iter().cloned());
        }
        Ok(result)
    }

    fn install_package_file(&self, path: &Path, _options: &CommandOptions) -> Result<CommandResult> {
        self.record(format!("apt-get install -y {}", path.display()));
        Ok(self.outcome("install-file"))
    }

    fn update_package_index(&self, _options: &CommandOptions) -> Result<CommandResult> {
        self.record("apt-get update".to_string());
        Ok(self.outcome("update"))
    }

    fn current_groups(&self) -> Result<Vec<String>> {
        Ok(self.groups.clone())
    }

    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }

    fn add_user_to_group(
        &self,
        group: &str,
        user: &str,
        _options: &CommandOptions,
    ) -> Result<CommandResult> {
        self.record(format!("usermod -aG {} {}", group, user));
        let result = self.outcome("group");
        if result.success {
            self.group_members
                .borrow_mut()
                .entry(group.to_string())
                .or_default()
                .insert(user.to_string());
        }
        Ok(result)
    }

    fn create_dir_privileged(&self, path: &Path) -> Result<CommandResult> {
        self.record(format!("sudo mkdir -p {}", path.display()));
        Ok(self.outcome("mkdir"))
    }

    fn write_privileged(&self, path: &Path, contents: &str) -> Result<CommandResult> {
        self.record(format!("sudo tee {}", path.display()));
        let result = self.outcome("write");
        if result.success {
            std::fs::write(path, contents)?;
        }
        Ok(result)
    }

    fn run_shell(&self, script: &str, _options: &CommandOptions) -> Result<CommandResult> {
        self.record(format!("sh -c {}", script));
        Ok(self.outcome(script))
    }

    fn run_program(
        &self,
        program: &str,
        args: &[String],
        _options: &CommandOptions,
    ) -> Result<CommandResult> {
        self.record(display_command(program, args));
        if self.failing.contains(program) {
            return Ok(self.outcome(program));
        }
        Ok(match program {
            "git" => self.git(args),
            "ssh-keygen" => self.ssh_keygen(args),
            _ => self.outcome(program),
        })
    }

    fn check(&self, command: &str) -> bool {
        self.passing_checks.contains(command)
    }

    fn search_path(&self) -> Vec<PathBuf> {
        self.path_entries.clone()
    }

    fn is_elevated(&self) -> bool {
        self.elevated
    }
}

//! The real machine: dpkg/apt, the group database, and `sudo`.

use super::identity::{current_group_names, current_user_name, parse_group_list};
use super::Host;
use crate::error::Result;
use crate::shell::{
    execute, execute_check, execute_program, is_elevated, parse_system_path, CommandOptions,
    CommandResult,
};
use std::path::{Path, PathBuf};

/// Host implementation backed by the local Ubuntu system.
#[derive(Debug, Clone)]
pub struct LocalHost {
    elevated: bool,
}

impl LocalHost {
    /// Create a host for the current process.
    pub fn new() -> Self {
        Self {
            elevated: is_elevated(),
        }
    }

    /// Run `program args` as root, via `sudo` unless already elevated.
    fn run_as_root(
        &self,
        program: &str,
        args: &[String],
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        if self.elevated {
            execute_program(program, args, options)
        } else {
            let mut sudo_args = Vec::with_capacity(args.len() + 1);
            sudo_args.push(program.to_string());
            sudo_args.extend(args.iter().cloned());
            execute_program("sudo", &sudo_args, options)
        }
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a `dpkg-query` status line means "installed".
pub fn dpkg_status_installed(status: &str) -> bool {
    status.trim() == "install ok installed"
}

fn apt_args(tail: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut args = vec!["install".to_string(), "-y".to_string()];
    args.extend(tail);
    args
}

impl Host for LocalHost {
    fn package_installed(&self, name: &str) -> Result<bool> {
        let args = vec![
            "-W".to_string(),
            "-f=${Status}".to_string(),
            name.to_string(),
        ];
        let result = execute_program("dpkg-query", &args, &CommandOptions::captured())?;
        Ok(result.success && dpkg_status_installed(&result.stdout))
    }

    fn install_packages(
        &self,
        names: &[String],
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        self.run_as_root("apt-get", &apt_args(names.iter().cloned()), options)
    }

    fn install_package_file(&self, path: &Path, options: &CommandOptions) -> Result<CommandResult> {
        // apt only treats the argument as a file when it looks like a path
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(".").join(path)
        };
        let arg = path.to_string_lossy().into_owned();
        self.run_as_root("apt-get", &apt_args([arg]), options)
    }

    fn update_package_index(&self, options: &CommandOptions) -> Result<CommandResult> {
        self.run_as_root("apt-get", &["update".to_string()], options)
    }

    fn current_groups(&self) -> Result<Vec<String>> {
        match current_group_names() {
            Ok(names) => Ok(names),
            Err(e) => {
                tracing::debug!("Group lookup failed ({}), falling back to id -Gn", e);
                let result = execute("id -Gn", &CommandOptions::captured())?;
                Ok(parse_group_list(&result.stdout))
            }
        }
    }

    fn current_user(&self) -> Option<String> {
        current_user_name()
    }

    fn add_user_to_group(
        &self,
        group: &str,
        user: &str,
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        let created = self.run_as_root(
            "groupadd",
            &["-f".to_string(), group.to_string()],
            options,
        )?;
        if !created.success {
            return Ok(created);
        }
        self.run_as_root(
            "usermod",
            &["-aG".to_string(), group.to_string(), user.to_string()],
            options,
        )
    }

    fn create_dir_privileged(&self, path: &Path) -> Result<CommandResult> {
        let args = vec!["-p".to_string(), path.to_string_lossy().into_owned()];
        self.run_as_root("mkdir", &args, &CommandOptions::captured())
    }

    fn write_privileged(&self, path: &Path, contents: &str) -> Result<CommandResult> {
        let options = CommandOptions::captured().with_stdin(contents);
        self.run_as_root("tee", &[path.to_string_lossy().into_owned()], &options)
    }

    fn run_shell(&self, script: &str, options: &CommandOptions) -> Result<CommandResult> {
        execute(script, options)
    }

    fn run_program(
        &self,
        program: &str,
        args: &[String],
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        execute_program(program, args, options)
    }

    fn check(&self, command: &str) -> bool {
        execute_check(command, None)
    }

    fn search_path(&self) -> Vec<PathBuf> {
        parse_system_path()
    }

    fn is_elevated(&self) -> bool {
        self.elevated
    }
}

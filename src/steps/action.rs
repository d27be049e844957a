//! Actions: the side effects that establish a step's result.
//!
//! Actions are not idempotent on their own; the step's probe decides
//! whether one runs at all. A few (package installs, line appends) still
//! avoid obvious duplication because the check is nearly free.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::context::ExecutionContext;
use super::probe::Probe;
use crate::cache::{file_sha256, CacheStore};
use crate::error::{RigupError, Result};
use crate::shell::{display_command, CommandResult};

/// Value an action hands to the next action of the same step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionOutput {
    /// Nothing worth passing on.
    #[default]
    Nothing,
    /// A file produced by the action (e.g. a downloaded artifact).
    Path(PathBuf),
}

impl ActionOutput {
    /// The produced path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ActionOutput::Path(path) => Some(path),
            ActionOutput::Nothing => None,
        }
    }
}

/// A shell script to run: inline text or an installer downloaded first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ShellScript {
    /// Script text run with `sh -c`.
    Inline(String),

    /// Installer script fetched through the cache and run from disk.
    Remote {
        /// Where to download the script.
        url: String,
        /// Expected hex SHA-256 of the script.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
        /// Interpreter that runs the downloaded file.
        #[serde(default = "default_interpreter")]
        interpreter: String,
        /// Extra arguments passed after the script path.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
    },
}

fn default_interpreter() -> String {
    "sh".to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// The side-effecting half of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Install packages in one batched package-manager call.
    InstallPackages(Vec<String>),

    /// Write a package source (or signing key) file, escalating if needed.
    WriteAptSource { path: PathBuf, contents: String },

    /// Run a shell script.
    RunShellSnippet(ShellScript),

    /// Download an artifact into the cache; outputs its path.
    DownloadAndCache(String),

    /// Create a group (if missing) and add a user to it.
    CreateGroupAndAddUser {
        group: String,
        /// Defaults to the invoking user.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },

    /// Refresh the package index.
    UpdatePackageIndex,

    /// Install a local package file.
    InstallPackageFile {
        /// Defaults to the previous action's output.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },

    /// Append a line to a file unless already present.
    AppendLine { path: PathBuf, line: String },

    /// Set a global git config value.
    SetGitConfig { key: String, value: String },

    /// Generate an ed25519 SSH keypair.
    GenerateSshKey {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },

    /// Run a program directly, without a shell.
    RunCommand {
        program: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        /// Attach the terminal (for login flows and other prompts).
        #[serde(default, skip_serializing_if = "is_false")]
        interactive: bool,
    },

    /// Run actions in order, passing each output to the next.
    Sequence(Vec<Action>),
}

impl Action {
    /// Perform the action.
    ///
    /// `previous` is the output of the preceding action in a sequence.
    pub fn execute(
        &self,
        ctx: &ExecutionContext<'_>,
        previous: Option<&ActionOutput>,
    ) -> Result<ActionOutput> {
        match self {
            Action::InstallPackages(names) => install_packages(ctx, names),
            Action::WriteAptSource { path, contents } => {
                write_apt_source(ctx, &ctx.resolve(path), contents)
            }
            Action::RunShellSnippet(script) => run_shell_script(ctx, script),
            Action::DownloadAndCache(url) => {
                let entry = ctx.cache.get_or_fetch(url, ctx.fetcher)?;
                Ok(ActionOutput::Path(entry.filepath))
            }
            Action::CreateGroupAndAddUser { group, user } => {
                add_user_to_group(ctx, group, user.as_deref())
            }
            Action::UpdatePackageIndex => {
                let result = ctx.host.update_package_index(&ctx.command_options());
                require_success(result, |message| RigupError::PackageManager {
                    command: "apt-get update".to_string(),
                    message,
                })?;
                Ok(ActionOutput::Nothing)
            }
            Action::InstallPackageFile { path } => {
                let path = match (path, previous.and_then(ActionOutput::path)) {
                    (Some(path), _) => ctx.resolve(path),
                    (None, Some(previous)) => previous.to_path_buf(),
                    (None, None) => {
                        return Err(RigupError::PackageManager {
                            command: "apt-get install".to_string(),
                            message: "no package file given and nothing downloaded before"
                                .to_string(),
                        })
                    }
                };
                let result = ctx.host.install_package_file(&path, &ctx.command_options());
                require_success(result, |message| RigupError::PackageManager {
                    command: format!("apt-get install -y {}", path.display()),
                    message,
                })?;
                Ok(ActionOutput::Nothing)
            }
            Action::AppendLine { path, line } => append_line(&ctx.resolve(path), line),
            Action::SetGitConfig { key, value } => {
                let args = vec![
                    "config".to_string(),
                    "--global".to_string(),
                    key.clone(),
                    value.clone(),
                ];
                run_external(ctx, "git", &args, false)?;
                Ok(ActionOutput::Nothing)
            }
            Action::GenerateSshKey { path, comment } => {
                generate_ssh_key(ctx, &ctx.resolve(path), comment.as_deref())
            }
            Action::RunCommand {
                program,
                args,
                interactive,
            } => {
                run_external(ctx, program, args, *interactive)?;
                Ok(ActionOutput::Nothing)
            }
            Action::Sequence(actions) => {
                let mut output = previous.cloned().unwrap_or_default();
                for action in actions {
                    output = action.execute(ctx, Some(&output))?;
                }
                Ok(output)
            }
        }
    }

    /// Probe used when a configured step does not name one.
    pub fn default_probe(&self, cache: &CacheStore) -> Probe {
        match self {
            Action::InstallPackages(names) => Probe::All(
                dedupe(names)
                    .into_iter()
                    .map(Probe::PackageInstalled)
                    .collect(),
            ),
            Action::WriteAptSource { path, .. } => Probe::RepoFileExists(path.clone()),
            Action::DownloadAndCache(url) => Probe::PathExists(cache.entry_path(url)),
            Action::CreateGroupAndAddUser { group, .. } => Probe::UserInGroup(group.clone()),
            Action::AppendLine { path, line } => Probe::LineInFile {
                path: path.clone(),
                line: line.clone(),
            },
            Action::SetGitConfig { key, value } => Probe::GitConfigEquals {
                key: key.clone(),
                value: value.clone(),
            },
            Action::GenerateSshKey { path, .. } => Probe::PathExists(path.clone()),
            Action::RunShellSnippet(_)
            | Action::UpdatePackageIndex
            | Action::InstallPackageFile { .. }
            | Action::RunCommand { .. }
            | Action::Sequence(_) => Probe::Never,
        }
    }

    /// Whether running this action changes group membership.
    pub fn changes_groups(&self) -> bool {
        match self {
            Action::CreateGroupAndAddUser { .. } => true,
            Action::Sequence(actions) => actions.iter().any(Action::changes_groups),
            _ => false,
        }
    }

    /// Whether this action needs the terminal.
    pub fn is_interactive(&self) -> bool {
        match self {
            Action::RunCommand { interactive, .. } => *interactive,
            Action::Sequence(actions) => actions.iter().any(Action::is_interactive),
            _ => false,
        }
    }

    /// One-line description for previews.
    pub fn describe(&self) -> String {
        match self {
            Action::InstallPackages(names) => format!("install {}", dedupe(names).join(" ")),
            Action::WriteAptSource { path, .. } => format!("write {}", path.display()),
            Action::RunShellSnippet(ShellScript::Inline(script)) => {
                format!("run `{}`", first_line(script))
            }
            Action::RunShellSnippet(ShellScript::Remote { url, .. }) => format!("run {}", url),
            Action::DownloadAndCache(url) => format!("download {}", url),
            Action::CreateGroupAndAddUser { group, user } => match user {
                Some(user) => format!("add {} to group {}", user, group),
                None => format!("join group {}", group),
            },
            Action::UpdatePackageIndex => "apt-get update".to_string(),
            Action::InstallPackageFile { path: Some(path) } => {
                format!("install {}", path.display())
            }
            Action::InstallPackageFile { path: None } => "install downloaded package".to_string(),
            Action::AppendLine { path, .. } => format!("append to {}", path.display()),
            Action::SetGitConfig { key, value } => format!("git config {} {}", key, value),
            Action::GenerateSshKey { path, .. } => format!("ssh-keygen {}", path.display()),
            Action::RunCommand { program, args, .. } => display_command(program, args),
            Action::Sequence(actions) => actions
                .iter()
                .map(Action::describe)
                .collect::<Vec<_>>()
                .join(", then "),
        }
    }
}

/// Names in first-seen order without repeats.
fn dedupe(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

fn first_line(script: &str) -> &str {
    script.lines().next().unwrap_or("").trim()
}

/// Turn a command result into `Ok` only when it exited 0.
fn require_success(
    result: Result<CommandResult>,
    fail: impl FnOnce(String) -> RigupError,
) -> Result<CommandResult> {
    match result {
        Ok(result) if result.success => Ok(result),
        Ok(result) => Err(fail(result.failure_reason())),
        Err(e) => Err(fail(e.to_string())),
    }
}

fn install_packages(ctx: &ExecutionContext<'_>, names: &[String]) -> Result<ActionOutput> {
    let missing: Vec<String> = dedupe(names)
        .into_iter()
        .filter(|name| !ctx.host.package_installed(name).unwrap_or(false))
        .collect();

    if missing.is_empty() {
        tracing::debug!("All of {:?} already installed", names);
        return Ok(ActionOutput::Nothing);
    }

    tracing::debug!("Installing {}", missing.join(" "));
    let result = ctx.host.install_packages(&missing, &ctx.command_options());
    require_success(result, |message| RigupError::PackageManager {
        command: format!("apt-get install -y {}", missing.join(" ")),
        message,
    })?;
    Ok(ActionOutput::Nothing)
}

fn write_apt_source(ctx: &ExecutionContext<'_>, path: &Path, contents: &str) -> Result<ActionOutput> {
    let direct = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| fs::write(path, contents));

    match direct {
        Ok(()) => Ok(ActionOutput::Nothing),
        Err(e) if e.kind() == IoErrorKind::PermissionDenied && !ctx.host.is_elevated() => {
            tracing::debug!("Writing {} needs root, escalating", path.display());
            if let Some(parent) = path.parent().filter(|p| !p.is_dir()) {
                let result = ctx.host.create_dir_privileged(parent);
                require_success(result, |message| RigupError::Permission {
                    path: parent.to_path_buf(),
                    message,
                })?;
            }
            let result = ctx.host.write_privileged(path, contents);
            require_success(result, |message| RigupError::Permission {
                path: path.to_path_buf(),
                message,
            })?;
            Ok(ActionOutput::Nothing)
        }
        Err(e) if e.kind() == IoErrorKind::PermissionDenied => Err(RigupError::Permission {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(e) => Err(RigupError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn run_shell_script(ctx: &ExecutionContext<'_>, script: &ShellScript) -> Result<ActionOutput> {
    match script {
        ShellScript::Inline(text) => {
            let result = ctx.host.run_shell(text, &ctx.command_options());
            require_success(result, |message| RigupError::ExternalScript {
                command: first_line(text).to_string(),
                message,
            })?;
        }
        ShellScript::Remote {
            url,
            sha256,
            interpreter,
            args,
        } => {
            let entry = ctx.cache.get_or_fetch(url, ctx.fetcher)?;

            if let Some(expected) = sha256 {
                let actual = file_sha256(&entry.filepath).map_err(|e| RigupError::FileWrite {
                    path: entry.filepath.clone(),
                    message: e.to_string(),
                })?;
                if !actual.eq_ignore_ascii_case(expected.trim()) {
                    if let Err(e) = ctx.cache.remove(url) {
                        tracing::warn!("Could not evict {}: {}", entry.filepath.display(), e);
                    }
                    return Err(RigupError::ExternalScript {
                        command: url.clone(),
                        message: format!("checksum mismatch: expected {}, got {}", expected, actual),
                    });
                }
            }

            let mut full_args = vec![entry.filepath.to_string_lossy().into_owned()];
            full_args.extend(args.iter().cloned());
            let result = ctx
                .host
                .run_program(interpreter, &full_args, &ctx.command_options());
            require_success(result, |message| RigupError::ExternalScript {
                command: format!("{} {}", interpreter, url),
                message,
            })?;
        }
    }
    Ok(ActionOutput::Nothing)
}

fn add_user_to_group(
    ctx: &ExecutionContext<'_>,
    group: &str,
    user: Option<&str>,
) -> Result<ActionOutput> {
    let user = match user.map(String::from).or_else(|| ctx.host.current_user()) {
        Some(user) => user,
        None => {
            return Err(RigupError::Privilege {
                group: group.to_string(),
                user: "?".to_string(),
                message: "cannot determine the invoking user".to_string(),
            })
        }
    };

    let result = ctx
        .host
        .add_user_to_group(group, &user, &ctx.command_options());
    require_success(result, |message| RigupError::Privilege {
        group: group.to_string(),
        user: user.clone(),
        message,
    })?;
    Ok(ActionOutput::Nothing)
}

fn append_line(path: &Path, line: &str) -> Result<ActionOutput> {
    let write_failed = |e: std::io::Error| RigupError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(write_failed)?;

    let mut existing = String::new();
    file.read_to_string(&mut existing).map_err(write_failed)?;
    if existing.lines().any(|l| l == line) {
        return Ok(ActionOutput::Nothing);
    }

    let mut text = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text.push('\n');

    file.seek(SeekFrom::End(0)).map_err(write_failed)?;
    file.write_all(text.as_bytes()).map_err(write_failed)?;
    Ok(ActionOutput::Nothing)
}

fn generate_ssh_key(
    ctx: &ExecutionContext<'_>,
    path: &Path,
    comment: Option<&str>,
) -> Result<ActionOutput> {
    if path.exists() {
        tracing::debug!("{} already exists, not overwriting", path.display());
        return Ok(ActionOutput::Path(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        create_private_dir(parent).map_err(|e| RigupError::FileWrite {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let mut args = vec!["-t".to_string(), "ed25519".to_string()];
    if let Some(comment) = comment {
        args.push("-C".to_string());
        args.push(comment.to_string());
    }
    args.extend([
        "-f".to_string(),
        path.to_string_lossy().into_owned(),
        "-N".to_string(),
        String::new(),
    ]);

    run_external(ctx, "ssh-keygen", &args, false)?;
    Ok(ActionOutput::Path(path.to_path_buf()))
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

fn run_external(
    ctx: &ExecutionContext<'_>,
    program: &str,
    args: &[String],
    interactive: bool,
) -> Result<CommandResult> {
    let options = if interactive {
        ctx.interactive_options()
    } else {
        ctx.command_options()
    };
    let result = ctx.host.run_program(program, args, &options);
    require_success(result, |message| RigupError::ExternalScript {
        command: display_command(program, args),
        message,
    })
}

//! External command execution.
//!
//! Everything rigup does to the machine beyond plain file writes goes
//! through here: package manager calls, privilege escalation, installer
//! scripts and probe commands.

use crate::error::{RigupError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Short human-readable reason for a failed command.
    ///
    /// Uses the last non-empty stderr line when output was captured,
    /// otherwise just the exit code.
    pub fn failure_reason(&self) -> String {
        let last_line = self
            .stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty());

        match (last_line, self.exit_code) {
            (Some(line), Some(code)) => format!("exit code {}: {}", code, line),
            (Some(line), None) => format!("terminated by signal: {}", line),
            (None, Some(code)) => format!("exit code {}", code),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,

    /// Data written to the child's stdin (stdin is inherited when None).
    pub stdin: Option<String>,
}

impl CommandOptions {
    /// Options that capture both output streams.
    pub fn captured() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    /// Options that inherit the terminal, for commands that talk to the user.
    pub fn interactive() -> Self {
        Self::default()
    }

    /// Set the working directory.
    pub fn in_dir(mut self, cwd: Option<&Path>) -> Self {
        self.cwd = cwd.map(Path::to_path_buf);
        self
    }

    /// Feed data to the child's stdin.
    pub fn with_stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin = Some(data.into());
        self
    }
}

/// Execute a shell snippet with `sh -c`.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let mut cmd = Command::new(shell_program());
    cmd.arg("-c").arg(command);
    run(cmd, command, options)
}

/// Execute a program directly, without a shell in between.
pub fn execute_program(
    program: &str,
    args: &[String],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    run(cmd, &display_command(program, args), options)
}

/// Execute a shell snippet and return success/failure.
pub fn execute_check(command: &str, cwd: Option<&Path>) -> bool {
    let options = CommandOptions::captured().in_dir(cwd);

    execute(command, &options)
        .map(|r| r.success)
        .unwrap_or(false)
}

/// Render a program and its arguments the way a user would type them.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    for arg in args {
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            parts.push(format!("'{}'", arg));
        } else {
            parts.push(arg.clone());
        }
    }
    parts.join(" ")
}

fn run(mut cmd: Command, shown: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdout(if options.capture_stdout {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(if options.capture_stderr {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    if options.stdin.is_some() {
        cmd.stdin(Stdio::piped());
    }

    tracing::debug!("Executing: {}", shown);

    let spawn_failed = |_| RigupError::CommandFailed {
        command: shown.to_string(),
        code: None,
    };

    let mut child = cmd.spawn().map_err(spawn_failed)?;

    // fed from a thread so a child echoing its input (tee) cannot fill the
    // stdout pipe while we are still blocked writing
    let feeder = match (&options.stdin, child.stdin.take()) {
        (Some(data), Some(mut stdin)) => {
            let data = data.clone();
            Some(std::thread::spawn(move || stdin.write_all(data.as_bytes())))
        }
        _ => None,
    };

    let output = child.wait_with_output().map_err(spawn_failed)?;

    if let Some(Ok(Err(e))) = feeder.map(|handle| handle.join()) {
        tracing::debug!("Writing stdin of {} failed: {}", shown, e);
    }
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        tracing::debug!("Command exited with {:?}: {}", output.status.code(), shown);
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Shell used for snippets.
///
/// Snippets are POSIX shell, so this is always `sh` rather than the
/// user's login shell.
fn shell_program() -> &'static str {
    "sh"
}

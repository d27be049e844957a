//! Error types for rigup operations.
//!
//! This module defines [`RigupError`], the primary error type used throughout
//! the application, a [`Result`] type alias, and [`ErrorKind`], the coarse
//! classification recorded in a run report for every failed step.
//!
//! # Error Handling Strategy
//!
//! - Actions fail with one of the action variants (`Permission`, `Network`,
//!   `PackageManager`, `ExternalScript`, `Privilege`, `FileWrite`)
//! - Configuration problems use the `Config*` variants and map to exit code 2
//! - Use `anyhow::Error` (via `RigupError::Other`) for unexpected errors

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rigup operations.
#[derive(Debug, Error)]
pub enum RigupError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A step name given on the command line does not exist.
    #[error("Unknown step: {name}")]
    UnknownStep { name: String },

    /// Elevated privilege was required and could not be obtained.
    #[error("Permission denied writing {path}: {message}")]
    Permission { path: PathBuf, message: String },

    /// Downloading an artifact failed.
    #[error("Download of {url} failed: {message}")]
    Network { url: String, message: String },

    /// The system package manager exited non-zero.
    #[error("Package manager failed ({command}): {message}")]
    PackageManager { command: String, message: String },

    /// A third-party script or external tool failed.
    #[error("External command failed ({command}): {message}")]
    ExternalScript { command: String, message: String },

    /// Group or user management was refused.
    #[error("Could not add '{user}' to group '{group}': {message}")]
    Privilege {
        group: String,
        user: String,
        message: String,
    },

    /// Writing a file failed for a reason other than permissions.
    #[error("Failed to write {path}: {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Shell command could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for rigup operations.
pub type Result<T> = std::result::Result<T, RigupError>;

/// Classification of a step failure, as shown in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    PermissionError,
    NetworkError,
    PackageManagerError,
    ExternalScriptError,
    PrivilegeError,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::PermissionError => "PermissionError",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::PackageManagerError => "PackageManagerError",
            ErrorKind::ExternalScriptError => "ExternalScriptError",
            ErrorKind::PrivilegeError => "PrivilegeError",
            ErrorKind::IoError => "IOError",
        };
        f.write_str(s)
    }
}

impl RigupError {
    /// Classify this error for the run report.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RigupError::Permission { .. } => ErrorKind::PermissionError,
            RigupError::Network { .. } => ErrorKind::NetworkError,
            RigupError::PackageManager { .. } => ErrorKind::PackageManagerError,
            RigupError::ExternalScript { .. } | RigupError::CommandFailed { .. } => {
                ErrorKind::ExternalScriptError
            }
            RigupError::Privilege { .. } => ErrorKind::PrivilegeError,
            RigupError::FileWrite { .. }
            | RigupError::Io(_)
            | RigupError::ConfigNotFound { .. }
            | RigupError::ConfigParseError { .. }
            | RigupError::ConfigValidationError { .. }
            | RigupError::UnknownStep { .. }
            | RigupError::Other(_) => ErrorKind::IoError,
        }
    }

    /// Whether this error comes from user configuration rather than the machine.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RigupError::ConfigNotFound { .. }
                | RigupError::ConfigParseError { .. }
                | RigupError::ConfigValidationError { .. }
                | RigupError::UnknownStep { .. }
        )
    }
}

//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! various locations in the correct priority order.

use crate::config::merger::merge_configs;
use crate::config::schema::RigupConfig;
use crate::error::{RigupError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding rigup config files.
pub const CONFIG_DIR: &str = ".rigup";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.rigup/config.yml`)
/// 2. Directory config (`<dir>/.rigup/config.yml`)
/// 3. Local overrides (`<dir>/.rigup/config.local.yml`)
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User's global config: ~/.rigup/config.yml
    pub user_global: Option<PathBuf>,

    /// Config next to the machine's setup files: <dir>/.rigup/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: <dir>/.rigup/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for `dir`, with the global config under `home`.
    pub fn discover(dir: &Path, home: Option<&Path>) -> Self {
        let existing = |path: PathBuf| path.is_file().then_some(path);

        let mut project = existing(dir.join(CONFIG_DIR).join("config.yml"));
        let user_global = home.and_then(|h| existing(user_config_path(h)));

        // running from $HOME would otherwise load the same file twice
        if project.is_some() && project == user_global {
            project = None;
        }

        Self {
            user_global,
            project,
            project_local: existing(dir.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Check if any config file exists.
    pub fn is_empty(&self) -> bool {
        self.all_existing().is_empty()
    }
}

/// Location of the user's global config.
pub fn user_config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join("config.yml")
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RigupError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RigupError::Io(e)
        }
    })
}

/// Load a single config file and parse it into RigupConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<RigupConfig> {
    let content = read_config(path)?;
    parse_config(&content, path)
}

/// Parse YAML content into RigupConfig.
pub fn parse_config(content: &str, source_path: &Path) -> Result<RigupConfig> {
    if content.trim().is_empty() {
        return Ok(RigupConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| RigupError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as raw YAML Value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_config(path)?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| RigupError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // an empty file parses as null, which would wipe earlier layers
    if value.is_null() {
        Ok(serde_yaml::Value::Mapping(Default::default()))
    } else {
        Ok(value)
    }
}

/// Load and merge all discovered config files.
///
/// With no config files at all this is the default config: built-in
/// identity steps only.
pub fn load_merged_config(dir: &Path, home: Option<&Path>) -> Result<RigupConfig> {
    let paths = ConfigPaths::discover(dir, home);

    let mut configs = Vec::new();
    for path in paths.all_existing() {
        tracing::debug!("Loading config {}", path.display());
        configs.push(load_config_value(path)?);
    }

    let merged = merge_configs(&configs);
    let source = paths
        .all_existing()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| dir.join(CONFIG_DIR).join("config.yml"));

    serde_yaml::from_value(merged).map_err(|e| RigupError::ConfigParseError {
        path: source,
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
/// Otherwise, discovers and merges all config files.
pub fn load_config(
    dir: &Path,
    home: Option<&Path>,
    config_override: Option<&Path>,
) -> Result<RigupConfig> {
    if let Some(override_path) = config_override {
        load_config_file(override_path)
    } else {
        load_merged_config(dir, home)
    }
}

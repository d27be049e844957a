//! Configuration loading, parsing, and validation for rigup.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use rigup::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let config_dir = temp.path().join(".rigup");
//! fs::create_dir_all(&config_dir).unwrap();
//! fs::write(
//!     config_dir.join("config.yml"),
//!     "steps:\n  - name: base\n    action:\n      install_packages: [curl]\n",
//! )
//! .unwrap();
//!
//! let config = load_merged_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.steps[0].name, "base");
//! ```
//!
//! # Configuration File Locations
//!
//! rigup discovers and merges configuration in this order:
//! 1. User global config (`~/.rigup/config.yml`)
//! 2. Directory config (`.rigup/config.yml`)
//! 3. Local overrides (`.rigup/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{
    load_config, load_config_file, load_config_value, load_merged_config, parse_config,
    user_config_path, ConfigPaths, CONFIG_DIR,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{RigupConfig, Settings, StepConfig};
pub use validator::{validate, validate_config, ValidationError};

//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Step names must be non-empty and unique (built-in names are reserved)
//! - Package lists, URLs and programs must be non-empty
//! - Checksums must be 64 hex digits
//! - `install_package_file` without a path needs an earlier action in a sequence

use crate::config::schema::RigupConfig;
use crate::error::{RigupError, Result};
use crate::steps::plan::BUILTIN_STEP_NAMES;
use crate::steps::{Action, ShellScript};
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step name if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, step: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: Some(step.to_string()),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &RigupConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for step in &config.steps {
        let name = step.name.as_str();

        if name.trim().is_empty() {
            errors.push(ValidationError {
                rule: "empty-name".to_string(),
                message: "Every step needs a non-empty 'name'".to_string(),
                step: None,
            });
        } else if BUILTIN_STEP_NAMES.contains(&name) {
            errors.push(ValidationError::new(
                "reserved-name",
                name,
                format!("Step name '{}' is reserved for a built-in step", name),
            ));
        } else if !seen.insert(name) {
            errors.push(ValidationError::new(
                "duplicate-name",
                name,
                format!("Step name '{}' is used more than once", name),
            ));
        }

        validate_action(&step.action, name, false, &mut errors);
    }

    errors
}

/// Check one action; `has_previous` is true inside a sequence after its first action.
fn validate_action(
    action: &Action,
    step: &str,
    has_previous: bool,
    errors: &mut Vec<ValidationError>,
) {
    match action {
        Action::InstallPackages(names) => {
            if names.is_empty() {
                errors.push(ValidationError::new(
                    "empty-packages",
                    step,
                    format!("Step '{}' installs an empty package list", step),
                ));
            } else if names.iter().any(|n| n.trim().is_empty()) {
                errors.push(ValidationError::new(
                    "empty-packages",
                    step,
                    format!("Step '{}' has an empty package name", step),
                ));
            }
        }
        Action::DownloadAndCache(url) => check_url(url, step, errors),
        Action::RunShellSnippet(ShellScript::Remote { url, sha256, .. }) => {
            check_url(url, step, errors);
            if let Some(sum) = sha256 {
                let sum = sum.trim();
                if sum.len() != 64 || !sum.chars().all(|c| c.is_ascii_hexdigit()) {
                    errors.push(ValidationError::new(
                        "bad-checksum",
                        step,
                        format!("Step '{}' has a sha256 that is not 64 hex digits", step),
                    ));
                }
            }
        }
        Action::RunShellSnippet(ShellScript::Inline(script)) if script.trim().is_empty() => {
            errors.push(ValidationError::new(
                "empty-script",
                step,
                format!("Step '{}' runs an empty script", step),
            ));
        }
        Action::RunCommand { program, .. } if program.trim().is_empty() => {
            errors.push(ValidationError::new(
                "empty-program",
                step,
                format!("Step '{}' runs an empty program name", step),
            ));
        }
        Action::InstallPackageFile { path: None } if !has_previous => {
            errors.push(ValidationError::new(
                "missing-package-file",
                step,
                format!(
                    "Step '{}' installs a package file without a path and nothing produces one",
                    step
                ),
            ));
        }
        Action::Sequence(actions) => {
            if actions.is_empty() {
                errors.push(ValidationError::new(
                    "empty-sequence",
                    step,
                    format!("Step '{}' has an empty sequence", step),
                ));
            }
            for (index, inner) in actions.iter().enumerate() {
                validate_action(inner, step, has_previous || index > 0, errors);
            }
        }
        _ => {}
    }
}

fn check_url(url: &str, step: &str, errors: &mut Vec<ValidationError>) {
    if url.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-url",
            step,
            format!("Step '{}' downloads from an empty URL", step),
        ));
    }
}

/// Validate configuration, returning Result.
pub fn validate(config: &RigupConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(RigupError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StepConfig;

    fn step(name: &str, action: Action) -> StepConfig {
        StepConfig {
            name: name.to_string(),
            probe: None,
            action,
            critical: false,
        }
    }

    fn config(steps: Vec<StepConfig>) -> RigupConfig {
        RigupConfig {
            steps,
            ..Default::default()
        }
    }

    fn rules(config: &RigupConfig) -> Vec<String> {
        validate_config(config).into_iter().map(|e| e.rule).collect()
    }

    #[test]
    fn valid_config_passes() {
        let config = config(vec![
            step("base", Action::InstallPackages(vec!["curl".into()])),
            step(
                "chrome",
                Action::Sequence(vec![
                    Action::DownloadAndCache("https://example.com/chrome.deb".into()),
                    Action::InstallPackageFile { path: None },
                ]),
            ),
        ]);

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn duplicate_names_rejected() {
        let config = config(vec![
            step("base", Action::UpdatePackageIndex),
            step("base", Action::UpdatePackageIndex),
        ]);

        assert_eq!(rules(&config), vec!["duplicate-name"]);
    }

    #[test]
    fn builtin_names_reserved() {
        let config = config(vec![step("ssh key", Action::UpdatePackageIndex)]);
        assert_eq!(rules(&config), vec!["reserved-name"]);
    }

    #[test]
    fn empty_name_rejected() {
        let config = config(vec![step("  ", Action::UpdatePackageIndex)]);
        assert_eq!(rules(&config), vec!["empty-name"]);
    }

    #[test]
    fn empty_package_list_rejected() {
        let config = config(vec![
            step("none", Action::InstallPackages(vec![])),
            step("blank", Action::InstallPackages(vec!["".into()])),
        ]);
        assert_eq!(rules(&config), vec!["empty-packages", "empty-packages"]);
    }

    #[test]
    fn empty_urls_rejected_at_any_depth() {
        let config = config(vec![step(
            "nested",
            Action::Sequence(vec![
                Action::UpdatePackageIndex,
                Action::Sequence(vec![Action::DownloadAndCache(" ".into())]),
            ]),
        )]);
        assert_eq!(rules(&config), vec!["empty-url"]);
    }

    #[test]
    fn bad_checksum_rejected() {
        let config = config(vec![step(
            "script",
            Action::RunShellSnippet(ShellScript::Remote {
                url: "https://example.com/i.sh".into(),
                sha256: Some("abc".into()),
                interpreter: "sh".into(),
                args: vec![],
            }),
        )]);
        assert_eq!(rules(&config), vec!["bad-checksum"]);
    }

    #[test]
    fn dangling_package_file_rejected() {
        let config = config(vec![step(
            "deb",
            Action::InstallPackageFile { path: None },
        )]);
        assert_eq!(rules(&config), vec!["missing-package-file"]);
    }

    #[test]
    fn collects_all_errors() {
        let config = config(vec![
            step("a", Action::InstallPackages(vec![])),
            step("a", Action::DownloadAndCache(String::new())),
        ]);

        let err = validate(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("empty package list"));
        assert!(message.contains("more than once"));
        assert!(message.contains("empty URL"));
    }
}

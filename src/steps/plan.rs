//! Turning configuration into the ordered step list.
//!
//! Configured steps come first, in file order. The built-in identity steps
//! (git identity, SSH key, GitHub login) are derived from settings and
//! appended after them.

use std::collections::HashSet;
use std::path::Path;

use super::action::Action;
use super::probe::Probe;
use super::step::Step;
use crate::cache::CacheStore;
use crate::config::{RigupConfig, Settings};
use crate::error::{RigupError, Result};

/// Sets `git config --global user.name`.
pub const GIT_NAME_STEP: &str = "git user.name";
/// Sets `git config --global user.email`.
pub const GIT_EMAIL_STEP: &str = "git user.email";
/// Generates `~/.ssh/id_ed25519`.
pub const SSH_KEY_STEP: &str = "ssh key";
/// Runs `gh auth login`.
pub const GITHUB_LOGIN_STEP: &str = "github login";
/// Uploads the public key with `gh ssh-key add`.
pub const GITHUB_SSH_KEY_STEP: &str = "github ssh key";

/// Names configured steps may not use.
pub const BUILTIN_STEP_NAMES: [&str; 5] = [
    GIT_NAME_STEP,
    GIT_EMAIL_STEP,
    SSH_KEY_STEP,
    GITHUB_LOGIN_STEP,
    GITHUB_SSH_KEY_STEP,
];

const SSH_KEY_PATH: &str = ".ssh/id_ed25519";

/// Steps from the `steps:` list, with default probes filled in.
pub fn configured_steps(config: &RigupConfig, cache: &CacheStore) -> Vec<Step> {
    config
        .steps
        .iter()
        .map(|sc| {
            let probe = sc
                .probe
                .clone()
                .unwrap_or_else(|| sc.action.default_probe(cache));
            Step::new(sc.name.clone(), probe, sc.action.clone()).with_critical(sc.critical)
        })
        .collect()
}

/// Built-in identity steps derived from settings.
///
/// Git identity steps are only produced for values that are set.
pub fn identity_steps(settings: &Settings, home: &Path) -> Vec<Step> {
    let mut steps = Vec::new();

    for (name, key, value) in [
        (GIT_NAME_STEP, "user.name", &settings.git_user_name),
        (GIT_EMAIL_STEP, "user.email", &settings.git_user_email),
    ] {
        if let Some(value) = value {
            steps.push(Step::new(
                name,
                Probe::GitConfigEquals {
                    key: key.to_string(),
                    value: value.clone(),
                },
                Action::SetGitConfig {
                    key: key.to_string(),
                    value: value.clone(),
                },
            ));
        }
    }

    let key_path = home.join(SSH_KEY_PATH);
    if !settings.skip_ssh_key_generation {
        steps.push(Step::new(
            SSH_KEY_STEP,
            Probe::PathExists(key_path.clone()),
            Action::GenerateSshKey {
                path: key_path.clone(),
                comment: settings.ssh_key_comment().map(String::from),
            },
        ));
    }

    if !settings.skip_github_login {
        steps.push(Step::new(
            GITHUB_LOGIN_STEP,
            Probe::CommandSucceeds("gh auth status".to_string()),
            Action::RunCommand {
                program: "gh".to_string(),
                args: vec!["auth".to_string(), "login".to_string()],
                interactive: true,
            },
        ));

        if let (false, Some(title)) = (settings.skip_ssh_key_generation, &settings.ssh_key_title) {
            let public_key = format!("{}.pub", key_path.display());
            steps.push(Step::new(
                GITHUB_SSH_KEY_STEP,
                Probe::CommandSucceeds(format!(
                    "gh ssh-key list | grep -qF -- {}",
                    shell_quote(title)
                )),
                Action::RunCommand {
                    program: "gh".to_string(),
                    args: vec![
                        "ssh-key".to_string(),
                        "add".to_string(),
                        public_key,
                        "--title".to_string(),
                        title.clone(),
                    ],
                    interactive: false,
                },
            ));
        }
    }

    steps
}

/// Git identity settings that are missing, as (step name, setting key).
pub fn missing_identity(settings: &Settings) -> Vec<(&'static str, &'static str)> {
    let mut missing = Vec::new();
    if settings.git_user_name.is_none() {
        missing.push((GIT_NAME_STEP, "git_user_name"));
    }
    if settings.git_user_email.is_none() {
        missing.push((GIT_EMAIL_STEP, "git_user_email"));
    }
    missing
}

/// The full ordered plan: configured steps, then identity steps.
pub fn build_plan(config: &RigupConfig, cache: &CacheStore, home: &Path) -> Vec<Step> {
    let mut steps = configured_steps(config, cache);
    steps.extend(identity_steps(&config.settings, home));
    steps
}

/// Apply `--only` and `--skip`; every name given must exist in the plan.
pub fn filter_steps(steps: Vec<Step>, only: &[String], skip: &[String]) -> Result<Vec<Step>> {
    let known: HashSet<&str> = steps.iter().map(|s| s.name.as_str()).collect();
    if let Some(unknown) = only
        .iter()
        .chain(skip)
        .find(|name| !known.contains(name.as_str()))
    {
        return Err(RigupError::UnknownStep {
            name: unknown.clone(),
        });
    }

    Ok(steps
        .into_iter()
        .filter(|s| only.is_empty() || only.contains(&s.name))
        .filter(|s| !skip.contains(&s.name))
        .collect())
}

/// Quote a string for `sh`.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

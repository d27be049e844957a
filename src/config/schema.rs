//! Configuration schema definitions for rigup.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::shell::expand_home;
use crate::steps::{Action, Probe};

/// Root configuration structure for `.rigup/config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RigupConfig {
    /// Global settings
    pub settings: Settings,

    /// Ordered provisioning steps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepConfig>,
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Value for `git config --global user.name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_user_name: Option<String>,

    /// Value for `git config --global user.email`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_user_email: Option<String>,

    /// Comment for the generated SSH key (defaults to the git email)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_email: Option<String>,

    /// Title used when uploading the SSH key to GitHub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_title: Option<String>,

    /// Where downloaded artifacts are cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Working directory for step commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Don't run the GitHub CLI login flow
    #[serde(skip_serializing_if = "is_false")]
    pub skip_github_login: bool,

    /// Don't generate an SSH key
    #[serde(skip_serializing_if = "is_false")]
    pub skip_ssh_key_generation: bool,

    /// Stream command output instead of showing spinners
    #[serde(skip_serializing_if = "is_false")]
    pub verbose: bool,
}

impl Settings {
    /// Cache directory, `~` expanded, falling back to the platform default.
    pub fn cache_dir(&self, home: &Path) -> PathBuf {
        self.cache_dir
            .as_deref()
            .map(|p| expand_home(p, home))
            .unwrap_or_else(crate::cache::default_cache_dir)
    }

    /// Download directory, `~` expanded, defaulting to `~/Downloads`.
    pub fn download_dir(&self, home: &Path) -> PathBuf {
        self.download_dir
            .as_deref()
            .map(|p| expand_home(p, home))
            .unwrap_or_else(|| home.join("Downloads"))
    }

    /// Comment for a generated SSH key.
    pub fn ssh_key_comment(&self) -> Option<&str> {
        self.ssh_key_email
            .as_deref()
            .or(self.git_user_email.as_deref())
    }
}

/// One configured step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepConfig {
    /// Unique step name
    pub name: String,

    /// Check for "already done"; derived from the action when omitted
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    #[schemars(with = "Option<Probe>")]
    pub probe: Option<Probe>,

    /// What the step does
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    #[schemars(with = "Action")]
    pub action: Action,

    /// Abort the whole run if this step fails
    #[serde(default, skip_serializing_if = "is_false")]
    pub critical: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = r#"
settings:
  git_user_name: Ada Lovelace
steps:
  - name: base packages
    action:
      install_packages: [curl, git]
"#;
        let config: RigupConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.settings.git_user_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(config.steps.len(), 1);
        assert!(config.steps[0].probe.is_none());
        assert!(!config.steps[0].critical);
    }

    #[test]
    fn parses_full_step() {
        let yaml = r#"
name: docker source
critical: true
probe:
  repo_file_exists: /etc/apt/sources.list.d/docker.list
action:
  write_apt_source:
    path: /etc/apt/sources.list.d/docker.list
    contents: "deb [arch=amd64] https://download.docker.com/linux/ubuntu noble stable\n"
"#;
        let step: StepConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(step.critical);
        assert_eq!(
            step.probe,
            Some(Probe::RepoFileExists(
                "/etc/apt/sources.list.d/docker.list".into()
            ))
        );
        assert!(matches!(step.action, Action::WriteAptSource { .. }));
    }

    #[test]
    fn nested_actions_and_probes_use_map_form() {
        let yaml = r#"
name: vscode
probe:
  any:
    - package_installed: code
    - all:
        - command_on_path: code
        - never
action:
  sequence:
    - download_and_cache: https://example.com/code_amd64.deb
    - install_package_file: {}
    - update_package_index
"#;
        let step: StepConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            step.probe,
            Some(Probe::Any(vec![
                Probe::PackageInstalled("code".into()),
                Probe::All(vec![Probe::CommandOnPath("code".into()), Probe::Never]),
            ]))
        );
        assert_eq!(
            step.action,
            Action::Sequence(vec![
                Action::DownloadAndCache("https://example.com/code_amd64.deb".into()),
                Action::InstallPackageFile { path: None },
                Action::UpdatePackageIndex,
            ])
        );

        let written = serde_yaml::to_string(&step).unwrap();
        assert!(written.contains("download_and_cache:"));
        assert!(!written.contains('!'));
        let reread: StepConfig = serde_yaml::from_str(&written).unwrap();
        assert_eq!(reread, step);
    }

    #[test]
    fn map_form_matches_json_schema_shape() {
        let step: StepConfig =
            serde_yaml::from_str("name: jq\naction:\n  install_packages: [jq]\n").unwrap();
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["action"]["install_packages"][0], "jq");

        let schema = serde_json::to_value(schemars::schema_for!(RigupConfig)).unwrap();
        let text = schema.to_string();
        assert!(text.contains("install_packages"));
        assert!(text.contains("package_installed"));
    }

    #[test]
    fn empty_document_is_default() {
        let config: RigupConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.steps.is_empty());
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn directories_expand_home() {
        let settings = Settings {
            cache_dir: Some("~/.cache/installers".into()),
            ..Default::default()
        };
        let home = Path::new("/home/ada");

        assert_eq!(
            settings.cache_dir(home),
            PathBuf::from("/home/ada/.cache/installers")
        );
        assert_eq!(
            settings.download_dir(home),
            PathBuf::from("/home/ada/Downloads")
        );
    }

    #[test]
    fn ssh_comment_falls_back_to_git_email() {
        let mut settings = Settings {
            git_user_email: Some("ada@example.com".into()),
            ..Default::default()
        };
        assert_eq!(settings.ssh_key_comment(), Some("ada@example.com"));

        settings.ssh_key_email = Some("keys@example.com".into());
        assert_eq!(settings.ssh_key_comment(), Some("keys@example.com"));
    }

    #[test]
    fn schema_generates() {
        let schema = schemars::schema_for!(RigupConfig);
        let json = serde_json::to_value(&schema).unwrap();
        assert!(json["properties"]["steps"].is_object());
    }
}

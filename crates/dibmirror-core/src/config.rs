//! Optional YAML configuration file
//!
//! Every field is optional; command-line flags and environment variables
//! take precedence over what is set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::context::Variables;
use crate::error::{CoreError, Result};
use crate::target::{TargetSet, default_targets};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_mirror_host: Option<String>,

    /// Overrides `<home>/dib-mirror`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_root: Option<PathBuf>,

    /// Directory of `.j2` templates; built-in templates when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    /// Extra template variables
    #[serde(default, skip_serializing_if = "Variables::is_empty")]
    pub vars: Variables,

    /// Replaces the default target sets when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetSet>>,
}

impl MirrorConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        Self::from_yaml(&content).map_err(|e| match e {
            CoreError::YamlParse(err) => CoreError::InvalidConfig {
                message: format!("{}: {}", path.display(), err),
            },
            other => other,
        })
    }

    /// Configured targets, or the defaults
    pub fn targets(&self) -> Vec<TargetSet> {
        self.targets.clone().unwrap_or_else(default_targets)
    }

    fn validate(&self) -> Result<()> {
        if let Some(targets) = &self.targets {
            if targets.is_empty() {
                return Err(CoreError::InvalidConfig {
                    message: "targets must not be empty when set".to_string(),
                });
            }
            for target in targets {
                target.validate()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::target::Distro;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MirrorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, MirrorConfig::default());
        assert_eq!(config.targets(), default_targets());
    }

    #[test]
    fn test_full_config() {
        let config = MirrorConfig::from_yaml(
            r#"
mirror_host: mirror.regionone.example.org
site_mirror_host: mirror.site.example.org
repo_root: /srv/dib-mirror
vars:
  gpgcheck: "1"
targets:
  - distro: centos-minimal
    files: [base.repo]
  - distro: fedora-minimal
    releases: ["default", "28", "29"]
    files: [fedora.repo, fedora-updates.repo]
"#,
        )
        .unwrap();

        assert_eq!(config.mirror_host.as_deref(), Some("mirror.regionone.example.org"));
        assert_eq!(config.repo_root, Some(PathBuf::from("/srv/dib-mirror")));
        assert_eq!(config.vars["gpgcheck"], "1");

        let targets = config.targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].distro, Distro::FedoraMinimal);
        assert_eq!(targets[1].releases.len(), 3);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = MirrorConfig::from_yaml("mirror: x\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_empty_targets_rejected() {
        assert!(MirrorConfig::from_yaml("targets: []\n").is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dibmirror.yaml");
        std::fs::write(&path, "targets: [1, 2").unwrap();

        let err = MirrorConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("dibmirror.yaml"));
    }
}

//! Build targets and the plan derived from them
//!
//! A `TargetSet` is what a user configures: one distro, an optional list of
//! release tags and the repo file kinds to produce. It expands into one
//! `TargetSpec` per release and one `RenderedFile` per release × file kind.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::fs::FILE_MODE;

/// Directory holding repo definitions inside each target
pub const REPOS_DIR_NAME: &str = "yum.repos.d";

/// Prefix of every rendered repo file name
pub const FILE_PREFIX: &str = "dib-mirror-";

/// Template file extension
pub const TEMPLATE_EXT: &str = ".j2";

/// Supported image build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distro {
    CentosMinimal,
    FedoraMinimal,
}

impl Distro {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distro::CentosMinimal => "centos-minimal",
            Distro::FedoraMinimal => "fedora-minimal",
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distro {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "centos-minimal" => Ok(Distro::CentosMinimal),
            "fedora-minimal" => Ok(Distro::FedoraMinimal),
            other => Err(CoreError::InvalidConfig {
                message: format!(
                    "unknown distro '{}', expected centos-minimal or fedora-minimal",
                    other
                ),
            }),
        }
    }
}

/// Every pairing of `a` with `b`, all of `b` for each element of `a`
pub fn cartesian<A: Clone, B: Clone>(a: &[A], b: &[B]) -> Vec<(A, B)> {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| (x.clone(), y.clone())))
        .collect()
}

/// Configured target: a distro, its release tags and repo file kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSet {
    pub distro: Distro,

    /// Release tags; empty for a flat target
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<String>,

    /// Repo file names, e.g. `base.repo`
    pub files: Vec<String>,
}

impl TargetSet {
    /// A target without release segmentation
    pub fn flat(distro: Distro, files: &[&str]) -> Self {
        Self {
            distro,
            releases: Vec::new(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// A target with one directory per release tag
    pub fn per_release(distro: Distro, releases: &[&str], files: &[&str]) -> Self {
        Self {
            distro,
            releases: releases.iter().map(|r| r.to_string()).collect(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// One spec per release tag, or a single spec for a flat target
    pub fn specs(&self) -> Vec<TargetSpec> {
        if self.releases.is_empty() {
            return vec![TargetSpec {
                distro: self.distro,
                release: None,
                file_names: self.files.clone(),
            }];
        }

        self.releases
            .iter()
            .map(|release| TargetSpec {
                distro: self.distro,
                release: Some(release.clone()),
                file_names: self.files.clone(),
            })
            .collect()
    }

    /// Files to render under `root`, release-major
    pub fn rendered_files(&self, root: &Path) -> Vec<RenderedFile> {
        let releases: Vec<Option<String>> = if self.releases.is_empty() {
            vec![None]
        } else {
            self.releases.iter().cloned().map(Some).collect()
        };

        cartesian(&releases, &self.files)
            .into_iter()
            .map(|(release, name)| {
                let spec = TargetSpec {
                    distro: self.distro,
                    release,
                    file_names: Vec::new(),
                };
                spec.rendered_file(root, &name)
            })
            .collect()
    }

    /// Reject names that would escape their directory
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: format!("target {} lists no files", self.distro),
            });
        }
        for release in &self.releases {
            validate_component("release", release)?;
        }
        for file in &self.files {
            validate_component("file", file)?;
        }
        Ok(())
    }
}

fn validate_component(what: &str, value: &str) -> Result<()> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(CoreError::InvalidConfig {
            message: format!("invalid {} name '{}': must be a single path component", what, value),
        });
    }
    Ok(())
}

/// One distro/release directory and the files it receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub distro: Distro,
    pub release: Option<String>,
    pub file_names: Vec<String>,
}

impl TargetSpec {
    /// `<distro>[/<release>]`, shared by template ids and output paths
    fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(self.distro.as_str());
        if let Some(release) = &self.release {
            dir.push(release);
        }
        dir
    }

    /// `<root>/<distro>[/<release>]/yum.repos.d`
    pub fn repos_dir(&self, root: &Path) -> PathBuf {
        root.join(self.relative_dir()).join(REPOS_DIR_NAME)
    }

    /// Template id for a repo file, always `/`-separated
    pub fn template_id(&self, name: &str) -> String {
        match &self.release {
            Some(release) => format!("{}/{}/{}{}", self.distro, release, name, TEMPLATE_EXT),
            None => format!("{}/{}{}", self.distro, name, TEMPLATE_EXT),
        }
    }

    pub fn rendered_file(&self, root: &Path, name: &str) -> RenderedFile {
        RenderedFile {
            destination: self.repos_dir(root).join(format!("{}{}", FILE_PREFIX, name)),
            template_id: self.template_id(name),
            mode: FILE_MODE,
        }
    }

    pub fn rendered_files(&self, root: &Path) -> Vec<RenderedFile> {
        self.file_names
            .iter()
            .map(|name| self.rendered_file(root, name))
            .collect()
    }
}

/// A file to produce: where it goes, what renders it, and its mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub destination: PathBuf,
    pub template_id: String,
    pub mode: u32,
}

/// The targets produced when nothing else is configured
pub fn default_targets() -> Vec<TargetSet> {
    vec![
        TargetSet::flat(
            Distro::CentosMinimal,
            &["base.repo", "updates.repo", "extras.repo"],
        ),
        TargetSet::per_release(
            Distro::FedoraMinimal,
            &["default", "28"],
            &["fedora.repo", "fedora-updates.repo"],
        ),
    ]
}

/// Directories to ensure and files to render for one target set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStage {
    pub distro: Option<Distro>,
    pub directories: Vec<PathBuf>,
    pub files: Vec<RenderedFile>,
}

/// Ordered stages for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub root: PathBuf,
    pub stages: Vec<PlanStage>,
}

impl Plan {
    /// Expand target sets under `root`.
    ///
    /// Directories are listed parents first, from the root down, and each
    /// appears only in the first stage that needs it.
    pub fn build(root: &Path, sets: &[TargetSet]) -> Result<Self> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut seen_files: HashSet<PathBuf> = HashSet::new();
        let mut stages = Vec::with_capacity(sets.len());

        for set in sets {
            set.validate()?;

            let mut stage = PlanStage {
                distro: Some(set.distro),
                ..Default::default()
            };

            for spec in set.specs() {
                let leaf = spec.repos_dir(root);
                let mut chain: Vec<PathBuf> = leaf
                    .ancestors()
                    .take_while(|p| p.starts_with(root))
                    .map(Path::to_path_buf)
                    .collect();
                chain.reverse();

                for dir in chain {
                    if seen_dirs.insert(dir.clone()) {
                        stage.directories.push(dir);
                    }
                }
            }

            for file in set.rendered_files(root) {
                if !seen_files.insert(file.destination.clone()) {
                    return Err(CoreError::InvalidConfig {
                        message: format!(
                            "{} is produced by more than one target",
                            file.destination.display()
                        ),
                    });
                }
                stage.files.push(file);
            }

            stages.push(stage);
        }

        Ok(Self {
            root: root.to_path_buf(),
            stages,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = &RenderedFile> {
        self.stages.iter().flat_map(|s| s.files.iter())
    }

    pub fn directories(&self) -> impl Iterator<Item = &PathBuf> {
        self.stages.iter().flat_map(|s| s.directories.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/home/zuul/dib-mirror")
    }

    #[test]
    fn test_cartesian_row_major() {
        let pairs = cartesian(&["default", "28"], &[1, 2]);
        assert_eq!(pairs, vec![("default", 1), ("default", 2), ("28", 1), ("28", 2)]);
    }

    #[test]
    fn test_cartesian_empty() {
        let pairs = cartesian::<&str, &str>(&[], &["a"]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_distro_roundtrip_str() {
        assert_eq!("centos-minimal".parse::<Distro>().unwrap(), Distro::CentosMinimal);
        assert_eq!(Distro::FedoraMinimal.to_string(), "fedora-minimal");
        assert!("ubuntu-minimal".parse::<Distro>().is_err());
    }

    #[test]
    fn test_centos_paths() {
        let spec = &default_targets()[0].specs()[0];
        let file = spec.rendered_file(&root(), "base.repo");

        assert_eq!(file.template_id, "centos-minimal/base.repo.j2");
        assert_eq!(
            file.destination,
            PathBuf::from("/home/zuul/dib-mirror/centos-minimal/yum.repos.d/dib-mirror-base.repo")
        );
        assert_eq!(file.mode, 0o644);
    }

    #[test]
    fn test_fedora_paths() {
        let specs = default_targets()[1].specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].release.as_deref(), Some("default"));
        assert_eq!(specs[0].rendered_files(&root()).len(), 2);
        let file = specs[1].rendered_file(&root(), "fedora-updates.repo");

        assert_eq!(file.template_id, "fedora-minimal/28/fedora-updates.repo.j2");
        assert_eq!(
            file.destination,
            PathBuf::from(
                "/home/zuul/dib-mirror/fedora-minimal/28/yum.repos.d/dib-mirror-fedora-updates.repo"
            )
        );
    }

    #[test]
    fn test_default_plan_layout() {
        let plan = Plan::build(&root(), &default_targets()).unwrap();
        let files: Vec<String> = plan
            .files()
            .map(|f| {
                f.destination
                    .strip_prefix(root())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(
            files,
            [
                "centos-minimal/yum.repos.d/dib-mirror-base.repo",
                "centos-minimal/yum.repos.d/dib-mirror-updates.repo",
                "centos-minimal/yum.repos.d/dib-mirror-extras.repo",
                "fedora-minimal/default/yum.repos.d/dib-mirror-fedora.repo",
                "fedora-minimal/default/yum.repos.d/dib-mirror-fedora-updates.repo",
                "fedora-minimal/28/yum.repos.d/dib-mirror-fedora.repo",
                "fedora-minimal/28/yum.repos.d/dib-mirror-fedora-updates.repo",
            ]
        );
    }

    #[test]
    fn test_plan_directories_parents_first() {
        let plan = Plan::build(&root(), &default_targets()).unwrap();

        assert_eq!(
            plan.stages[0].directories,
            vec![
                root(),
                root().join("centos-minimal"),
                root().join("centos-minimal/yum.repos.d"),
            ]
        );
        assert_eq!(
            plan.stages[1].directories,
            vec![
                root().join("fedora-minimal"),
                root().join("fedora-minimal/default"),
                root().join("fedora-minimal/default/yum.repos.d"),
                root().join("fedora-minimal/28"),
                root().join("fedora-minimal/28/yum.repos.d"),
            ]
        );
    }

    #[test]
    fn test_adding_release_is_additive() {
        let before = Plan::build(&root(), &default_targets()).unwrap();

        let mut sets = default_targets();
        sets[1].releases.push("29".to_string());
        let after = Plan::build(&root(), &sets).unwrap();

        let before_files: Vec<_> = before.files().cloned().collect();
        let after_files: Vec<_> = after.files().cloned().collect();

        assert_eq!(before_files.len(), 7);
        assert_eq!(after_files.len(), 9);
        assert!(before_files.iter().all(|f| after_files.contains(f)));

        let fedora = after.stages[1].files.len();
        assert_eq!(fedora, 3 * 2);
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let sets = vec![
            TargetSet::flat(Distro::CentosMinimal, &["base.repo"]),
            TargetSet::flat(Distro::CentosMinimal, &["base.repo"]),
        ];
        assert!(Plan::build(&root(), &sets).is_err());
    }

    #[test]
    fn test_plan_rejects_traversal() {
        let sets = vec![TargetSet::per_release(
            Distro::FedoraMinimal,
            &["../etc"],
            &["fedora.repo"],
        )];
        assert!(Plan::build(&root(), &sets).is_err());

        let sets = vec![TargetSet::flat(Distro::CentosMinimal, &[".."])];
        assert!(Plan::build(&root(), &sets).is_err());
    }

    #[test]
    fn test_target_set_yaml() {
        let set: TargetSet = serde_yaml::from_str(
            r#"
distro: fedora-minimal
releases: ["default", "28"]
files: [fedora.repo]
"#,
        )
        .unwrap();

        assert_eq!(set.distro, Distro::FedoraMinimal);
        assert_eq!(set.releases, ["default", "28"]);
        assert_eq!(set.rendered_files(&root()).len(), 2);
    }
}

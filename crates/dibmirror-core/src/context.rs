//! Rendering context for one generator run

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Directory name appended to the home directory to form the repo root
pub const REPO_ROOT_DIR_NAME: &str = "dib-mirror";

/// Variables handed to a template renderer, in insertion order
pub type Variables = IndexMap<String, String>;

const BUILTIN_VARS: &[&str] = &["mirror_host", "site_mirror_host", "repo_root"];

/// Resolve the repo root for a given home directory
#[must_use]
pub fn resolve_repo_root(home: &Path) -> PathBuf {
    home.join(REPO_ROOT_DIR_NAME)
}

/// Inputs for one run: where to write and which hosts to point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorContext {
    /// Base output directory
    pub repo_root: PathBuf,

    /// Regional mirror host
    pub site_mirror_host: String,

    /// Mirror host substituted into repo definitions
    pub mirror_host: String,

    /// Additional template variables
    pub extra: Variables,
}

impl MirrorContext {
    /// Create a context rooted at `<home>/dib-mirror`.
    ///
    /// The site mirror host starts out equal to `mirror_host`.
    pub fn new(home: &Path, mirror_host: impl Into<String>) -> Self {
        Self::at_root(resolve_repo_root(home), mirror_host)
    }

    /// Create a context writing to an explicit root
    pub fn at_root(repo_root: impl Into<PathBuf>, mirror_host: impl Into<String>) -> Self {
        let mirror_host = mirror_host.into();
        Self {
            repo_root: repo_root.into(),
            site_mirror_host: mirror_host.clone(),
            mirror_host,
            extra: Variables::new(),
        }
    }

    pub fn with_site_mirror_host(mut self, host: impl Into<String>) -> Self {
        self.site_mirror_host = host.into();
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_vars(mut self, vars: Variables) -> Self {
        self.extra.extend(vars);
        self
    }

    /// Check hosts and extra variables before anything is written
    pub fn validate(&self) -> Result<()> {
        validate_host("mirror_host", &self.mirror_host)?;
        validate_host("site_mirror_host", &self.site_mirror_host)?;

        for key in self.extra.keys() {
            if BUILTIN_VARS.contains(&key.as_str()) {
                return Err(CoreError::InvalidVariable {
                    name: key.clone(),
                    message: "cannot override a built-in variable".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Template variables: the built-ins first, then extras
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        vars.insert("mirror_host".to_string(), self.mirror_host.clone());
        vars.insert("site_mirror_host".to_string(), self.site_mirror_host.clone());
        vars.insert(
            "repo_root".to_string(),
            self.repo_root.to_string_lossy().into_owned(),
        );
        for (key, value) in &self.extra {
            vars.entry(key.clone()).or_insert_with(|| value.clone());
        }
        vars
    }
}

fn validate_host(name: &str, host: &str) -> Result<()> {
    let message = if host.is_empty() {
        "must not be empty"
    } else if host.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else if host.contains('/') {
        "must be a hostname, not a URL or path"
    } else {
        return Ok(());
    };

    Err(CoreError::InvalidVariable {
        name: name.to_string(),
        message: format!("{} (got {:?})", message, host),
    })
}

/// Parse `key=value` assignments from the command line
pub fn parse_set_vars(set_args: &[String]) -> Result<Variables> {
    let mut vars = Variables::new();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::InvalidVariable {
            name: arg.clone(),
            message: format!("Invalid --set format: '{}'. Expected key=value", arg),
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(CoreError::InvalidVariable {
                name: arg.clone(),
                message: "key must not be empty".to_string(),
            });
        }

        vars.insert(key.to_string(), val.to_string());
    }

    Ok(vars)
}

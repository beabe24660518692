//! CLI commands and the settings they share

pub mod generate;
pub mod plan;
pub mod render;
pub mod templates;

use clap::Args;
use dibmirror_core::{MirrorConfig, MirrorContext, TargetSet, parse_set_vars, resolve_repo_root};
use dibmirror_engine::Engine;
use std::path::PathBuf;

use crate::error::{CliError, Result};

/// Options shared by every command.
///
/// Precedence: flag, then environment variable, then config file.
#[derive(Args, Debug, Clone, Default)]
pub struct MirrorArgs {
    /// Mirror host substituted into repo files
    #[arg(long, env = "DIB_MIRROR_HOST", value_name = "HOST")]
    pub mirror_host: Option<String>,

    /// Regional mirror host (defaults to the mirror host)
    #[arg(long, env = "DIB_SITE_MIRROR_HOST", value_name = "HOST")]
    pub site_mirror_host: Option<String>,

    /// Output root (default: <home>/dib-mirror)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Home directory used to derive the output root
    #[arg(long, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Directory of .j2 templates (default: built-in templates)
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra template variable (key=value)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Render undefined variables as empty instead of failing
    #[arg(long)]
    pub lenient: bool,
}

/// Command-line options merged with the optional config file
pub struct Settings {
    args: MirrorArgs,
    config: MirrorConfig,
}

impl Settings {
    pub fn load(args: MirrorArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                MirrorConfig::load(path)?
            }
            None => MirrorConfig::default(),
        };
        Ok(Self { args, config })
    }

    /// Output root: `--root`, then `--home`, then the config file, then
    /// the current user's home directory
    pub fn repo_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.args.root {
            return Ok(root.clone());
        }
        if let Some(home) = &self.args.home {
            return Ok(resolve_repo_root(home));
        }
        if let Some(root) = &self.config.repo_root {
            return Ok(root.clone());
        }

        let home = dirs::home_dir().ok_or_else(|| {
            CliError::config_with_help(
                "could not determine the home directory",
                "pass --home or --root",
            )
        })?;
        Ok(resolve_repo_root(&home))
    }

    pub fn context(&self) -> Result<MirrorContext> {
        let mirror_host = self
            .args
            .mirror_host
            .clone()
            .or_else(|| self.config.mirror_host.clone())
            .ok_or_else(|| {
                CliError::config_with_help(
                    "no mirror host configured",
                    "pass --mirror-host, set DIB_MIRROR_HOST, or add mirror_host to the config file",
                )
            })?;

        let mut context = MirrorContext::at_root(self.repo_root()?, mirror_host)
            .with_vars(self.config.vars.clone())
            .with_vars(parse_set_vars(&self.args.set)?);

        if let Some(site) = self
            .args
            .site_mirror_host
            .clone()
            .or_else(|| self.config.site_mirror_host.clone())
        {
            context = context.with_site_mirror_host(site);
        }

        context.validate()?;
        Ok(context)
    }

    pub fn targets(&self) -> Vec<TargetSet> {
        self.config.targets()
    }

    pub fn engine(&self) -> Result<Engine> {
        let mut builder = Engine::builder().strict(!self.args.lenient);
        if let Some(dir) = self.args.templates.as_ref().or(self.config.templates_dir.as_ref()) {
            builder = builder.templates_dir(dir);
        }
        Ok(builder.build()?)
    }
}

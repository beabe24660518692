//! dibmirror Core - Types and generator for local mirror repo configuration
//!
//! This crate provides the foundational pieces of dibmirror:
//! - `MirrorContext`: Hostnames and output root for one run
//! - `TargetSet` / `TargetSpec`: Which distros, releases and repo files to produce
//! - `Plan`: The ordered directories and files a run touches
//! - `Generator`: Executes a plan through a pluggable `TemplateRenderer`
//! - `MirrorConfig`: Optional YAML configuration file

pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod generator;
pub mod target;

pub use config::MirrorConfig;
pub use context::{MirrorContext, REPO_ROOT_DIR_NAME, Variables, parse_set_vars, resolve_repo_root};
pub use error::{CoreError, ErrorKind, Result};
pub use fs::{Change, DIR_MODE, FILE_MODE};
pub use generator::{GenerationReport, Generator, RunMode, Step, TemplateRenderer, render_repo_file};
pub use target::{Distro, Plan, PlanStage, RenderedFile, TargetSet, TargetSpec, cartesian, default_targets};

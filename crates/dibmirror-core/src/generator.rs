//! Mirror-config generator
//!
//! Runs a `Plan` in order: for each target set, every directory is ensured
//! before any of its files is rendered. The first failure aborts the run.
//!
//! Concurrent runs against the same root are not locked. Every file write is
//! an atomic rename, so the last writer wins.

use std::path::{Path, PathBuf};

use crate::context::{MirrorContext, Variables};
use crate::error::Result;
use crate::fs::{self, Change, DIR_MODE};
use crate::target::{Plan, RenderedFile, TargetSet, default_targets};

/// Turns a template id and variables into text
pub trait TemplateRenderer {
    fn render(&self, template_id: &str, vars: &Variables) -> Result<String>;
}

impl<R: TemplateRenderer + ?Sized> TemplateRenderer for &R {
    fn render(&self, template_id: &str, vars: &Variables) -> Result<String> {
        (**self).render(template_id, vars)
    }
}

/// Whether a run writes to disk or only reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Apply,
    /// Render everything, write nothing, report pending changes
    Check,
}

/// One observable step of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Directory {
        path: PathBuf,
        change: Change,
    },
    File {
        path: PathBuf,
        template_id: String,
        change: Change,
    },
}

impl Step {
    pub fn path(&self) -> &Path {
        match self {
            Step::Directory { path, .. } | Step::File { path, .. } => path,
        }
    }

    pub fn change(&self) -> Change {
        match self {
            Step::Directory { change, .. } | Step::File { change, .. } => *change,
        }
    }
}

/// Trace of a run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub mode: RunMode,
    pub steps: Vec<Step>,
}

impl GenerationReport {
    /// True if any step changed (or in check mode would change) something
    pub fn changed(&self) -> bool {
        self.steps.iter().any(|s| s.change().is_change())
    }

    pub fn files(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| matches!(s, Step::File { .. }))
    }

    pub fn count(&self, change: Change) -> usize {
        self.steps.iter().filter(|s| s.change() == change).count()
    }
}

/// Creates the mirror directory tree and renders repo files into it
pub struct Generator<R> {
    renderer: R,
    targets: Vec<TargetSet>,
    mode: RunMode,
}

impl<R: TemplateRenderer> Generator<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            targets: default_targets(),
            mode: RunMode::Apply,
        }
    }

    /// Replace the default target sets
    pub fn targets(mut self, targets: Vec<TargetSet>) -> Self {
        self.targets = targets;
        self
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Plan for `context` without executing it
    pub fn plan(&self, context: &MirrorContext) -> Result<Plan> {
        Plan::build(&context.repo_root, &self.targets)
    }

    /// Execute the plan for `context`
    pub fn run(&self, context: &MirrorContext) -> Result<GenerationReport> {
        context.validate()?;
        let plan = self.plan(context)?;

        tracing::debug!(
            root = %plan.root.display(),
            mode = ?self.mode,
            "starting mirror config generation"
        );

        let mut report = GenerationReport {
            mode: self.mode,
            steps: Vec::new(),
        };

        for stage in &plan.stages {
            for dir in &stage.directories {
                let change = match self.mode {
                    RunMode::Apply => fs::ensure_directory(dir, DIR_MODE)?,
                    RunMode::Check => fs::inspect_directory(dir, DIR_MODE)?,
                };
                trace_step("directory", dir, change);
                report.steps.push(Step::Directory {
                    path: dir.clone(),
                    change,
                });
            }

            for file in &stage.files {
                let change = self.render_file(file, context)?;
                report.steps.push(Step::File {
                    path: file.destination.clone(),
                    template_id: file.template_id.clone(),
                    change,
                });
            }
        }

        tracing::info!(
            created = report.count(Change::Created),
            updated = report.count(Change::Updated),
            unchanged = report.count(Change::Unchanged),
            "mirror config generation finished"
        );

        Ok(report)
    }

    fn render_file(&self, file: &RenderedFile, context: &MirrorContext) -> Result<Change> {
        let change = match self.mode {
            RunMode::Apply => render_repo_file(
                &self.renderer,
                &file.template_id,
                context,
                &file.destination,
                file.mode,
            )?,
            RunMode::Check => {
                let contents = self.renderer.render(&file.template_id, &context.variables())?;
                fs::inspect_file(&file.destination, contents.as_bytes(), file.mode)?
            }
        };
        trace_step(&file.template_id, &file.destination, change);
        Ok(change)
    }
}

/// Render one template with the context's variables and write it atomically.
///
/// The template is rendered fully before `destination` is touched, so a
/// missing template or variable leaves no partial file behind.
pub fn render_repo_file<R: TemplateRenderer + ?Sized>(
    renderer: &R,
    template_id: &str,
    context: &MirrorContext,
    destination: &Path,
    mode: u32,
) -> Result<Change> {
    let contents = renderer.render(template_id, &context.variables())?;
    fs::write_atomic(destination, contents.as_bytes(), mode)
}

fn trace_step(what: &str, path: &Path, change: Change) {
    if change.is_change() {
        tracing::info!(source = what, path = %path.display(), ?change, "changed");
    } else {
        tracing::debug!(source = what, path = %path.display(), "ok");
    }
}

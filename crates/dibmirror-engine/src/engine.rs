//! Template engine based on MiniJinja

use dibmirror_core::{CoreError, TemplateRenderer, Variables};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::builtin::{self, BUILTIN_TEMPLATES};
use crate::error::{EngineError, Result, TemplateError};
use crate::suggestions::suggest_template_ids;

/// Where templates are looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Templates compiled into the binary
    Builtin,
    /// `<dir>/<template id>` on disk
    Directory(PathBuf),
}

/// Template engine builder
pub struct EngineBuilder {
    strict_mode: bool,
    source: TemplateSource,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            strict_mode: true,
            source: TemplateSource::Builtin,
        }
    }

    /// Set strict mode (fail on undefined variables)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Load templates from a directory instead of the built-ins
    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source = TemplateSource::Directory(dir.into());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<Engine> {
        if let TemplateSource::Directory(dir) = &self.source {
            if !dir.is_dir() {
                return Err(EngineError::Io {
                    path: dir.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "templates directory does not exist",
                    ),
                });
            }
        }
        Engine::new(self.strict_mode, self.source)
    }
}

/// The template engine
pub struct Engine {
    env: Environment<'static>,
    source: TemplateSource,
}

impl Engine {
    /// Create an engine for `source`
    pub fn new(strict_mode: bool, source: TemplateSource) -> Result<Self> {
        let mut env = Environment::new();

        if strict_mode {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(UndefinedBehavior::Lenient);
        }

        // Repo files are plain ini; keep source lines in errors
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_debug(true);

        match &source {
            TemplateSource::Builtin => {
                for &(name, text) in BUILTIN_TEMPLATES {
                    env.add_template(name, text).map_err(|e| {
                        EngineError::Template(TemplateError::from_minijinja(&e, name, text, &[]))
                    })?;
                }
            }
            TemplateSource::Directory(dir) => {
                env.set_loader(minijinja::path_loader(dir));
            }
        }

        Ok(Self { env, source })
    }

    /// Create a builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Known template ids, sorted
    pub fn template_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = match &self.source {
            TemplateSource::Builtin => BUILTIN_TEMPLATES
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            TemplateSource::Directory(dir) => WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| template_id_for(dir, entry.path()))
                .collect(),
        };
        ids.sort();
        ids
    }

    /// Render a named template
    pub fn render_template(&self, template_id: &str, vars: &Variables) -> Result<String> {
        let names: Vec<&str> = vars.keys().map(String::as_str).collect();

        let tmpl = self.env.get_template(template_id).map_err(|e| {
            if e.kind() == minijinja::ErrorKind::TemplateNotFound {
                EngineError::NotFound {
                    name: template_id.to_string(),
                    suggestions: suggest_template_ids(template_id, &self.template_ids()),
                }
            } else {
                let source = self.raw_source(template_id).unwrap_or_default();
                EngineError::Template(TemplateError::from_minijinja(
                    &e,
                    template_id,
                    &source,
                    &names,
                ))
            }
        })?;

        let rendered = tmpl.render(vars).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(
                &e,
                template_id,
                tmpl.source(),
                &names,
            ))
        })?;

        tracing::trace!(template = template_id, bytes = rendered.len(), "rendered");
        Ok(rendered)
    }

    /// Render a single template string
    pub fn render_string(&self, template: &str, vars: &Variables, template_name: &str) -> Result<String> {
        let names: Vec<&str> = vars.keys().map(String::as_str).collect();
        let mut env = self.env.clone();

        env.add_template_owned(template_name.to_string(), template.to_string())
            .map_err(|e| {
                EngineError::Template(TemplateError::from_minijinja(&e, template_name, template, &names))
            })?;

        let tmpl = env.get_template(template_name).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(&e, template_name, template, &names))
        })?;

        tmpl.render(vars).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(&e, template_name, template, &names))
        })
    }

    /// Template text as stored, for diagnostics
    fn raw_source(&self, template_id: &str) -> Option<String> {
        match &self.source {
            TemplateSource::Builtin => builtin::get(template_id).map(str::to_string),
            TemplateSource::Directory(dir) => std::fs::read_to_string(dir.join(template_id)).ok(),
        }
    }
}

impl TemplateRenderer for Engine {
    fn render(&self, template_id: &str, vars: &Variables) -> dibmirror_core::Result<String> {
        self.render_template(template_id, vars).map_err(CoreError::from)
    }
}

/// `/`-separated id of a `.j2` file relative to `dir`
fn template_id_for(dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(dir).ok()?;
    let id = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    id.ends_with(".j2").then_some(id)
}

//! dibmirror Engine - Jinja2 templating for repo definitions
//!
//! This crate provides a MiniJinja-based `TemplateRenderer` with:
//! - Built-in templates for every default target
//! - Loading from a templates directory on disk
//! - Strict undefined-variable handling with suggestions
//! - Diagnostics that point at the failing template line

pub mod builtin;
pub mod engine;
pub mod error;
pub mod suggestions;

pub use builtin::BUILTIN_TEMPLATES;
pub use engine::{Engine, EngineBuilder, TemplateSource};
pub use error::{EngineError, TemplateError, TemplateErrorKind};

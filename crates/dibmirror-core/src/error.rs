//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Permission denied: {}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template not found: {template}")]
    TemplateNotFound {
        template: String,
        /// Closest known template ids, if any
        suggestions: Vec<String>,
    },

    #[error("Failed to render {template}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Render {
        template: String,
        message: String,
        /// Optional hint for how to fix the template or variables
        hint: Option<String>,
    },

    #[error("Invalid variable `{name}`: {message}")]
    InvalidVariable { name: String, message: String },

    #[error("Path conflict at {}: {message}", path.display())]
    Conflict { path: PathBuf, message: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse configuration: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Failure category, independent of the variant carrying the details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Permission,
    TemplateNotFound,
    Render,
    Io,
    Config,
}

impl CoreError {
    /// Classify an IO error raised while operating on `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => CoreError::Permission { path, source },
            _ => CoreError::Io { path, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Permission { .. } => ErrorKind::Permission,
            CoreError::TemplateNotFound { .. } => ErrorKind::TemplateNotFound,
            CoreError::Render { .. } | CoreError::InvalidVariable { .. } => ErrorKind::Render,
            CoreError::Conflict { .. } | CoreError::Io { .. } => ErrorKind::Io,
            CoreError::InvalidConfig { .. } | CoreError::YamlParse(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

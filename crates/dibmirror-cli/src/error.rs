//! CLI error types with exit code handling
//!
//! Every failure a command can hit is mapped onto one `CliError` variant,
//! which decides both the diagnostic shown and the process exit code.

use dibmirror_core::{CoreError, ErrorKind};
use dibmirror_engine::EngineError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// A referenced template does not exist
    #[error("Template not found: {template}")]
    #[diagnostic(code(dibmirror::cli::template_not_found))]
    TemplateNotFound {
        template: String,
        #[help]
        help: Option<String>,
    },

    /// Template rendering failed
    #[error("Template error: {message}")]
    #[diagnostic(code(dibmirror::cli::template))]
    Template {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Rendering failed with a source-annotated diagnostic
    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] dibmirror_engine::TemplateError),

    /// Configuration, flags or variables are invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(dibmirror::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Permission denied on a directory or file
    #[error("{message}")]
    #[diagnostic(
        code(dibmirror::cli::permission),
        help("check ownership of the repo root or pass --root")
    )]
    Permission { message: String },

    /// IO error (disk full, path conflict, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(dibmirror::cli::io))]
    Io { message: String },

    /// Check mode found pending changes
    #[error("{count} path(s) would change")]
    #[diagnostic(code(dibmirror::cli::changes_pending))]
    ChangesPending { count: usize },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::TemplateNotFound { .. } | CliError::Template { .. } | CliError::Render(_) => {
                exit_codes::TEMPLATE_ERROR
            }
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Permission { .. } => exit_codes::PERMISSION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::ChangesPending { .. } => exit_codes::CHANGES_PENDING,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let kind = err.kind();
        match err {
            CoreError::TemplateNotFound {
                template,
                suggestions,
            } => CliError::TemplateNotFound {
                template,
                help: did_you_mean(&suggestions),
            },
            CoreError::Render {
                template,
                message,
                hint,
            } => CliError::Template {
                message: format!("{}: {}", template, message),
                help: hint,
            },
            other => match kind {
                ErrorKind::Permission => CliError::Permission {
                    message: other.to_string(),
                },
                ErrorKind::Io => CliError::Io {
                    message: other.to_string(),
                },
                ErrorKind::Render => CliError::Template {
                    message: other.to_string(),
                    help: None,
                },
                ErrorKind::Config | ErrorKind::TemplateNotFound => CliError::config(other.to_string()),
            },
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Template(te) => CliError::Render(te),
            other => CliError::from(CoreError::from(other)),
        }
    }
}

fn did_you_mean(suggestions: &[String]) -> Option<String> {
    match suggestions {
        [] => Some("run `dibmirror templates` to list available templates".to_string()),
        [one] => Some(format!("did you mean `{}`?", one)),
        many => Some(format!("did you mean one of: {}?", many.join(", "))),
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

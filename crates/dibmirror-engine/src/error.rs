//! Engine error types with source-annotated diagnostics

use dibmirror_core::CoreError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

use crate::suggestions::suggest_undefined_variable;

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template error")]
    Template(#[from] TemplateError),

    #[error("Template not found: {name}")]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Error kind for categorizing template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    SyntaxError,
    UnknownFilter,
    Other,
}

/// Template-specific error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(dibmirror::template::render))]
pub struct TemplateError {
    /// Error message
    pub message: String,

    /// Error kind for categorization
    pub kind: TemplateErrorKind,

    /// Template source code
    #[source_code]
    pub src: NamedSource<String>,

    /// Error location in source
    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    /// Suggestion for fixing the error
    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    /// Build from a MiniJinja error, using `variables` for suggestions
    pub fn from_minijinja(
        err: &minijinja::Error,
        template_name: &str,
        template_source: &str,
        variables: &[&str],
    ) -> Self {
        let kind = match err.kind() {
            minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
            minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
            minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
            _ => TemplateErrorKind::Other,
        };

        let undefined = match kind {
            TemplateErrorKind::UndefinedVariable => err
                .range()
                .and_then(|range| expression_at(template_source, range))
                .or_else(|| extract_expression_from_display(&format!("{:#}", err))),
            _ => None,
        };

        let message = match &undefined {
            Some(expr) => format!("undefined variable `{}`", expr),
            None => err
                .to_string()
                .replace("undefined value", "undefined variable")
                .replace("syntax error: ", ""),
        };

        let suggestion = match kind {
            TemplateErrorKind::UndefinedVariable => undefined
                .as_deref()
                .and_then(|expr| suggest_undefined_variable(expr, variables)),
            TemplateErrorKind::SyntaxError => Some(
                "Check bracket matching: `{{ }}` for expressions, `{% %}` for statements, `{# #}` for comments".to_string(),
            ),
            _ => None,
        };

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span: err
                .range()
                .filter(|range| range.end <= template_source.len())
                .map(|range| SourceSpan::new(range.start.into(), range.len()))
                .or_else(|| err.line().and_then(|line| calculate_span(template_source, line))),
            suggestion,
        }
    }

    #[cfg(test)]
    pub(crate) fn simple(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TemplateErrorKind::Other,
            src: NamedSource::new("<unknown>", String::new()),
            span: None,
            suggestion: None,
        }
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

impl From<EngineError> for CoreError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { name, suggestions } => CoreError::TemplateNotFound {
                template: name,
                suggestions,
            },
            EngineError::Template(te) => CoreError::Render {
                template: te.src.name().to_string(),
                message: te.message,
                hint: te.suggestion,
            },
            EngineError::Io { path, source } => CoreError::from_io(path, source),
        }
    }
}

/// Expression covered by `range` in the template source, without filters
fn expression_at(source: &str, range: Range<usize>) -> Option<String> {
    let text = source.get(range)?.trim();
    let text = text
        .strip_prefix("{{")
        .and_then(|t| t.strip_suffix("}}"))
        .unwrap_or(text);
    let expr = text.split('|').next().unwrap_or(text).trim();
    (!expr.is_empty()).then(|| expr.to_string())
}

/// Extract the problematic expression from MiniJinja's detailed display
fn extract_expression_from_display(display: &str) -> Option<String> {
    // MiniJinja format:
    //    3 > baseurl=http://{{ mirror_hots }}/centos/
    //      i                   ^^^^^^^^^^^ undefined value
    // The `>` marker shows the error line. Only used when the error carries
    // no byte range.

    for line in display.lines() {
        let trimmed = line.trim_start();
        if !(trimmed.contains(" > ") || trimmed.starts_with("> ")) {
            continue;
        }
        if let Some(start) = line.find("{{") {
            if let Some(end) = line[start..].find("}}") {
                let expr = line[start + 2..start + end].trim();
                // Drop any filter chain
                let expr_part = expr.split('|').next().unwrap_or(expr).trim();
                if !expr_part.is_empty() {
                    return Some(expr_part.to_string());
                }
            }
        }
    }

    None
}

/// Calculate the source span for a given line number
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let content = line.trim_end_matches(['\n', '\r']);
        if index + 1 == line_num {
            return Some(SourceSpan::new(offset.into(), content.len()));
        }
        offset += line.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibmirror_core::ErrorKind;

    #[test]
    fn test_calculate_span() {
        let source = "[base]\nbaseurl=x\n";
        let span = calculate_span(source, 2).unwrap();
        assert_eq!(span.offset(), 7);
        assert_eq!(span.len(), 9);
        assert!(calculate_span(source, 5).is_none());
    }

    #[test]
    fn test_calculate_span_crlf() {
        let source = "[base]\r\nname=Base\r\nbaseurl=x\r\n";
        let span = calculate_span(source, 3).unwrap();
        assert_eq!(span.offset(), 19);
        assert_eq!(span.len(), 9);
        assert_eq!(&source[19..28], "baseurl=x");
    }

    #[test]
    fn test_expression_at() {
        let source = "baseurl=http://{{ mirror_host }}/{{ relase | lower }}/";
        let start = source.find("relase").unwrap();
        assert_eq!(
            expression_at(source, start..start + 6).as_deref(),
            Some("relase")
        );

        let start = source.rfind("{{").unwrap();
        assert_eq!(
            expression_at(source, start..source.len() - 1).as_deref(),
            Some("relase")
        );
        assert!(expression_at(source, 500..510).is_none());
    }

    #[test]
    fn test_extract_expression() {
        let display = "   3 > baseurl=http://{{ mirror_hots | lower }}/\n     i ^^^ undefined value";
        assert_eq!(
            extract_expression_from_display(display).as_deref(),
            Some("mirror_hots")
        );
        assert!(extract_expression_from_display("no marker").is_none());
    }

    #[test]
    fn test_not_found_into_core() {
        let err: CoreError = EngineError::NotFound {
            name: "fedora-minimal/29/fedora.repo.j2".to_string(),
            suggestions: vec!["fedora-minimal/28/fedora.repo.j2".to_string()],
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[test]
    fn test_template_error_into_core_keeps_name_and_hint() {
        let mut te = TemplateError::simple("undefined variable `proxy`");
        te.src = NamedSource::new("centos-minimal/base.repo.j2", String::new());
        te.suggestion = Some("Pass --set proxy=VALUE".to_string());

        let err: CoreError = EngineError::Template(te).into();
        assert_eq!(err.kind(), ErrorKind::Render);
        let text = err.to_string();
        assert!(text.contains("centos-minimal/base.repo.j2"));
        assert!(text.contains("hint: Pass --set proxy=VALUE"));
    }
}

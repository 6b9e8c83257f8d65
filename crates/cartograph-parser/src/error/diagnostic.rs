//! The core diagnostic type for the Cartograph error system.
//!
//! A [`Diagnostic`] represents a single error or warning with an error
//! code, labeled spans, help text and the line it was raised on.

use std::fmt;

use crate::{
    error::{ErrorKind, Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// The logical line a diagnostic was raised on.
///
/// Spans of the diagnostic's labels are byte offsets into the file named by
/// `file` (the root source when `None`); `offset` is where the line starts in
/// that file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    file: Option<String>,
    number: usize,
    offset: usize,
    content: String,
}

impl SourceLine {
    pub fn new(file: Option<String>, number: usize, offset: usize, content: impl Into<String>) -> Self {
        Self {
            file,
            number,
            offset,
            content: content.into(),
        }
    }

    /// Included file the line comes from; `None` for the root source.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// 1-based number of the first physical line.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E200]: the element `unknownId` does not exist (line 14: unknownId "Some description")
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
    line: Option<SourceLine>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use cartograph_parser::error::{Diagnostic, ErrorCode};
    /// # use cartograph_parser::Span;
    ///
    /// let diag = Diagnostic::error("the element `db` does not exist")
    ///     .with_code(ErrorCode::E200)
    ///     .with_label(Span::new(5..7), "not found")
    ///     .with_help("declare `db` before referring to it");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Taxonomy of the diagnostic, derived from its code.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.code.map(|code| code.kind())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn line(&self) -> Option<&SourceLine> {
        self.line.as_ref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the offending line, unless one is already attached.
    pub fn with_line(mut self, line: SourceLine) -> Self {
        self.line.get_or_insert(line);
        self
    }

    /// Turn a warning into an error, keeping everything else.
    pub(crate) fn into_error(mut self) -> Self {
        self.severity = Severity::Error;
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            line: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message (line 3: content)"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(line) = &self.line {
            match line.file() {
                Some(file) => write!(f, " ({file} line {}: {})", line.number, line.content.trim())?,
                None => write!(f, " (line {}: {})", line.number, line.content.trim())?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert!(diag.line().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("the identifier `web` is already in use")
            .with_code(ErrorCode::E201)
            .with_label(Span::new(10..13), "duplicate identifier")
            .with_secondary_label(Span::new(0..3), "first declared here")
            .with_help("choose a different identifier");

        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.kind(), Some(ErrorKind::DuplicateIdentifier));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(diag.help(), Some("choose a different identifier"));
    }

    #[test]
    fn test_diagnostic_display_with_line() {
        let diag = Diagnostic::error("too many tokens")
            .with_code(ErrorCode::E101)
            .with_line(SourceLine::new(None, 12, 140, "a -> b x y z"));

        assert_eq!(
            diag.to_string(),
            "error[E101]: too many tokens (line 12: a -> b x y z)"
        );
    }

    #[test]
    fn test_diagnostic_display_in_included_file() {
        let diag = Diagnostic::warning("unknown style property `glow`")
            .with_line(SourceLine::new(Some("styles.dsl".to_string()), 3, 20, "glow true"));

        assert_eq!(
            diag.to_string(),
            "warning: unknown style property `glow` (styles.dsl line 3: glow true)"
        );
    }

    #[test]
    fn test_first_line_wins() {
        let diag = Diagnostic::error("e")
            .with_line(SourceLine::new(None, 1, 0, "inner"))
            .with_line(SourceLine::new(None, 9, 90, "outer"));

        assert_eq!(diag.line().map(SourceLine::number), Some(1));
    }
}

//! Error adapter for converting CartographError to miette diagnostics.
//!
//! This module provides the bridge between the library's error types and
//! miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! A [`cartograph_parser::error::ParseError`] holds the fatal diagnostic
//! followed by the warnings raised before it; each is rendered
//! independently. Diagnostics raised inside an included file carry spans
//! into that file, so they are rendered without a snippet of the root
//! source.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity, SourceSpan};

use cartograph::CartographError;
use cartograph_parser::error::Diagnostic;

/// Adapter for a single parser diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Root source, or `None` when the diagnostic points into another file
    src: Option<&'a str>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    ///
    /// `root` names the root source; a diagnostic whose source line names a
    /// different file is shown without a snippet.
    pub fn new(diag: &'a Diagnostic, src: &'a str, root: Option<&str>) -> Self {
        let file = diag.line().and_then(|line| line.file());
        let src = match file {
            Some(file) if Some(file) != root => None,
            _ => Some(src),
        };
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.src, self.diag.line()) {
            (None, Some(line)) => write!(
                f,
                "{} ({} line {})",
                self.diag.message(),
                line.file().unwrap_or_default(),
                line.number()
            ),
            _ => write!(f, "{}", self.diag.message()),
        }
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<Severity> {
        if self.diag.severity().is_warning() {
            Some(Severity::Warning)
        } else {
            Some(Severity::Error)
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() || self.src.is_none() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for non-diagnostic [`CartographError`] variants.
pub struct ErrorAdapter<'a>(pub &'a CartographError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CartographError::Io(_) | CartographError::Read { .. } => "cartograph::io",
            CartographError::Parse { .. } => return None,
            CartographError::Config(_) => "cartograph::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a parser [`Span`](cartograph_parser::Span) to a miette [`SourceSpan`].
fn span_to_miette(span: cartograph_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`CartographError`] into a list of reportable errors.
///
/// For [`CartographError::Parse`], this returns one [`Reportable`] for
/// each diagnostic in the error. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &CartographError) -> Vec<Reportable<'_>> {
    match err {
        CartographError::Parse {
            err: parse_err,
            src,
            name,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src, name.as_deref())))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use cartograph_parser::{
        Span,
        error::{ErrorCode, ParseError, SourceLine},
    };

    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("test error")
            .with_code(ErrorCode::E200)
            .with_label(Span::new(0..5), "here")
            .with_help("try this");
        let parse_err = ParseError::from(diag);
        let err = CartographError::new_parse_error(parse_err, "hello", None);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "test error");
                assert!(d.source_code().is_some());
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_error_followed_by_warnings() {
        let diags = vec![
            Diagnostic::error("first error")
                .with_code(ErrorCode::E200)
                .with_label(Span::new(0..5), "first"),
            Diagnostic::warning("a warning")
                .with_code(ErrorCode::W001)
                .with_label(Span::new(10..15), "second"),
        ];
        let parse_err = ParseError::from(diags);
        let err = CartographError::new_parse_error(parse_err, "source code here...", None);

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].severity(), Some(Severity::Error));
        assert_eq!(reportables[1].severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_included_file_diagnostic_has_no_snippet() {
        let diag = Diagnostic::error("the element `db` does not exist")
            .with_code(ErrorCode::E200)
            .with_label(Span::new(0..2), "not found")
            .with_line(SourceLine::new(Some("model.dsl".to_string()), 4, 0, "a -> db"));

        let adapter = DiagnosticAdapter::new(&diag, "workspace {", Some("workspace.dsl"));

        assert!(adapter.source_code().is_none());
        assert!(adapter.labels().is_none());
        assert_eq!(
            adapter.to_string(),
            "the element `db` does not exist (model.dsl line 4)"
        );
    }

    #[test]
    fn test_root_file_diagnostic_has_snippet() {
        let diag = Diagnostic::error("oops")
            .with_label(Span::new(0..2), "here")
            .with_line(SourceLine::new(Some("workspace.dsl".to_string()), 1, 0, "ab"));

        let adapter = DiagnosticAdapter::new(&diag, "ab", Some("workspace.dsl"));

        assert!(adapter.source_code().is_some());
        assert_eq!(adapter.labels().unwrap().count(), 1);
    }

    #[test]
    fn test_non_parse_error() {
        let err = CartographError::Config("bad config".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad config");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");

        let adapter = DiagnosticAdapter::new(&diag, "some source code", None);

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }
}

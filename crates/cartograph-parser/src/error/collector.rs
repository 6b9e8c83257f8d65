//! Collector for diagnostics raised while a workspace is interpreted.
//!
//! Warnings accumulate and parsing continues; the first error ends the
//! parse, and [`DiagnosticCollector::fail`] bundles it with the warnings
//! seen so far.

use log::warn;

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    warnings_as_errors: bool,
}

impl DiagnosticCollector {
    pub fn new(warnings_as_errors: bool) -> Self {
        Self {
            diagnostics: Vec::new(),
            warnings_as_errors,
        }
    }

    /// Record a warning.
    ///
    /// Returns the warning as an error instead when warnings are treated as
    /// errors.
    pub fn warn(&mut self, diagnostic: Diagnostic) -> Result<(), Diagnostic> {
        if self.warnings_as_errors {
            return Err(diagnostic.into_error());
        }
        warn!(diagnostic:% = diagnostic; "Parser warning");
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    /// Bundle a fatal error with the warnings collected so far.
    pub fn fail(mut self, error: Diagnostic) -> ParseError {
        self.diagnostics.insert(0, error);
        ParseError::new(self.diagnostics)
    }

    /// The collected warnings.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

//! Error and diagnostic system for the Cartograph DSL interpreter.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability, grouped into kinds
//! - Labeled spans plus the offending source line for context
//! - Severity levels
//! - A diagnostic collector that keeps warnings while parsing continues
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with an error code, labeled source
//! locations, help text and the logical line it was raised on. Diagnostics
//! are wrapped in [`ParseError`] when parsing fails.
//!
//! # Example
//!
//! ```
//! # use cartograph_parser::error::{Diagnostic, ErrorCode};
//! # use cartograph_parser::Span;
//!
//! let diag = Diagnostic::error("the identifier `api` is already in use")
//!     .with_code(ErrorCode::E201)
//!     .with_label(Span::new(0..3), "duplicate identifier")
//!     .with_help("choose a different identifier");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::{Diagnostic, SourceLine};
pub use error_code::{ErrorCode, ErrorKind};
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;

//! Error types for Cartograph operations.
//!
//! This module provides the main error type [`CartographError`] which wraps
//! the error conditions that can occur while a workspace is loaded.

use std::{io, path::PathBuf};

use thiserror::Error;

use cartograph_parser::error::ParseError;

/// The main error type for Cartograph operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the parser's diagnostics together with the
/// root source and its name, so callers can render labelled snippets.
/// Diagnostics raised inside an included file name that file in their
/// source line.
#[derive(Debug, Error)]
pub enum CartographError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{err}")]
    Parse {
        err: ParseError,
        src: String,
        name: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CartographError {
    /// Create a new `Parse` error with the associated root source.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>, name: Option<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            name,
        }
    }
}

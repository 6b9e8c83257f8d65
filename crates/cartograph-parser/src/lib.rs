//! # Cartograph Parser
//!
//! Interpreter for the Cartograph architecture DSL. This crate turns
//! workspace source text into a [`cartograph_core::Workspace`]: a model of
//! people, software systems, containers, components and deployment nodes,
//! the relationships between them, and the views drawn from them.
//!
//! ## Usage
//!
//! ```
//! # use cartograph_parser::{parse, ParseOptions, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         workspace "Internet Banking" {
//!             model {
//!                 customer = person "Customer"
//!                 bank = softwareSystem "Internet Banking System"
//!                 customer -> bank "Views account balances"
//!             }
//!             views {
//!                 systemContext bank "Context" {
//!                     include *
//!                     autoLayout lr
//!                 }
//!             }
//!         }
//!     "#;
//!
//!     let parsed = parse(source, ParseOptions::default())?;
//!     assert_eq!(parsed.workspace().name(), "Internet Banking");
//!     Ok(())
//! }
//! ```

mod adr;
mod context;
pub mod error;
pub mod include;
mod interpreter;
mod lexer;
mod parsers;
mod registry;
mod source;
mod span;
mod tokens;

pub use interpreter::Interpreter;
pub use span::Span;
pub use tokens::{Token, Tokens, quote};

use cartograph_core::{Workspace, identifier::IdentifierMode};

use error::{Diagnostic, ParseError};
use include::SourceResolver;

/// Options for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Identifier mode used until the source selects one with `!identifiers`.
    pub identifiers: IdentifierMode,
    /// Whether relationships between the ancestors of related elements are
    /// created automatically. `!impliedRelationships` overrides it.
    pub implied_relationships: bool,
    /// Restricted mode refuses `!include`.
    pub restricted: bool,
    /// Promote warnings to errors.
    pub warnings_as_errors: bool,
}

impl ParseOptions {
    pub fn new(
        identifiers: IdentifierMode,
        implied_relationships: bool,
        restricted: bool,
        warnings_as_errors: bool,
    ) -> Self {
        Self {
            identifiers,
            implied_relationships,
            restricted,
            warnings_as_errors,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(IdentifierMode::Flat, true, false, false)
    }
}

/// A successfully parsed workspace and the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct ParsedWorkspace {
    workspace: Workspace,
    warnings: Vec<Diagnostic>,
}

impl ParsedWorkspace {
    pub(crate) fn new(workspace: Workspace, warnings: Vec<Diagnostic>) -> Self {
        Self {
            workspace,
            warnings,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_workspace(self) -> Workspace {
        self.workspace
    }

    /// Splits into the workspace and its warnings.
    pub fn into_parts(self) -> (Workspace, Vec<Diagnostic>) {
        (self.workspace, self.warnings)
    }
}

/// Parse workspace source.
///
/// This is the main entry point. Source is interpreted in one pass:
///
/// 1. **Split** - Join continued lines and drop comments
/// 2. **Lex** - Split each logical line into tokens
/// 3. **Interpret** - Dispatch each statement on the innermost open block,
///    checking model invariants as elements and relationships are added
///
/// `!include` and `!adrs` are refused; use [`parse_with_resolver`] to allow them.
///
/// # Errors
///
/// Returns a [`ParseError`] holding the first fatal diagnostic, followed by
/// any warnings raised before it.
pub fn parse(source: &str, options: ParseOptions) -> Result<ParsedWorkspace, ParseError> {
    Interpreter::new(options).parse(source)
}

/// Parse workspace source, reading `!include` and `!adrs` targets through `resolver`.
pub fn parse_with_resolver(
    source: &str,
    options: ParseOptions,
    resolver: &dyn SourceResolver,
) -> Result<ParsedWorkspace, ParseError> {
    Interpreter::new(options)
        .with_resolver(resolver)
        .parse(source)
}

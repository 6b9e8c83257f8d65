//! Error codes for the Cartograph diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Source and lexer errors
//! - `E1xx` - Grammar errors
//! - `E2xx` - Identifier errors
//! - `E3xx` - Model and view errors
//! - `E9xx` - Internal errors
//! - `W0xx` - Warnings

use std::fmt;

/// The error taxonomy every code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed quoting or comments.
    Lex,
    /// Wrong token count or a statement not legal in the current block.
    Grammar,
    /// A name that resolves in no visible scope.
    UnknownIdentifier,
    DuplicateIdentifier,
    DuplicateRelationship,
    /// An operation on an element kind that does not support it.
    IllegalCapability,
    /// Any other violated model rule.
    Semantic,
    /// A dispatch that should have been exhaustive produced nothing.
    InternalConsistency,
    /// Advisory only.
    Advisory,
}

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Source and Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated quoted string.
    E001,

    /// Unterminated `/* ... */` block comment.
    E002,

    /// Failed to read an included source.
    E003,

    /// Include cycle, or an include in restricted mode.
    E004,

    // =========================================================================
    // Grammar Errors (E1xx)
    // =========================================================================
    /// The statement is not legal in the current block.
    E100,

    /// More tokens than the grammar allows.
    E101,

    /// Fewer tokens than the grammar requires.
    E102,

    /// A block was still open at the end of the source.
    E103,

    /// A `}` with no open block, or content after the workspace closed.
    E104,

    /// A token that is not an accepted value here.
    E105,

    // =========================================================================
    // Identifier Errors (E2xx)
    // =========================================================================
    /// The identifier does not resolve.
    E200,

    /// The identifier is already bound in a visible scope.
    E201,

    /// The identifier contains characters identifiers cannot use.
    E202,

    /// The identifier resolves to the wrong kind of thing.
    E203,

    // =========================================================================
    // Model and View Errors (E3xx)
    // =========================================================================
    /// An element with the same canonical name already exists.
    E300,

    /// A relationship with the same description already exists.
    E301,

    /// The element kind does not support this operation.
    E302,

    /// The element cannot be nested here.
    E303,

    /// The relationship is not permitted.
    E304,

    /// The element cannot be shown in this view.
    E305,

    /// The view key, scope or environment is invalid.
    E306,

    /// No model relationship backs a dynamic-view interaction.
    E307,

    /// An invalid URL, property or perspective.
    E308,

    /// An architecture decision record that cannot be read or linked.
    E309,

    // =========================================================================
    // Internal Errors (E9xx)
    // =========================================================================
    /// An exhaustive dispatch produced no result.
    E900,

    // =========================================================================
    // Warnings (W0xx)
    // =========================================================================
    /// Unknown style property.
    W001,

    /// Unknown property in the reserved `structurizr.` namespace.
    W002,

    /// Reference to an undefined constant.
    W003,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
            ErrorCode::E307 => "E307",
            ErrorCode::E308 => "E308",
            ErrorCode::E309 => "E309",
            ErrorCode::E900 => "E900",
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
            ErrorCode::W003 => "W003",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string",
            ErrorCode::E002 => "unterminated block comment",
            ErrorCode::E003 => "unreadable include",
            ErrorCode::E004 => "include not permitted",
            ErrorCode::E100 => "unexpected statement",
            ErrorCode::E101 => "too many tokens",
            ErrorCode::E102 => "missing tokens",
            ErrorCode::E103 => "unclosed block",
            ErrorCode::E104 => "unexpected closing brace",
            ErrorCode::E105 => "invalid value",
            ErrorCode::E200 => "unknown identifier",
            ErrorCode::E201 => "duplicate identifier",
            ErrorCode::E202 => "invalid identifier",
            ErrorCode::E203 => "wrong kind of identifier",
            ErrorCode::E300 => "duplicate element",
            ErrorCode::E301 => "duplicate relationship",
            ErrorCode::E302 => "unsupported by this element",
            ErrorCode::E303 => "illegal nesting",
            ErrorCode::E304 => "illegal relationship",
            ErrorCode::E305 => "not permitted in this view",
            ErrorCode::E306 => "invalid view",
            ErrorCode::E307 => "no backing relationship",
            ErrorCode::E308 => "invalid item metadata",
            ErrorCode::E309 => "invalid decision record",
            ErrorCode::E900 => "internal consistency",
            ErrorCode::W001 => "unknown style property",
            ErrorCode::W002 => "unknown reserved property",
            ErrorCode::W003 => "undefined constant",
        }
    }

    /// The taxonomy entry this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E001 | ErrorCode::E002 => ErrorKind::Lex,
            ErrorCode::E003 | ErrorCode::E004 => ErrorKind::Semantic,
            ErrorCode::E100
            | ErrorCode::E101
            | ErrorCode::E102
            | ErrorCode::E103
            | ErrorCode::E104
            | ErrorCode::E105 => ErrorKind::Grammar,
            ErrorCode::E200 => ErrorKind::UnknownIdentifier,
            ErrorCode::E201 | ErrorCode::E300 => ErrorKind::DuplicateIdentifier,
            ErrorCode::E202 => ErrorKind::Grammar,
            ErrorCode::E203 | ErrorCode::E302 | ErrorCode::E303 | ErrorCode::E305 => {
                ErrorKind::IllegalCapability
            }
            ErrorCode::E301 => ErrorKind::DuplicateRelationship,
            ErrorCode::E304
            | ErrorCode::E306
            | ErrorCode::E307
            | ErrorCode::E308
            | ErrorCode::E309 => ErrorKind::Semantic,
            ErrorCode::E900 => ErrorKind::InternalConsistency,
            ErrorCode::W001 | ErrorCode::W002 | ErrorCode::W003 => ErrorKind::Advisory,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

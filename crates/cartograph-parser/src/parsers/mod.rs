//! Statement grammars, one module per statement family.
//!
//! Each module adds methods to [`Interpreter`](crate::interpreter::Interpreter)
//! that parse one family of statements and report the block context the
//! statement opens, if any. The helpers here turn token-count mismatches and
//! model errors into diagnostics.

mod configuration;
mod dynamic_view;
mod element;
mod expression;
mod property;
mod relationship;
mod style;
mod view;
mod workspace;

use std::str::FromStr;

use cartograph_core::ModelError;

use crate::{
    context::Context,
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
    tokens::{Token, Tokens},
};

/// One logical line, lexed, with a trailing `{` removed.
#[derive(Debug, Clone)]
pub(crate) struct Statement {
    pub tokens: Tokens,
    /// Whether the line ended with `{`.
    pub opens_block: bool,
}

impl Statement {
    pub(crate) fn new(tokens: Tokens, opens_block: bool) -> Self {
        Self {
            tokens,
            opens_block,
        }
    }

    pub(crate) fn keyword(&self) -> &str {
        self.tokens.get_or_empty(0)
    }

    pub(crate) fn span(&self) -> Span {
        self.tokens.span_from(0)
    }

    /// The same statement with its first `count` tokens removed.
    pub(crate) fn skip(&self, count: usize) -> Statement {
        Statement::new(self.tokens.skip(count), self.opens_block)
    }
}

/// Error for a line with tokens past `max_index`.
pub(crate) fn too_many_tokens(tokens: &Tokens, max_index: usize, grammar: &str) -> Diagnostic {
    Diagnostic::error(format!("too many tokens, expected: {grammar}"))
        .with_code(ErrorCode::E101)
        .with_label(tokens.span_from(max_index + 1), "unexpected tokens")
}

/// Error for a line that stops before a required token.
pub(crate) fn expected(tokens: &Tokens, grammar: &str) -> Diagnostic {
    Diagnostic::error(format!("expected: {grammar}"))
        .with_code(ErrorCode::E102)
        .with_label(tokens.span(tokens.len()), "missing tokens")
}

/// Checks that tokens exist up to `required_index` and not past `max_index`.
pub(crate) fn check_tokens(
    tokens: &Tokens,
    required_index: usize,
    max_index: usize,
    grammar: &str,
) -> Result<()> {
    if tokens.has_more_than(max_index) {
        return Err(too_many_tokens(tokens, max_index, grammar));
    }
    if !tokens.includes(required_index) {
        return Err(expected(tokens, grammar));
    }
    Ok(())
}

/// Statements that only make sense with a body must end in `{`.
pub(crate) fn require_block(statement: &Statement, grammar: &str) -> Result<()> {
    if statement.opens_block {
        Ok(())
    } else {
        Err(Diagnostic::error(format!("expected: {grammar}"))
            .with_code(ErrorCode::E102)
            .with_label(statement.tokens.span(statement.tokens.len()), "missing `{`"))
    }
}

pub(crate) fn unexpected_statement(statement: &Statement, context: Option<&Context>) -> Diagnostic {
    let keyword = statement.keyword();
    let message = match context {
        Some(context) => format!("unexpected statement `{keyword}` in a {context} block"),
        None => format!("unexpected statement `{keyword}`, expected a workspace"),
    };
    Diagnostic::error(message)
        .with_code(ErrorCode::E100)
        .with_label(statement.tokens.span(0), "not permitted here")
}

pub(crate) fn invalid_value(token: Option<&Token>, message: impl Into<String>) -> Diagnostic {
    let diag = Diagnostic::error(message).with_code(ErrorCode::E105);
    match token {
        Some(token) => diag.with_label(token.span(), "invalid value"),
        None => diag,
    }
}

/// Parses `true` or `false`.
pub(crate) fn parse_bool(tokens: &Tokens, index: usize) -> Result<bool> {
    let text = tokens.get_or_empty(index);
    match text.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid_value(
            tokens.token(index),
            format!("`{text}` is not a valid boolean, expected `true` or `false`"),
        )),
    }
}

/// Parses the token at `index` with [`FromStr`], reporting E105 on failure.
pub(crate) fn parse_value<T: FromStr>(tokens: &Tokens, index: usize, what: &str) -> Result<T> {
    let text = tokens.get_or_empty(index);
    text.parse::<T>().map_err(|_| {
        invalid_value(
            tokens.token(index),
            format!("`{text}` is not a valid {what}"),
        )
    })
}

/// Parses the token at `index` with a `FromStr` whose error is a message.
pub(crate) fn parse_keyword<T: FromStr<Err = String>>(tokens: &Tokens, index: usize) -> Result<T> {
    tokens
        .get_or_empty(index)
        .parse::<T>()
        .map_err(|message| invalid_value(tokens.token(index), message))
}

/// Maps a rejected model insertion to a diagnostic on `span`.
pub(crate) fn model_error(err: ModelError, span: Span) -> Diagnostic {
    let code = match &err {
        ModelError::DuplicateElement { .. } | ModelError::DuplicateInstance { .. } => {
            ErrorCode::E300
        }
        ModelError::DuplicateRelationship { .. } => ErrorCode::E301,
        ModelError::UnsupportedProperty { .. } => ErrorCode::E302,
        ModelError::IllegalNesting { .. } | ModelError::MissingParent(_) => ErrorCode::E303,
        ModelError::SelfRelationship(_) | ModelError::ParentChildRelationship { .. } => {
            ErrorCode::E304
        }
        ModelError::IllegalViewElement { .. } | ModelError::ViewScopeElement(_) => ErrorCode::E305,
        ModelError::InvalidViewScope { .. }
        | ModelError::MissingViewScope(_)
        | ModelError::MissingEnvironment
        | ModelError::DuplicateViewKey(_)
        | ModelError::InvalidViewKey(_)
        | ModelError::UnknownView(_)
        | ModelError::UnsupportedViewOperation { .. } => ErrorCode::E306,
        ModelError::MissingRelationship { .. } => ErrorCode::E307,
        ModelError::InvalidUrl(_)
        | ModelError::InvalidProperty(_)
        | ModelError::InvalidPerspective(_)
        | ModelError::DuplicatePerspective(_) => ErrorCode::E308,
        ModelError::DuplicateDecision(_)
        | ModelError::UnknownDecision { .. }
        | ModelError::InvalidDecision(_) => ErrorCode::E309,
        ModelError::UnknownElement(_) | ModelError::UnknownRelationship(_) => ErrorCode::E900,
    };
    Diagnostic::error(err.to_string())
        .with_code(code)
        .with_label(span, code.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, lexer::tokenize};

    #[test]
    fn test_check_tokens() {
        let tokens = tokenize("a -> b desc tech extra", 0).unwrap();

        let err = check_tokens(&tokens, 2, 4, "<a> -> <b> [d] [t]").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert_eq!(err.message(), "too many tokens, expected: <a> -> <b> [d] [t]");
        assert_eq!(err.labels()[0].span(), Span::new(17..22));

        let short = tokenize("a ->", 0).unwrap();
        let err = check_tokens(&short, 2, 4, "<a> -> <b>").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_parse_bool() {
        let tokens = tokenize("x true FALSE maybe", 0).unwrap();

        assert!(parse_bool(&tokens, 1).unwrap());
        assert!(!parse_bool(&tokens, 2).unwrap());
        assert_eq!(parse_bool(&tokens, 3).unwrap_err().code(), Some(ErrorCode::E105));
    }

    #[test]
    fn test_model_error_kinds() {
        let span = Span::new(0..1);

        let duplicate = model_error(
            ModelError::DuplicateRelationship {
                from: "a".to_string(),
                to: "b".to_string(),
                description: "Uses".to_string(),
            },
            span,
        );
        assert_eq!(duplicate.kind(), Some(ErrorKind::DuplicateRelationship));

        let illegal = model_error(ModelError::ViewScopeElement("Bank".to_string()), span);
        assert_eq!(illegal.kind(), Some(ErrorKind::IllegalCapability));

        let internal = model_error(ModelError::UnknownElement(9), span);
        assert_eq!(internal.kind(), Some(ErrorKind::InternalConsistency));
    }
}

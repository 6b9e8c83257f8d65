//! Relationship declarations and relationship bodies.

use cartograph_core::{ItemRef, model::RelationshipId};
use log::debug;

use super::{Statement, check_tokens, expected, model_error};
use crate::{
    context::Context,
    error::{Diagnostic, ErrorCode, Result},
    interpreter::Interpreter,
    registry::Binding,
    tokens::{RELATIONSHIP_TOKEN, Token, Tokens},
};

const EXPLICIT_GRAMMAR: &str =
    "<identifier> -> <identifier> [description] [technology] [tags] [{]";
const IMPLICIT_GRAMMAR: &str = "-> <identifier> [description] [technology] [tags] [{]";

impl Interpreter<'_> {
    /// Parses `source -> destination ...`, or `-> destination ...` inside an
    /// element body.
    pub(crate) fn parse_relationship(
        &mut self,
        identifier: Option<&Token>,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        let (source, rest) = if tokens.is_at(0, RELATIONSHIP_TOKEN) {
            check_tokens(tokens, 1, 4, IMPLICIT_GRAMMAR)?;
            let Some(source) = self.stack.enclosing_element() else {
                return Err(Diagnostic::error(
                    "a relationship without a source must be declared inside an element",
                )
                .with_code(ErrorCode::E100)
                .with_label(tokens.span(0), "no enclosing element")
                .with_help(format!("expected: {EXPLICIT_GRAMMAR}")));
            };
            (source, tokens.skip(1))
        } else {
            check_tokens(tokens, 2, 5, EXPLICIT_GRAMMAR)?;
            let Some(token) = tokens.token(0) else {
                return Err(expected(tokens, EXPLICIT_GRAMMAR));
            };
            (self.resolve_element(token, "source element")?, tokens.skip(2))
        };

        // `rest` is: destination [description] [technology] [tags]
        let Some(destination_token) = rest.token(0) else {
            return Err(expected(tokens, EXPLICIT_GRAMMAR));
        };
        let destination = self.resolve_element(destination_token, "destination element")?;
        let id = self
            .builder
            .add_relationship(
                source,
                destination,
                rest.get_or_empty(1),
                rest.get_or_empty(2),
            )
            .map_err(|err| model_error(err, tokens.span_from(0)))?;
        self.tag_relationship(id, &rest)?;
        self.bind(identifier, Binding::Relationship(id))?;

        debug!(
            source = source.index(),
            destination = destination.index(),
            description = rest.get_or_empty(1);
            "Relationship declared"
        );
        Ok(Some(Context::Relationship(id)))
    }

    fn tag_relationship(&mut self, id: RelationshipId, rest: &Tokens) -> Result<()> {
        match rest.token(3).filter(|t| !t.text().is_empty()) {
            Some(tags) => self
                .builder
                .add_tags(ItemRef::Relationship(id), tags.text())
                .map_err(|err| model_error(err, tags.span())),
            None => Ok(()),
        }
    }

    pub(crate) fn parse_relationship_body(
        &mut self,
        relationship: RelationshipId,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        self.parse_item_statement(ItemRef::Relationship(relationship), statement)
    }
}

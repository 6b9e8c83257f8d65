//! Dynamic view bodies.
//!
//! A content line takes one of two shapes:
//!
//! ```text
//! [order:] <identifier> -> <identifier> [description] [technology]
//! [order:] <relationship identifier> [description]
//! ```
//!
//! The optional `order:` token is removed first. The line is then the first
//! shape exactly when its second token is `->`, so the first token is only
//! resolved once it is known to name an element or a relationship.

use cartograph_core::{model::ElementKind, view::Participant};
use log::trace;

use super::{Statement, expected, model_error, too_many_tokens};
use crate::{
    context::Context,
    error::{Diagnostic, ErrorCode, Result},
    interpreter::Interpreter,
    tokens::{RELATIONSHIP_TOKEN, Token},
};

const INTERACTION_GRAMMAR: &str =
    "[order:] <identifier> -> <identifier> [description] [technology]";
const RELATIONSHIP_GRAMMAR: &str = "[order:] <identifier> [description]";

const ORDER_DELIMITER: char = ':';

const SOURCE_INDEX: usize = 0;
const DESTINATION_INDEX: usize = 2;
const DESCRIPTION_INDEX: usize = 3;
const TECHNOLOGY_INDEX: usize = 4;

const RELATIONSHIP_INDEX: usize = 0;

impl Interpreter<'_> {
    pub(crate) fn parse_dynamic_view_statement(
        &mut self,
        key: &str,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        let is_content = tokens.is_at(1, RELATIONSHIP_TOKEN)
            || tokens.get_or_empty(0).ends_with(ORDER_DELIMITER);
        if !is_content {
            match statement.keyword() {
                "include" | "exclude" => {
                    return Err(Diagnostic::error(format!(
                        "`{}` is not permitted in a dynamic view",
                        statement.keyword()
                    ))
                    .with_code(ErrorCode::E305)
                    .with_label(tokens.span(0), "not permitted here")
                    .with_help(format!(
                        "list interactions instead, e.g. {INTERACTION_GRAMMAR}"
                    )));
                }
                "title" | "description" | "autoLayout" | "autolayout" | "properties" => {
                    return self.parse_view_setting(
                        key,
                        statement,
                        &Context::DynamicView(key.to_string()),
                    );
                }
                _ => {}
            }
        }

        self.parse_dynamic_content(key, statement)?;
        Ok(None)
    }

    /// Opens a `{ ... }` block of interactions that happen in parallel.
    pub(crate) fn start_parallel_sequence(
        &mut self,
        key: &str,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        if !statement.opens_block {
            return Err(expected(&statement.tokens, INTERACTION_GRAMMAR));
        }
        self.builder
            .start_parallel_sequence(key)
            .map_err(|err| model_error(err, statement.span()))?;
        trace!(key = key; "Parallel sequence started");
        Ok(Some(Context::ParallelSequence(key.to_string())))
    }

    fn parse_dynamic_content(&mut self, key: &str, statement: &Statement) -> Result<()> {
        let order = statement
            .tokens
            .get(0)
            .and_then(|first| first.strip_suffix(ORDER_DELIMITER))
            .map(str::to_string);
        let tokens = if order.is_some() {
            statement.tokens.skip(1)
        } else {
            statement.tokens.clone()
        };
        let order = order.as_deref().filter(|o| !o.is_empty());
        let span = tokens.span_from(0);

        if tokens.len() > 1 && tokens.is_at(1, RELATIONSHIP_TOKEN) {
            if tokens.has_more_than(TECHNOLOGY_INDEX) {
                return Err(too_many_tokens(&tokens, TECHNOLOGY_INDEX, INTERACTION_GRAMMAR));
            }
            if !tokens.includes(DESTINATION_INDEX) {
                return Err(expected(&tokens, INTERACTION_GRAMMAR));
            }

            let source = self.participant(tokens.token(SOURCE_INDEX), "source element")?;
            let destination =
                self.participant(tokens.token(DESTINATION_INDEX), "destination element")?;
            let description = tokens.get(DESCRIPTION_INDEX).unwrap_or_default();
            let technology = tokens.get(TECHNOLOGY_INDEX).unwrap_or_default();

            trace!(
                key = key,
                order:? = order,
                description = description;
                "Dynamic interaction"
            );
            self.builder
                .add_dynamic_interaction(key, source, destination, description, technology, order)
                .map_err(|err| model_error(err, span))
        } else {
            let Some(token) = tokens.token(RELATIONSHIP_INDEX) else {
                return Err(expected(&tokens, RELATIONSHIP_GRAMMAR));
            };
            if tokens.has_more_than(RELATIONSHIP_INDEX + 1) {
                return Err(too_many_tokens(
                    &tokens,
                    RELATIONSHIP_INDEX + 1,
                    RELATIONSHIP_GRAMMAR,
                ));
            }
            let relationship = self.resolve_relationship(token)?;
            let description = tokens.get(RELATIONSHIP_INDEX + 1).unwrap_or_default();

            trace!(key = key, order:? = order; "Dynamic relationship");
            self.builder
                .add_dynamic_relationship(key, relationship, description, order)
                .map_err(|err| model_error(err, span))
        }
    }

    /// Resolves an interaction endpoint, which must be a static structure
    /// element or a custom element.
    fn participant(&self, token: Option<&Token>, role: &str) -> Result<Participant> {
        let Some(token) = token else {
            return Err(Diagnostic::error(format!("expected: {INTERACTION_GRAMMAR}"))
                .with_code(ErrorCode::E102));
        };
        let id = self.resolve_element(token, role)?;
        let kind = self
            .builder
            .element(id)
            .map_err(|err| model_error(err, token.span()))?
            .kind();

        if kind.is_static_structure() {
            Ok(Participant::StaticStructure(id))
        } else if kind == ElementKind::CustomElement {
            Ok(Participant::Custom(id))
        } else {
            Err(Diagnostic::error(format!(
                "the {role} `{}` should be a static structure or custom element",
                token.text()
            ))
            .with_code(ErrorCode::E203)
            .with_label(token.span(), format!("a {} cannot take part", kind.keyword()))
            .with_help(format!("expected: {INTERACTION_GRAMMAR}")))
        }
    }
}

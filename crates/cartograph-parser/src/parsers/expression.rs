//! `include` and `exclude` expressions of static views.
//!
//! An expression is `*`, an identifier, a filter such as
//! `element.tag==Database` or a coupling form such as `->api->`. A statement
//! of exactly `<source> -> <destination>` (either side may be `*`) selects the
//! relationships between two elements.

use cartograph_core::{
    ModelError, WorkspaceBuilder,
    model::{ElementId, ElementKind, Model, RelationshipId},
    view::View,
};
use log::trace;

use super::{expected, invalid_value, model_error};
use crate::{
    error::Result,
    interpreter::{Interpreter, unknown_identifier},
    registry::Binding,
    span::Span,
    tokens::{RELATIONSHIP_TOKEN, Token, Tokens},
};

const WILDCARD: &str = "*";
const ALL_RELATIONSHIPS: &str = "relationship==*";

/// Which relationships of an element a coupling expression follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// `->id`: relationships into the element.
    Afferent,
    /// `id->`: relationships out of the element.
    Efferent,
    /// `->id->`
    Both,
}

impl Direction {
    fn follows(self, element: ElementId, source: ElementId, destination: ElementId) -> bool {
        match self {
            Direction::Afferent => destination == element,
            Direction::Efferent => source == element,
            Direction::Both => source == element || destination == element,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expression {
    All,
    ElementTags { tags: Vec<String>, negated: bool },
    ElementType { kind: ElementKind, negated: bool },
    RelationshipTags { tags: Vec<String>, negated: bool },
    AllRelationships,
    Coupled {
        element: ElementId,
        direction: Direction,
    },
    Element(ElementId),
    Relationship(RelationshipId),
    /// `source -> destination`; `None` matches any element.
    Between {
        source: Option<ElementId>,
        destination: Option<ElementId>,
    },
}

/// Splits `element.tag==a,b` into its value and whether it is negated.
fn filter<'t>(text: &'t str, property: &str) -> Option<(&'t str, bool)> {
    let rest = text.strip_prefix(property)?;
    match rest.strip_prefix("==") {
        Some(value) => Some((value, false)),
        None => rest.strip_prefix("!=").map(|value| (value, true)),
    }
}

fn tag_list(token: &Token, value: &str) -> Result<Vec<String>> {
    let tags: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        return Err(invalid_value(Some(token), "expected at least one tag"));
    }
    Ok(tags)
}

fn has_any_tag(tags: &[String], has_tag: impl Fn(&str) -> bool) -> bool {
    tags.iter().any(|t| has_tag(t))
}

impl Interpreter<'_> {
    pub(crate) fn parse_expressions(&self, tokens: &Tokens) -> Result<Vec<(Expression, Span)>> {
        if tokens.len() == 3 && tokens.is_at(1, RELATIONSHIP_TOKEN) {
            let endpoint = |index: usize, role: &str| -> Result<Option<ElementId>> {
                let Some(token) = tokens.token(index) else {
                    return Err(expected(tokens, "<identifier|*> -> <identifier|*>"));
                };
                if token.is(WILDCARD) {
                    Ok(None)
                } else {
                    self.resolve_element(token, role).map(Some)
                }
            };
            let between = Expression::Between {
                source: endpoint(0, "source element")?,
                destination: endpoint(2, "destination element")?,
            };
            return Ok(vec![(between, tokens.span_from(0))]);
        }

        tokens
            .iter()
            .map(|token| Ok((self.parse_expression(token)?, token.span())))
            .collect()
    }

    fn parse_expression(&self, token: &Token) -> Result<Expression> {
        let text = token.text();
        if token.is(WILDCARD) {
            return Ok(Expression::All);
        }
        if text == ALL_RELATIONSHIPS {
            return Ok(Expression::AllRelationships);
        }
        if let Some((value, negated)) = filter(text, "element.tag") {
            let tags = tag_list(token, value)?;
            return Ok(Expression::ElementTags { tags, negated });
        }
        if let Some((value, negated)) = filter(text, "element.type") {
            let kind = value
                .parse::<ElementKind>()
                .map_err(|message| invalid_value(Some(token), message))?;
            return Ok(Expression::ElementType { kind, negated });
        }
        if let Some((value, negated)) = filter(text, "relationship.tag") {
            let tags = tag_list(token, value)?;
            return Ok(Expression::RelationshipTags { tags, negated });
        }
        if token.is(RELATIONSHIP_TOKEN) {
            return Err(invalid_value(
                Some(token),
                "`->` must sit between exactly two identifiers",
            ));
        }

        let afferent = text.strip_prefix(RELATIONSHIP_TOKEN);
        let efferent = text.strip_suffix(RELATIONSHIP_TOKEN);
        let coupling = match (afferent, efferent) {
            (Some(inner), Some(_)) if inner.len() > RELATIONSHIP_TOKEN.len() => Some((
                &inner[..inner.len() - RELATIONSHIP_TOKEN.len()],
                Direction::Both,
            )),
            (Some(name), _) => Some((name, Direction::Afferent)),
            (None, Some(name)) => Some((name, Direction::Efferent)),
            (None, None) => None,
        };
        if let Some((name, direction)) = coupling {
            let element = self.resolve_element(
                &Token::new(name, token.span(), token.is_quoted()),
                "element",
            )?;
            return Ok(Expression::Coupled { element, direction });
        }

        match self.resolve(token) {
            Some(Binding::Element(element)) => Ok(Expression::Element(element)),
            Some(Binding::Relationship(relationship)) => Ok(Expression::Relationship(relationship)),
            None => Err(unknown_identifier(token, "element or relationship")),
        }
    }

    pub(crate) fn include_expressions(&mut self, key: &str, tokens: &Tokens) -> Result<()> {
        for (expression, span) in self.parse_expressions(tokens)? {
            trace!(key = key, expression:? = expression; "Including in view");
            self.include_expression(key, &expression)
                .map_err(|err| model_error(err, span))?;
        }
        Ok(())
    }

    pub(crate) fn exclude_expressions(&mut self, key: &str, tokens: &Tokens) -> Result<()> {
        for (expression, span) in self.parse_expressions(tokens)? {
            trace!(key = key, expression:? = expression; "Excluding from view");
            self.exclude_expression(key, &expression)
                .map_err(|err| model_error(err, span))?;
        }
        Ok(())
    }

    /// Explicit identifiers must be showable in the view; elements picked by
    /// a filter are skipped when they are not. Relationship filters only
    /// pick relationships between elements already shown.
    fn include_expression(
        &mut self,
        key: &str,
        expression: &Expression,
    ) -> std::result::Result<(), ModelError> {
        let model = self.builder.model();
        match expression {
            Expression::All => self.builder.include_default_elements(key),
            Expression::ElementTags { tags, negated } => {
                let ids = model
                    .elements()
                    .filter(|e| has_any_tag(tags, |t| e.has_tag(t)) != *negated)
                    .map(|e| e.id())
                    .collect();
                self.include_eligible(key, ids)
            }
            Expression::ElementType { kind, negated } => {
                let ids = model
                    .elements()
                    .filter(|e| (e.kind() == *kind) != *negated)
                    .map(|e| e.id())
                    .collect();
                self.include_eligible(key, ids)
            }
            Expression::RelationshipTags { .. } | Expression::AllRelationships => {
                let view = find_view(&self.builder, key)?;
                let ids: Vec<RelationshipId> = model
                    .relationships()
                    .filter(|r| view.contains_element(r.source()))
                    .filter(|r| view.contains_element(r.destination()))
                    .filter(|r| relationship_matches(model, expression, r.id()))
                    .map(|r| r.id())
                    .collect();
                ids.into_iter()
                    .try_for_each(|id| self.builder.include_relationship(key, id))
            }
            Expression::Coupled { element, direction } => {
                let element = *element;
                let others = model
                    .relationships()
                    .filter(|r| direction.follows(element, r.source(), r.destination()))
                    .map(|r| {
                        if r.source() == element {
                            r.destination()
                        } else {
                            r.source()
                        }
                    })
                    .collect();
                self.builder.include_element(key, element)?;
                self.include_eligible(key, others)
            }
            Expression::Element(element) => self.builder.include_element(key, *element),
            Expression::Relationship(relationship) => {
                self.builder.include_relationship(key, *relationship)
            }
            Expression::Between {
                source,
                destination,
            } => {
                let ids: Vec<RelationshipId> = model
                    .relationships()
                    .filter(|r| source.is_none_or(|s| s == r.source()))
                    .filter(|r| destination.is_none_or(|d| d == r.destination()))
                    .filter(|r| {
                        self.builder.can_include(key, r.source())
                            && self.builder.can_include(key, r.destination())
                    })
                    .map(|r| r.id())
                    .collect();
                ids.into_iter()
                    .try_for_each(|id| self.builder.include_relationship(key, id))
            }
        }
    }

    fn include_eligible(
        &mut self,
        key: &str,
        ids: Vec<ElementId>,
    ) -> std::result::Result<(), ModelError> {
        for id in ids {
            if self.builder.can_include(key, id) {
                self.builder.include_element(key, id)?;
            }
        }
        Ok(())
    }

    fn exclude_expression(
        &mut self,
        key: &str,
        expression: &Expression,
    ) -> std::result::Result<(), ModelError> {
        let model = self.builder.model();
        let view = find_view(&self.builder, key)?;

        let element_matches = |id: ElementId| -> bool {
            let Some(element) = model.element(id) else {
                return false;
            };
            match expression {
                Expression::All => true,
                Expression::ElementTags { tags, negated } => {
                    has_any_tag(tags, |t| element.has_tag(t)) != *negated
                }
                Expression::ElementType { kind, negated } => (element.kind() == *kind) != *negated,
                Expression::Element(target) => *target == id,
                _ => false,
            }
        };
        let elements: Vec<ElementId> = view.elements().filter(|id| element_matches(*id)).collect();
        let relationships: Vec<RelationshipId> = view
            .relationships()
            .iter()
            .filter(|r| match expression {
                Expression::Coupled { element, direction } => {
                    direction.follows(*element, r.source(), r.destination())
                }
                Expression::Between {
                    source,
                    destination,
                } => {
                    source.is_none_or(|s| s == r.source())
                        && destination.is_none_or(|d| d == r.destination())
                }
                Expression::Relationship(relationship) => *relationship == r.relationship(),
                _ => relationship_matches(model, expression, r.relationship()),
            })
            .map(|r| r.relationship())
            .collect();

        for id in elements {
            self.builder.exclude_element(key, id)?;
        }
        for id in relationships {
            self.builder.exclude_relationship(key, id)?;
        }
        Ok(())
    }
}

fn find_view<'b>(
    builder: &'b WorkspaceBuilder,
    key: &str,
) -> std::result::Result<&'b View, ModelError> {
    builder
        .views()
        .view(key)
        .ok_or_else(|| ModelError::UnknownView(key.to_string()))
}

/// Whether a relationship filter selects `id`.
fn relationship_matches(model: &Model, expression: &Expression, id: RelationshipId) -> bool {
    let Some(relationship) = model.relationship(id) else {
        return false;
    };
    match expression {
        Expression::AllRelationships => true,
        Expression::RelationshipTags { tags, negated } => {
            has_any_tag(tags, |t| relationship.has_tag(t)) != *negated
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter() {
        assert_eq!(filter("element.tag==Database", "element.tag"), Some(("Database", false)));
        assert_eq!(filter("element.tag!=a,b", "element.tag"), Some(("a,b", true)));
        assert_eq!(filter("element.type==Person", "element.tag"), None);
        assert_eq!(filter("element.tag", "element.tag"), None);
    }

    #[test]
    fn test_direction_follows() {
        let mut builder = WorkspaceBuilder::default();
        let a = builder.add_person("User", None).unwrap();
        let b = builder.add_software_system("Bank", None).unwrap();

        assert!(Direction::Afferent.follows(b, a, b));
        assert!(!Direction::Afferent.follows(a, a, b));
        assert!(Direction::Efferent.follows(a, a, b));
        assert!(Direction::Both.follows(b, a, b));
    }
}

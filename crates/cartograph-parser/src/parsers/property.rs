//! `properties` and `perspectives` block bodies.

use cartograph_core::{ItemRef, model::Perspective};

use super::{Statement, check_tokens, model_error};
use crate::{
    context::{Context, PropertyTarget},
    error::{Diagnostic, ErrorCode, Result},
    interpreter::Interpreter,
};

/// Prefix of property names reserved for the tooling.
const RESERVED_PREFIX: &str = "structurizr.";

/// Reserved property names that are understood.
const KNOWN_PROPERTIES: &[&str] = &[
    "structurizr.groupSeparator",
    "structurizr.recommendations",
    "structurizr.dsl.identifier",
    "structurizr.locale",
    "structurizr.timezone",
    "structurizr.sort",
    "structurizr.tooltips",
    "structurizr.title",
    "structurizr.style",
    "structurizr.softwareSystemBoundaries",
    "structurizr.enterpriseBoundary",
    "structurizr.metadata",
    "structurizr.description",
];

/// Reserved prefixes under which any name is understood.
const KNOWN_PREFIXES: &[&str] = &["structurizr.inspection."];

fn is_known_property(name: &str) -> bool {
    !name.starts_with(RESERVED_PREFIX)
        || KNOWN_PROPERTIES.contains(&name)
        || KNOWN_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

impl Interpreter<'_> {
    pub(crate) fn parse_property(
        &mut self,
        target: &PropertyTarget,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        check_tokens(tokens, 1, 1, "<name> <value>")?;
        let (name, value) = (tokens.get_or_empty(0), tokens.get_or_empty(1));

        if !is_known_property(name) {
            self.warn(
                Diagnostic::warning(format!("`{name}` is not a recognised property"))
                    .with_code(ErrorCode::W002)
                    .with_label(tokens.span(0), "unrecognised")
                    .with_help("names starting with `structurizr.` are reserved"),
            )?;
        }

        let span = tokens.span_from(0);
        match target {
            PropertyTarget::Workspace => self.builder.add_workspace_property(name, value),
            PropertyTarget::Model => self.builder.add_model_property(name, value),
            PropertyTarget::Item(item) => self.builder.add_property(*item, name, value),
            PropertyTarget::View(key) => self.builder.add_view_property(key, name, value),
            PropertyTarget::Views => self.builder.add_views_property(name, value),
            PropertyTarget::ElementStyle(tag) => {
                self.builder.element_style_mut(tag).add_property(name, value);
                Ok(())
            }
            PropertyTarget::RelationshipStyle(tag) => {
                self.builder
                    .relationship_style_mut(tag)
                    .add_property(name, value);
                Ok(())
            }
        }
        .map_err(|err| model_error(err, span))?;
        Ok(None)
    }

    pub(crate) fn parse_perspective(
        &mut self,
        item: ItemRef,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        check_tokens(tokens, 1, 2, "<name> <description> [value]")?;
        let perspective = Perspective::new(
            tokens.get_or_empty(0),
            tokens.get_or_empty(1),
            tokens.get(2).map(str::to_string),
        );
        self.builder
            .add_perspective(item, perspective)
            .map_err(|err| model_error(err, tokens.span_from(0)))?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_properties() {
        assert!(is_known_property("owner"));
        assert!(is_known_property("structurizr.groupSeparator"));
        assert!(is_known_property("structurizr.inspection.model.component.description"));
        assert!(!is_known_property("structurizr.glow"));
    }
}

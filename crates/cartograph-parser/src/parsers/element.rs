//! Statements of the `model` block and of element bodies: element
//! declarations, groups, deployment environments and element properties.

use cartograph_core::{
    ItemRef,
    model::{ElementId, ElementKind},
};
use log::debug;

use super::{
    Statement, check_tokens, expected, invalid_value, model_error, require_block,
    unexpected_statement,
};
use crate::{
    context::{Context, PropertyTarget},
    error::{Diagnostic, ErrorCode, Result},
    interpreter::{Interpreter, registry_error},
    registry::{Binding, RegistryError, is_valid_identifier},
    tokens::{ASSIGNMENT_TOKEN, RELATIONSHIP_TOKEN, Token, Tokens},
};

const ELEMENT_KINDS: [ElementKind; 9] = [
    ElementKind::Person,
    ElementKind::SoftwareSystem,
    ElementKind::Container,
    ElementKind::Component,
    ElementKind::CustomElement,
    ElementKind::DeploymentNode,
    ElementKind::InfrastructureNode,
    ElementKind::SoftwareSystemInstance,
    ElementKind::ContainerInstance,
];

/// Positions of the optional tokens of an element declaration.
#[derive(Debug, Clone, Copy, Default)]
struct Layout {
    metadata: Option<usize>,
    description: Option<usize>,
    technology: Option<usize>,
    tags: Option<usize>,
    instances: Option<usize>,
    max: usize,
}

impl Layout {
    fn of(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Person | ElementKind::SoftwareSystem => Layout {
                description: Some(2),
                tags: Some(3),
                max: 3,
                ..Layout::default()
            },
            ElementKind::Container | ElementKind::Component | ElementKind::InfrastructureNode => {
                Layout {
                    description: Some(2),
                    technology: Some(3),
                    tags: Some(4),
                    max: 4,
                    ..Layout::default()
                }
            }
            ElementKind::CustomElement => Layout {
                metadata: Some(2),
                description: Some(3),
                tags: Some(4),
                max: 4,
                ..Layout::default()
            },
            ElementKind::DeploymentNode => Layout {
                description: Some(2),
                technology: Some(3),
                tags: Some(4),
                instances: Some(5),
                max: 5,
                ..Layout::default()
            },
            ElementKind::SoftwareSystemInstance | ElementKind::ContainerInstance => Layout {
                tags: Some(2),
                max: 2,
                ..Layout::default()
            },
        }
    }
}

fn grammar(kind: ElementKind) -> String {
    let rest = match kind {
        ElementKind::Person | ElementKind::SoftwareSystem => "<name> [description] [tags]",
        ElementKind::Container | ElementKind::Component | ElementKind::InfrastructureNode => {
            "<name> [description] [technology] [tags]"
        }
        ElementKind::CustomElement => "<name> [metadata] [description] [tags]",
        ElementKind::DeploymentNode => "<name> [description] [technology] [tags] [instances]",
        ElementKind::SoftwareSystemInstance | ElementKind::ContainerInstance => {
            "<identifier> [tags]"
        }
    };
    format!("{} {rest} [{{]", kind.keyword())
}

/// Accepts `4`, `1..3` and `1..N`.
fn is_valid_instances(text: &str) -> bool {
    let is_count = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match text.split_once("..") {
        Some((low, high)) => is_count(low) && (is_count(high) || high == "N" || high == "*"),
        None => is_count(text),
    }
}

impl Interpreter<'_> {
    /// Parses a statement in the model, a group, a deployment environment or
    /// an element body.
    pub(crate) fn parse_model_statement(
        &mut self,
        statement: &Statement,
        context: &Context,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        if tokens.is_at(1, ASSIGNMENT_TOKEN) {
            let Some(identifier) = tokens.token(0).cloned() else {
                return Err(expected(tokens, "<identifier> = <statement>"));
            };
            let declaration = statement.skip(2);
            if declaration.tokens.is_empty() {
                return Err(expected(tokens, "<identifier> = <statement>"));
            }
            return self.parse_declaration(Some(&identifier), &declaration, context);
        }
        self.parse_declaration(None, statement, context)
    }

    fn parse_declaration(
        &mut self,
        identifier: Option<&Token>,
        statement: &Statement,
        context: &Context,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        if tokens.is_at(0, RELATIONSHIP_TOKEN) || tokens.is_at(1, RELATIONSHIP_TOKEN) {
            return self.parse_relationship(identifier, statement);
        }

        let keyword = statement.keyword();
        if let Some(kind) = ELEMENT_KINDS.into_iter().find(|k| k.keyword() == keyword) {
            return self.parse_element(kind, identifier, statement, context);
        }
        if keyword == "deploymentEnvironment" {
            return self.parse_deployment_environment(identifier, statement, context);
        }
        if identifier.is_some() {
            return Err(Diagnostic::error(format!(
                "`{keyword}` does not declare anything that can be assigned an identifier"
            ))
            .with_code(ErrorCode::E100)
            .with_label(tokens.span(0), "not a declaration"));
        }

        match (keyword, context) {
            ("group", _) => self.parse_group(statement, context),
            ("properties", Context::Model) => {
                check_tokens(tokens, 0, 0, "properties {")?;
                require_block(statement, "properties {")?;
                Ok(Some(Context::Properties(PropertyTarget::Model)))
            }
            (_, Context::Element(element) | Context::DeploymentNode { element, .. }) => {
                self.parse_element_body(*element, statement, context)
            }
            _ => Err(unexpected_statement(statement, Some(context))),
        }
    }

    fn parse_element(
        &mut self,
        kind: ElementKind,
        identifier: Option<&Token>,
        statement: &Statement,
        context: &Context,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        let layout = Layout::of(kind);
        check_tokens(tokens, 1, layout.max, &grammar(kind))?;

        let name = tokens.get_or_empty(1);
        let name_span = tokens.span(1);
        let group = self.stack.current_group().map(str::to_string);
        let group = group.as_deref();
        let misplaced = || {
            Diagnostic::error(format!(
                "a {} cannot be declared in a {context} block",
                kind.keyword()
            ))
            .with_code(ErrorCode::E303)
            .with_label(tokens.span(0), "not permitted here")
        };

        let added = match (kind, context) {
            (ElementKind::Person, Context::Model | Context::Group { parent: None, .. }) => {
                self.builder.add_person(name, group)
            }
            (ElementKind::SoftwareSystem, Context::Model | Context::Group { parent: None, .. }) => {
                self.builder.add_software_system(name, group)
            }
            (ElementKind::CustomElement, Context::Model | Context::Group { parent: None, .. }) => {
                let metadata = layout.metadata.and_then(|i| tokens.get(i));
                self.builder.add_custom_element(name, metadata, group)
            }
            (
                ElementKind::Container,
                Context::Element(parent) | Context::Group { parent: Some(parent), .. },
            ) => self.builder.add_container(*parent, name, group),
            (
                ElementKind::Component,
                Context::Element(parent) | Context::Group { parent: Some(parent), .. },
            ) => self.builder.add_component(*parent, name, group),
            (ElementKind::DeploymentNode, Context::DeploymentEnvironment(environment)) => {
                self.builder.add_deployment_node(environment, None, name)
            }
            (ElementKind::DeploymentNode, Context::DeploymentNode { element, environment }) => {
                self.builder
                    .add_deployment_node(environment, Some(*element), name)
            }
            (ElementKind::InfrastructureNode, Context::DeploymentNode { element, .. }) => {
                self.builder.add_infrastructure_node(*element, name)
            }
            (
                ElementKind::SoftwareSystemInstance | ElementKind::ContainerInstance,
                Context::DeploymentNode { element, .. },
            ) => {
                let node = *element;
                let deployed = self.resolve_deployable(kind, tokens)?;
                self.builder.add_instance(node, deployed)
            }
            _ => return Err(misplaced()),
        };
        let id = added.map_err(|err| model_error(err, name_span))?;
        self.describe_element(id, layout, tokens)?;
        self.bind(identifier, Binding::Element(id))?;

        debug!(kind = kind.name(), name = name; "Element declared");
        Ok(Some(match context {
            Context::DeploymentEnvironment(environment)
            | Context::DeploymentNode { environment, .. }
                if kind == ElementKind::DeploymentNode =>
            {
                Context::DeploymentNode {
                    element: id,
                    environment: environment.clone(),
                }
            }
            _ => Context::Element(id),
        }))
    }

    /// Resolves the element an instance statement deploys and checks that
    /// its kind matches the statement.
    fn resolve_deployable(&self, kind: ElementKind, tokens: &Tokens) -> Result<ElementId> {
        let Some(token) = tokens.token(1) else {
            return Err(expected(tokens, &grammar(kind)));
        };
        let element = self.resolve_element(token, "element")?;
        let expected_kind = match kind {
            ElementKind::SoftwareSystemInstance => ElementKind::SoftwareSystem,
            _ => ElementKind::Container,
        };
        let actual = self
            .builder
            .element(element)
            .map_err(|err| model_error(err, token.span()))?
            .kind();
        if actual == expected_kind {
            Ok(element)
        } else {
            Err(Diagnostic::error(format!(
                "`{}` is a {}, but a {} was expected",
                token.text(),
                actual.keyword(),
                expected_kind.keyword()
            ))
            .with_code(ErrorCode::E203)
            .with_label(token.span(), "wrong kind of element"))
        }
    }

    fn describe_element(&mut self, id: ElementId, layout: Layout, tokens: &Tokens) -> Result<()> {
        let present = |index: Option<usize>| {
            index
                .and_then(|i| tokens.token(i))
                .filter(|t| !t.text().is_empty())
        };

        if let Some(token) = present(layout.description) {
            self.builder
                .set_element_description(id, token.text())
                .map_err(|err| model_error(err, token.span()))?;
        }
        if let Some(token) = present(layout.technology) {
            self.builder
                .set_element_technology(id, token.text())
                .map_err(|err| model_error(err, token.span()))?;
        }
        if let Some(token) = present(layout.tags) {
            self.builder
                .add_tags(ItemRef::Element(id), token.text())
                .map_err(|err| model_error(err, token.span()))?;
        }
        if let Some(token) = present(layout.instances) {
            self.set_instances(id, token)?;
        }
        Ok(())
    }

    fn set_instances(&mut self, id: ElementId, token: &Token) -> Result<()> {
        if !is_valid_instances(token.text()) {
            return Err(invalid_value(
                Some(token),
                format!(
                    "`{}` is not a valid number of instances, expected a number or a range such as 1..N",
                    token.text()
                ),
            ));
        }
        self.builder
            .set_instances(id, token.text())
            .map_err(|err| model_error(err, token.span()))
    }

    fn parse_group(&mut self, statement: &Statement, context: &Context) -> Result<Option<Context>> {
        const GROUP_GRAMMAR: &str = "group <name> {";
        let tokens = &statement.tokens;
        check_tokens(tokens, 1, 1, GROUP_GRAMMAR)?;
        require_block(statement, GROUP_GRAMMAR)?;
        let name = tokens.get_or_empty(1);

        let (name, parent) = match context {
            Context::Model => (name.to_string(), None),
            Context::Element(element) => {
                let kind = self
                    .builder
                    .element(*element)
                    .map_err(|err| model_error(err, tokens.span(0)))?
                    .kind();
                if !matches!(kind, ElementKind::SoftwareSystem | ElementKind::Container) {
                    return Err(Diagnostic::error(format!(
                        "groups cannot be declared inside a {}",
                        kind.keyword()
                    ))
                    .with_code(ErrorCode::E303)
                    .with_label(tokens.span(0), "not permitted here"));
                }
                (name.to_string(), Some(*element))
            }
            Context::Group {
                name: outer,
                parent,
            } => {
                let Some(separator) = self.builder.model().group_separator() else {
                    return Err(Diagnostic::error("groups can only be nested when a group separator is defined")
                        .with_code(ErrorCode::E303)
                        .with_label(tokens.span(0), "nested group")
                        .with_help(
                            "add `structurizr.groupSeparator` to the model properties, e.g. `structurizr.groupSeparator /`",
                        ));
                };
                (format!("{outer}{separator}{name}"), *parent)
            }
            _ => return Err(unexpected_statement(statement, Some(context))),
        };
        Ok(Some(Context::Group { name, parent }))
    }

    fn parse_deployment_environment(
        &mut self,
        identifier: Option<&Token>,
        statement: &Statement,
        context: &Context,
    ) -> Result<Option<Context>> {
        const ENVIRONMENT_GRAMMAR: &str = "deploymentEnvironment <name> {";
        let tokens = &statement.tokens;
        if *context != Context::Model {
            return Err(unexpected_statement(statement, Some(context)));
        }
        check_tokens(tokens, 1, 1, ENVIRONMENT_GRAMMAR)?;
        require_block(statement, ENVIRONMENT_GRAMMAR)?;
        let name = tokens.get_or_empty(1).to_string();
        if name.is_empty() {
            return Err(invalid_value(tokens.token(1), "a deployment environment needs a name"));
        }

        if let Some(identifier) = identifier {
            let text = identifier.text();
            if !is_valid_identifier(text) {
                return Err(registry_error(
                    RegistryError::Invalid(text.to_string()),
                    identifier.span(),
                ));
            }
            match self.environments.get(text) {
                Some(existing) if *existing != name => {
                    return Err(registry_error(
                        RegistryError::Duplicate(text.to_string()),
                        identifier.span(),
                    ));
                }
                _ => {
                    self.environments.insert(text.to_string(), name.clone());
                }
            }
        }
        self.environments.insert(name.clone(), name.clone());
        debug!(name = name.as_str(); "Deployment environment opened");
        Ok(Some(Context::DeploymentEnvironment(name)))
    }

    fn parse_element_body(
        &mut self,
        element: ElementId,
        statement: &Statement,
        context: &Context,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        let item = ItemRef::Element(element);
        let span = tokens.span_from(0);
        match statement.keyword() {
            "description" => {
                check_tokens(tokens, 1, 1, "description <description>")?;
                self.builder
                    .set_element_description(element, tokens.get_or_empty(1))
                    .map_err(|err| model_error(err, span))?;
            }
            "technology" => {
                check_tokens(tokens, 1, 1, "technology <technology>")?;
                self.builder
                    .set_element_technology(element, tokens.get_or_empty(1))
                    .map_err(|err| model_error(err, span))?;
            }
            "instances" => {
                check_tokens(tokens, 1, 1, "instances <number|range>")?;
                if let Some(token) = tokens.token(1) {
                    self.set_instances(element, token)?;
                }
            }
            "tags" | "url" | "properties" | "perspectives" => {
                return self.parse_item_statement(item, statement);
            }
            _ => return Err(unexpected_statement(statement, Some(context))),
        }
        Ok(None)
    }

    /// Statements shared by element and relationship bodies.
    pub(crate) fn parse_item_statement(
        &mut self,
        item: ItemRef,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        let span = tokens.span_from(0);
        match statement.keyword() {
            "tags" => {
                if !tokens.includes(1) {
                    return Err(expected(tokens, "tags <tags> [tags...]"));
                }
                for tag in tokens.iter().skip(1) {
                    self.builder
                        .add_tags(item, tag.text())
                        .map_err(|err| model_error(err, tag.span()))?;
                }
                Ok(None)
            }
            "url" => {
                check_tokens(tokens, 1, 1, "url <url>")?;
                self.builder
                    .set_url(item, tokens.get_or_empty(1))
                    .map_err(|err| model_error(err, span))?;
                Ok(None)
            }
            "properties" => {
                check_tokens(tokens, 0, 0, "properties {")?;
                require_block(statement, "properties {")?;
                Ok(Some(Context::Properties(PropertyTarget::Item(item))))
            }
            "perspectives" => {
                check_tokens(tokens, 0, 0, "perspectives {")?;
                require_block(statement, "perspectives {")?;
                Ok(Some(Context::Perspectives(item)))
            }
            _ => Err(unexpected_statement(
                statement,
                Some(&match item {
                    ItemRef::Element(element) => Context::Element(element),
                    ItemRef::Relationship(relationship) => Context::Relationship(relationship),
                }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_instances() {
        assert!(is_valid_instances("4"));
        assert!(is_valid_instances("1..3"));
        assert!(is_valid_instances("0..N"));
        assert!(!is_valid_instances("many"));
        assert!(!is_valid_instances("1.."));
        assert!(!is_valid_instances(""));
    }

    #[test]
    fn test_grammar_names_keyword() {
        assert_eq!(
            grammar(ElementKind::Container),
            "container <name> [description] [technology] [tags] [{]"
        );
    }
}

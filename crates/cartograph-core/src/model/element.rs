//! Elements of the architecture model.

use std::{fmt, str::FromStr};

use crate::model::item::ItemMetadata;

/// Position of an element in the model.
///
/// Elements and relationships draw their ids from one counter, so an id is
/// unique across the whole model and stable across re-parses of the same
/// source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Person,
    SoftwareSystem,
    Container,
    Component,
    CustomElement,
    DeploymentNode,
    InfrastructureNode,
    SoftwareSystemInstance,
    ContainerInstance,
}

impl ElementKind {
    /// Type name used in canonical names and `element.type==` filters.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Person => "Person",
            ElementKind::SoftwareSystem => "SoftwareSystem",
            ElementKind::Container => "Container",
            ElementKind::Component => "Component",
            ElementKind::CustomElement => "CustomElement",
            ElementKind::DeploymentNode => "DeploymentNode",
            ElementKind::InfrastructureNode => "InfrastructureNode",
            ElementKind::SoftwareSystemInstance => "SoftwareSystemInstance",
            ElementKind::ContainerInstance => "ContainerInstance",
        }
    }

    /// DSL keyword that declares an element of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            ElementKind::Person => "person",
            ElementKind::SoftwareSystem => "softwareSystem",
            ElementKind::Container => "container",
            ElementKind::Component => "component",
            ElementKind::CustomElement => "element",
            ElementKind::DeploymentNode => "deploymentNode",
            ElementKind::InfrastructureNode => "infrastructureNode",
            ElementKind::SoftwareSystemInstance => "softwareSystemInstance",
            ElementKind::ContainerInstance => "containerInstance",
        }
    }

    /// Tags every element of this kind starts with.
    pub fn default_tags(self) -> &'static [&'static str] {
        match self {
            ElementKind::Person => &["Element", "Person"],
            ElementKind::SoftwareSystem => &["Element", "Software System"],
            ElementKind::Container => &["Element", "Container"],
            ElementKind::Component => &["Element", "Component"],
            ElementKind::CustomElement => &["Element"],
            ElementKind::DeploymentNode => &["Element", "Deployment Node"],
            ElementKind::InfrastructureNode => &["Element", "Infrastructure Node"],
            ElementKind::SoftwareSystemInstance => &["Software System Instance"],
            ElementKind::ContainerInstance => &["Container Instance"],
        }
    }

    /// People, software systems, containers and components.
    pub fn is_static_structure(self) -> bool {
        matches!(
            self,
            ElementKind::Person
                | ElementKind::SoftwareSystem
                | ElementKind::Container
                | ElementKind::Component
        )
    }

    pub fn is_custom(self) -> bool {
        self == ElementKind::CustomElement
    }

    pub fn is_deployment(self) -> bool {
        matches!(
            self,
            ElementKind::DeploymentNode
                | ElementKind::InfrastructureNode
                | ElementKind::SoftwareSystemInstance
                | ElementKind::ContainerInstance
        )
    }

    /// Whether an element of this kind may be the parent of `child`.
    pub fn can_contain(self, child: ElementKind) -> bool {
        matches!(
            (self, child),
            (ElementKind::SoftwareSystem, ElementKind::Container)
                | (ElementKind::Container, ElementKind::Component)
                | (
                    ElementKind::DeploymentNode,
                    ElementKind::DeploymentNode
                        | ElementKind::InfrastructureNode
                        | ElementKind::SoftwareSystemInstance
                        | ElementKind::ContainerInstance
                )
        )
    }

    /// Whether an element of this kind may only exist below a parent.
    pub fn requires_parent(self) -> bool {
        matches!(
            self,
            ElementKind::Container
                | ElementKind::Component
                | ElementKind::InfrastructureNode
                | ElementKind::SoftwareSystemInstance
                | ElementKind::ContainerInstance
        )
    }

    pub fn allows_self_relationship(self) -> bool {
        self == ElementKind::Component
    }

    pub fn supports_technology(self) -> bool {
        matches!(
            self,
            ElementKind::Container
                | ElementKind::Component
                | ElementKind::DeploymentNode
                | ElementKind::InfrastructureNode
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "person" => ElementKind::Person,
            "softwaresystem" => ElementKind::SoftwareSystem,
            "container" => ElementKind::Container,
            "component" => ElementKind::Component,
            "element" | "customelement" => ElementKind::CustomElement,
            "deploymentnode" => ElementKind::DeploymentNode,
            "infrastructurenode" => ElementKind::InfrastructureNode,
            "softwaresysteminstance" => ElementKind::SoftwareSystemInstance,
            "containerinstance" => ElementKind::ContainerInstance,
            _ => return Err(format!("`{s}` is not an element type")),
        };
        Ok(kind)
    }
}

/// A single architectural element.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    pub(crate) name: String,
    pub(crate) canonical_name: String,
    pub(crate) description: Option<String>,
    pub(crate) technology: Option<String>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) group: Option<String>,
    pub(crate) environment: Option<String>,
    pub(crate) instance_of: Option<ElementId>,
    pub(crate) instance_index: Option<usize>,
    pub(crate) instances: Option<String>,
    pub(crate) metadata: Option<String>,
    pub(crate) item: ItemMetadata,
}

impl Element {
    pub(crate) fn new(id: ElementId, kind: ElementKind, name: &str) -> Self {
        Self {
            id,
            kind,
            name: name.to_string(),
            canonical_name: String::new(),
            description: None,
            technology: None,
            parent: None,
            group: None,
            environment: None,
            instance_of: None,
            instance_index: None,
            instances: None,
            metadata: None,
            item: ItemMetadata::with_tags(kind.default_tags()),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name such as `Container://Bank.Web Application`.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Deployment environment, for deployment elements.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// The software system or container an instance was created from.
    pub fn instance_of(&self) -> Option<ElementId> {
        self.instance_of
    }

    pub fn instance_index(&self) -> Option<usize> {
        self.instance_index
    }

    /// Instance count of a deployment node, e.g. `"4"` or `"1..N"`.
    pub fn instances(&self) -> Option<&str> {
        self.instances.as_deref()
    }

    /// Free-form type label of a custom element.
    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn item(&self) -> &ItemMetadata {
        &self.item
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.item.has_tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_rules() {
        assert!(ElementKind::SoftwareSystem.can_contain(ElementKind::Container));
        assert!(ElementKind::Container.can_contain(ElementKind::Component));
        assert!(ElementKind::DeploymentNode.can_contain(ElementKind::DeploymentNode));
        assert!(ElementKind::DeploymentNode.can_contain(ElementKind::InfrastructureNode));
        assert!(!ElementKind::SoftwareSystem.can_contain(ElementKind::Component));
        assert!(!ElementKind::Person.can_contain(ElementKind::Container));
        assert!(!ElementKind::InfrastructureNode.can_contain(ElementKind::DeploymentNode));
    }

    #[test]
    fn test_capabilities() {
        assert!(ElementKind::Person.is_static_structure());
        assert!(!ElementKind::CustomElement.is_static_structure());
        assert!(ElementKind::CustomElement.is_custom());
        assert!(ElementKind::DeploymentNode.is_deployment());
        assert!(ElementKind::Component.allows_self_relationship());
        assert!(!ElementKind::Container.allows_self_relationship());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("SoftwareSystem".parse(), Ok(ElementKind::SoftwareSystem));
        assert_eq!("element".parse(), Ok(ElementKind::CustomElement));
        assert!("database".parse::<ElementKind>().is_err());
    }

    #[test]
    fn test_default_tags_applied() {
        let element = Element::new(ElementId(1), ElementKind::Container, "Web");
        let tags: Vec<_> = element.item().tags().collect();
        assert_eq!(tags, vec!["Element", "Container"]);
    }
}

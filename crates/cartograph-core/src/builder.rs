//! The single mutation path into a workspace.
//!
//! [`WorkspaceBuilder`] owns the model while a workspace is being parsed and
//! enforces every model invariant at insertion time:
//!
//! - canonical names are unique, and people, software systems and custom
//!   elements share one top-level name space;
//! - children only nest inside kinds that may contain them;
//! - no two relationships share (source, destination, description);
//! - self relationships are only allowed for components, and relationships
//!   between an element and its ancestors are rejected.
//!
//! A failed insertion leaves the model untouched. [`WorkspaceBuilder::finish`]
//! consumes the builder and returns the read-only [`Workspace`].

mod views;

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    configuration::{User, Visibility, WorkspaceConfiguration, WorkspaceScope},
    documentation::{Decision, Documentation},
    error::ModelError,
    model::{
        Element, ElementId, ElementKind, ItemMetadata, Model, Perspective, Relationship,
        RelationshipId, RelationshipOrigin, check_property,
    },
    view::ViewSet,
    workspace::Workspace,
};

/// Something that carries tags, properties, perspectives and a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Element(ElementId),
    Relationship(RelationshipId),
}

/// Builds a [`Workspace`] one checked insertion at a time.
#[derive(Debug, Clone)]
pub struct WorkspaceBuilder {
    name: String,
    description: String,
    properties: IndexMap<String, String>,
    configuration: WorkspaceConfiguration,
    model: Model,
    views: ViewSet,
    documentation: Documentation,
    next_id: usize,
    top_level_names: HashMap<String, ElementId>,
    implied_relationships: bool,
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new("Workspace", "")
    }
}

impl WorkspaceBuilder {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            properties: IndexMap::new(),
            configuration: WorkspaceConfiguration::default(),
            model: Model::default(),
            views: ViewSet::default(),
            documentation: Documentation::default(),
            next_id: 1,
            top_level_names: HashMap::new(),
            implied_relationships: true,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn add_workspace_property(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        check_property(name, value)?;
        self.properties.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn add_model_property(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        check_property(name, value)?;
        self.model
            .properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Enables or disables implied relationships for relationships added
    /// from now on.
    pub fn set_implied_relationships(&mut self, enabled: bool) {
        self.implied_relationships = enabled;
    }

    pub fn implied_relationships(&self) -> bool {
        self.implied_relationships
    }

    pub fn set_scope(&mut self, scope: Option<WorkspaceScope>) {
        self.configuration.set_scope(scope);
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.configuration.set_visibility(visibility);
    }

    pub fn add_user(&mut self, user: User) {
        self.configuration.add_user(user);
    }

    /// Read access to the model built so far.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, ModelError> {
        self.model
            .element(id)
            .ok_or(ModelError::UnknownElement(id.index()))
    }

    pub fn relationship(&self, id: RelationshipId) -> Result<&Relationship, ModelError> {
        self.model
            .relationship(id)
            .ok_or(ModelError::UnknownRelationship(id.index()))
    }

    pub fn add_person(&mut self, name: &str, group: Option<&str>) -> Result<ElementId, ModelError> {
        self.insert_element(ElementKind::Person, name, None, |e| {
            e.group = group.map(str::to_string);
        })
    }

    pub fn add_software_system(
        &mut self,
        name: &str,
        group: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.insert_element(ElementKind::SoftwareSystem, name, None, |e| {
            e.group = group.map(str::to_string);
        })
    }

    pub fn add_container(
        &mut self,
        software_system: ElementId,
        name: &str,
        group: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.insert_element(ElementKind::Container, name, Some(software_system), |e| {
            e.group = group.map(str::to_string);
        })
    }

    pub fn add_component(
        &mut self,
        container: ElementId,
        name: &str,
        group: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.insert_element(ElementKind::Component, name, Some(container), |e| {
            e.group = group.map(str::to_string);
        })
    }

    pub fn add_custom_element(
        &mut self,
        name: &str,
        metadata: Option<&str>,
        group: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.insert_element(ElementKind::CustomElement, name, None, |e| {
            e.metadata = metadata.filter(|m| !m.is_empty()).map(str::to_string);
            e.group = group.map(str::to_string);
        })
    }

    /// Adds a deployment node to `environment`, optionally inside `parent`.
    pub fn add_deployment_node(
        &mut self,
        environment: &str,
        parent: Option<ElementId>,
        name: &str,
    ) -> Result<ElementId, ModelError> {
        self.insert_element(ElementKind::DeploymentNode, name, parent, |e| {
            e.environment = Some(environment.to_string());
        })
    }

    pub fn add_infrastructure_node(
        &mut self,
        deployment_node: ElementId,
        name: &str,
    ) -> Result<ElementId, ModelError> {
        let environment = self.element(deployment_node)?.environment.clone();
        self.insert_element(
            ElementKind::InfrastructureNode,
            name,
            Some(deployment_node),
            |e| e.environment = environment,
        )
    }

    /// Deploys a software system or container onto `deployment_node`.
    ///
    /// The instance kind follows the kind of `element`; an element of any
    /// other kind is rejected.
    pub fn add_instance(
        &mut self,
        deployment_node: ElementId,
        element: ElementId,
    ) -> Result<ElementId, ModelError> {
        let of = self.element(element)?;
        let (kind, name) = match of.kind() {
            ElementKind::SoftwareSystem => (ElementKind::SoftwareSystemInstance, of.name.clone()),
            ElementKind::Container => (ElementKind::ContainerInstance, of.name.clone()),
            other => {
                return Err(ModelError::IllegalNesting {
                    parent: ElementKind::DeploymentNode,
                    child: other,
                });
            }
        };

        let node = self.element(deployment_node)?;
        let environment = node.environment.clone();
        if self
            .model
            .children_of(deployment_node)
            .any(|child| child.instance_of == Some(element))
        {
            return Err(ModelError::DuplicateInstance {
                container: node.name.clone(),
                element: name,
            });
        }

        let instance_index = self
            .model
            .elements()
            .filter(|e| e.instance_of == Some(element) && e.environment == environment)
            .count()
            + 1;

        let id = self.insert_element(kind, &name, Some(deployment_node), |e| {
            e.environment = environment;
            e.instance_of = Some(element);
            e.instance_index = Some(instance_index);
        })?;
        self.replicate_relationships(id);
        Ok(id)
    }

    pub fn set_element_description(
        &mut self,
        id: ElementId,
        description: &str,
    ) -> Result<(), ModelError> {
        self.element_mut(id)?.description = Some(description.to_string());
        Ok(())
    }

    pub fn set_element_technology(
        &mut self,
        id: ElementId,
        technology: &str,
    ) -> Result<(), ModelError> {
        let element = self.element_mut(id)?;
        if !element.kind.supports_technology() {
            return Err(ModelError::UnsupportedProperty {
                kind: element.kind,
                property: "technology",
            });
        }
        element.technology = Some(technology.to_string()).filter(|t| !t.is_empty());
        Ok(())
    }

    /// Sets the instance count of a deployment node, e.g. `4` or `1..N`.
    pub fn set_instances(&mut self, id: ElementId, instances: &str) -> Result<(), ModelError> {
        let element = self.element_mut(id)?;
        if element.kind != ElementKind::DeploymentNode {
            return Err(ModelError::UnsupportedProperty {
                kind: element.kind,
                property: "instances",
            });
        }
        element.instances = Some(instances.to_string());
        Ok(())
    }

    pub fn add_tags(&mut self, item: ItemRef, tags: &str) -> Result<(), ModelError> {
        self.item_mut(item)?.add_tags(tags);
        Ok(())
    }

    pub fn set_url(&mut self, item: ItemRef, url: &str) -> Result<(), ModelError> {
        self.item_mut(item)?.set_url(url)
    }

    pub fn add_property(&mut self, item: ItemRef, name: &str, value: &str) -> Result<(), ModelError> {
        self.item_mut(item)?.add_property(name, value)
    }

    pub fn add_perspective(
        &mut self,
        item: ItemRef,
        perspective: Perspective,
    ) -> Result<(), ModelError> {
        self.item_mut(item)?.add_perspective(perspective)
    }

    /// Adds a relationship and, when enabled, the relationships it implies
    /// between the ancestors of its endpoints.
    pub fn add_relationship(
        &mut self,
        source: ElementId,
        destination: ElementId,
        description: &str,
        technology: &str,
    ) -> Result<RelationshipId, ModelError> {
        let source_element = self.element(source)?;
        let destination_element = self.element(destination)?;

        if source == destination && !source_element.kind.allows_self_relationship() {
            return Err(ModelError::SelfRelationship(source_element.name.clone()));
        }
        if self.model.is_ancestor(source, destination) {
            return Err(ModelError::ParentChildRelationship {
                parent: source_element.name.clone(),
                child: destination_element.name.clone(),
            });
        }
        if self.model.is_ancestor(destination, source) {
            return Err(ModelError::ParentChildRelationship {
                parent: destination_element.name.clone(),
                child: source_element.name.clone(),
            });
        }
        if self
            .model
            .relationships_between(source, destination)
            .any(|r| r.description == description)
        {
            return Err(ModelError::DuplicateRelationship {
                from: source_element.name.clone(),
                to: destination_element.name.clone(),
                description: description.to_string(),
            });
        }

        let id = self.insert_relationship(
            source,
            destination,
            description,
            technology,
            RelationshipOrigin::Explicit,
        );

        if self.implied_relationships {
            self.create_implied_relationships(id);
        }
        Ok(id)
    }

    /// Consumes the builder and returns the finished workspace.
    /// Records a batch of decisions against the workspace (`element` is
    /// `None`) or against a software system, container or component.
    ///
    /// Identifiers must be unique within the scope, and every link must name
    /// a decision of the same scope, either already recorded or in the batch.
    /// The batch is rejected as a whole.
    pub fn add_decisions(
        &mut self,
        element: Option<ElementId>,
        decisions: Vec<Decision>,
    ) -> Result<(), ModelError> {
        if let Some(id) = element {
            let kind = self.element(id)?.kind();
            if !matches!(
                kind,
                ElementKind::SoftwareSystem | ElementKind::Container | ElementKind::Component
            ) {
                return Err(ModelError::UnsupportedProperty {
                    kind,
                    property: "decisions",
                });
            }
        }

        let mut batch = Vec::with_capacity(decisions.len());
        for decision in &decisions {
            if decision.id.is_empty() {
                return Err(ModelError::InvalidDecision(
                    "a decision must have an id".to_string(),
                ));
            }
            if self.documentation.contains(element, &decision.id)
                || batch.contains(&decision.id.as_str())
            {
                return Err(ModelError::DuplicateDecision(decision.id.clone()));
            }
            batch.push(decision.id.as_str());
        }
        for decision in &decisions {
            for link in decision.links() {
                if !batch.contains(&link.id()) && !self.documentation.contains(element, link.id()) {
                    return Err(ModelError::UnknownDecision {
                        from: decision.id.clone(),
                        to: link.id().to_string(),
                    });
                }
            }
        }

        for mut decision in decisions {
            trace!(id = decision.id.as_str(), title = decision.title.as_str(); "Decision added");
            decision.element = element;
            self.documentation
                .decisions
                .insert((element, decision.id.clone()), decision);
        }
        Ok(())
    }

    pub fn finish(self) -> Workspace {
        debug!(
            elements = self.model.elements.len(),
            relationships = self.model.relationships.len(),
            views = self.views.views.len(),
            decisions = self.documentation.decisions.len();
            "Workspace finished"
        );
        Workspace {
            name: self.name,
            description: self.description,
            properties: self.properties,
            configuration: self.configuration,
            model: self.model,
            views: self.views,
            documentation: self.documentation,
        }
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, ModelError> {
        self.model
            .elements
            .get_mut(&id)
            .ok_or(ModelError::UnknownElement(id.index()))
    }

    fn item_mut(&mut self, item: ItemRef) -> Result<&mut ItemMetadata, ModelError> {
        match item {
            ItemRef::Element(id) => Ok(&mut self.element_mut(id)?.item),
            ItemRef::Relationship(id) => self
                .model
                .relationships
                .get_mut(&id)
                .map(|r| &mut r.item)
                .ok_or(ModelError::UnknownRelationship(id.index())),
        }
    }

    fn insert_element(
        &mut self,
        kind: ElementKind,
        name: &str,
        parent: Option<ElementId>,
        configure: impl FnOnce(&mut Element),
    ) -> Result<ElementId, ModelError> {
        match parent {
            Some(parent_id) => {
                let parent_kind = self.element(parent_id)?.kind;
                if !parent_kind.can_contain(kind) {
                    return Err(ModelError::IllegalNesting {
                        parent: parent_kind,
                        child: kind,
                    });
                }
            }
            None if kind.requires_parent() => return Err(ModelError::MissingParent(kind)),
            None => {}
        }

        let shares_top_level = matches!(
            kind,
            ElementKind::Person | ElementKind::SoftwareSystem | ElementKind::CustomElement
        );
        if shares_top_level && self.top_level_names.contains_key(name) {
            return Err(ModelError::DuplicateElement {
                kind,
                name: name.to_string(),
            });
        }

        let id = ElementId(self.next_id);
        let mut element = Element::new(id, kind, name);
        element.parent = parent;
        configure(&mut element);
        element.canonical_name = self.canonical_name(&element);

        if self.model.canonical_names.contains_key(&element.canonical_name) {
            return Err(ModelError::DuplicateElement {
                kind,
                name: name.to_string(),
            });
        }

        self.allocate_id();
        if shares_top_level {
            self.top_level_names.insert(name.to_string(), id);
        }
        trace!(id = id.index(), canonical_name = element.canonical_name.as_str(); "Element added");
        self.model
            .canonical_names
            .insert(element.canonical_name.clone(), id);
        self.model.elements.insert(id, element);
        Ok(id)
    }

    /// Builds names such as `Component://Bank.Web.Sign In` or
    /// `ContainerInstance://Live/Server/Bank.Web[1]`.
    fn canonical_name(&self, element: &Element) -> String {
        let path = |id: Option<ElementId>, separator: &str| -> String {
            let mut names: Vec<&str> = Vec::new();
            let mut current = id;
            while let Some(cur) = current {
                match self.model.element(cur) {
                    Some(e) => {
                        names.push(&e.name);
                        current = e.parent;
                    }
                    None => break,
                }
            }
            names.reverse();
            names.join(separator)
        };

        let kind = element.kind;
        let qualified = match kind {
            ElementKind::Person | ElementKind::SoftwareSystem | ElementKind::CustomElement => {
                element.name.clone()
            }
            ElementKind::Container | ElementKind::Component => {
                format!("{}.{}", path(element.parent, "."), element.name)
            }
            ElementKind::DeploymentNode | ElementKind::InfrastructureNode => {
                let environment = element.environment.as_deref().unwrap_or_default();
                match element.parent {
                    Some(_) => format!(
                        "{environment}/{}/{}",
                        path(element.parent, "/"),
                        element.name
                    ),
                    None => format!("{environment}/{}", element.name),
                }
            }
            ElementKind::SoftwareSystemInstance | ElementKind::ContainerInstance => {
                let environment = element.environment.as_deref().unwrap_or_default();
                format!(
                    "{environment}/{}/{}[{}]",
                    path(element.parent, "/"),
                    path(element.instance_of, "."),
                    element.instance_index.unwrap_or(1)
                )
            }
        };
        format!("{}://{}", kind.name(), qualified)
    }

    fn insert_relationship(
        &mut self,
        source: ElementId,
        destination: ElementId,
        description: &str,
        technology: &str,
        origin: RelationshipOrigin,
    ) -> RelationshipId {
        let id = RelationshipId(self.allocate_id());
        let mut relationship = Relationship::new(id, source, destination, description, technology);
        relationship.origin = origin;
        trace!(
            id = id.index(),
            source = source.index(),
            destination = destination.index(),
            origin:? = origin;
            "Relationship added"
        );
        self.model.relationships.insert(id, relationship);
        id
    }

    /// Creates implied relationships between every ancestor-or-self pair of
    /// the endpoints, unless the pair is already related in any way.
    fn create_implied_relationships(&mut self, id: RelationshipId) {
        let Some(relationship) = self.model.relationship(id) else {
            return;
        };
        let (source, destination) = (relationship.source, relationship.destination);
        let description = relationship.description.clone();
        let technology = relationship.technology.clone();

        let sources: Vec<ElementId> = std::iter::once(source)
            .chain(self.model.ancestors(source))
            .collect();
        let destinations: Vec<ElementId> = std::iter::once(destination)
            .chain(self.model.ancestors(destination))
            .collect();

        for &s in &sources {
            for &d in &destinations {
                if (s, d) == (source, destination) || s == d {
                    continue;
                }
                if self.model.is_ancestor(s, d) || self.model.is_ancestor(d, s) {
                    continue;
                }
                if self.model.has_relationship(s, d) {
                    continue;
                }
                self.insert_relationship(
                    s,
                    d,
                    &description,
                    &technology,
                    RelationshipOrigin::Implied(id),
                );
            }
        }
    }

    /// Copies relationships between the deployed element and elements that
    /// already have instances in the same environment onto the instances.
    fn replicate_relationships(&mut self, instance: ElementId) {
        let Some(element) = self.model.element(instance) else {
            return;
        };
        let (Some(of), environment) = (element.instance_of, element.environment.clone()) else {
            return;
        };

        let peers: Vec<(ElementId, ElementId)> = self
            .model
            .elements()
            .filter(|e| e.id != instance && e.environment == environment)
            .filter_map(|e| e.instance_of.map(|peer_of| (e.id, peer_of)))
            .collect();

        let mut copies = Vec::new();
        for (peer, peer_of) in peers {
            for r in self.model.relationships_between(of, peer_of) {
                if !r.is_implied() {
                    copies.push((instance, peer, r.clone()));
                }
            }
            for r in self.model.relationships_between(peer_of, of) {
                if !r.is_implied() {
                    copies.push((peer, instance, r.clone()));
                }
            }
        }

        for (source, destination, original) in copies {
            if self
                .model
                .relationships_between(source, destination)
                .any(|r| r.description == original.description)
            {
                continue;
            }
            self.insert_relationship(
                source,
                destination,
                &original.description,
                &original.technology,
                RelationshipOrigin::Replicated(original.id),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(builder: &WorkspaceBuilder, ids: impl IntoIterator<Item = ElementId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| builder.element(id).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_canonical_names() {
        let mut builder = WorkspaceBuilder::default();
        let bank = builder.add_software_system("Bank", None).unwrap();
        let web = builder.add_container(bank, "Web", None).unwrap();
        let signin = builder.add_component(web, "Sign In", None).unwrap();
        let live = builder.add_deployment_node("Live", None, "Server").unwrap();
        let jvm = builder.add_deployment_node("Live", Some(live), "JVM").unwrap();
        let instance = builder.add_instance(jvm, web).unwrap();

        assert_eq!(builder.element(bank).unwrap().canonical_name(), "SoftwareSystem://Bank");
        assert_eq!(builder.element(web).unwrap().canonical_name(), "Container://Bank.Web");
        assert_eq!(
            builder.element(signin).unwrap().canonical_name(),
            "Component://Bank.Web.Sign In"
        );
        assert_eq!(
            builder.element(jvm).unwrap().canonical_name(),
            "DeploymentNode://Live/Server/JVM"
        );
        assert_eq!(
            builder.element(instance).unwrap().canonical_name(),
            "ContainerInstance://Live/Server/JVM/Bank.Web[1]"
        );
    }

    #[test]
    fn test_people_and_systems_share_names() {
        let mut builder = WorkspaceBuilder::default();
        builder.add_person("Billing", None).unwrap();

        let err = builder.add_software_system("Billing", None).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateElement { .. }));
    }

    #[test]
    fn test_same_container_name_in_different_systems() {
        let mut builder = WorkspaceBuilder::default();
        let a = builder.add_software_system("A", None).unwrap();
        let b = builder.add_software_system("B", None).unwrap();

        assert!(builder.add_container(a, "Database", None).is_ok());
        assert!(builder.add_container(b, "Database", None).is_ok());
        assert!(builder.add_container(a, "Database", None).is_err());
    }

    #[test]
    fn test_illegal_nesting() {
        let mut builder = WorkspaceBuilder::default();
        let person = builder.add_person("User", None).unwrap();
        let system = builder.add_software_system("System", None).unwrap();

        assert!(matches!(
            builder.add_container(person, "Web", None),
            Err(ModelError::IllegalNesting { .. })
        ));
        assert!(matches!(
            builder.add_component(system, "Widget", None),
            Err(ModelError::IllegalNesting { .. })
        ));
    }

    #[test]
    fn test_duplicate_relationship_description() {
        let mut builder = WorkspaceBuilder::default();
        let user = builder.add_person("User", None).unwrap();
        let system = builder.add_software_system("System", None).unwrap();

        builder.add_relationship(user, system, "Uses", "").unwrap();
        assert!(builder.add_relationship(user, system, "Administers", "").is_ok());
        assert!(matches!(
            builder.add_relationship(user, system, "Uses", "HTTPS"),
            Err(ModelError::DuplicateRelationship { .. })
        ));
    }

    #[test]
    fn test_self_relationship_only_for_components() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();
        let widget = builder.add_component(web, "Widget", None).unwrap();

        assert!(matches!(
            builder.add_relationship(system, system, "Calls itself", ""),
            Err(ModelError::SelfRelationship(_))
        ));
        assert!(builder.add_relationship(widget, widget, "Recurses", "").is_ok());
    }

    #[test]
    fn test_parent_child_relationship_rejected() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();

        assert!(matches!(
            builder.add_relationship(system, web, "Contains", ""),
            Err(ModelError::ParentChildRelationship { .. })
        ));
        assert!(matches!(
            builder.add_relationship(web, system, "Part of", ""),
            Err(ModelError::ParentChildRelationship { .. })
        ));
    }

    #[test]
    fn test_implied_relationships_created_once() {
        let mut builder = WorkspaceBuilder::default();
        let user = builder.add_person("User", None).unwrap();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();
        let api = builder.add_container(system, "API", None).unwrap();

        let explicit = builder.add_relationship(user, web, "Uses", "HTTPS").unwrap();
        builder.add_relationship(user, api, "Calls", "").unwrap();

        let implied: Vec<_> = builder
            .model()
            .relationships_between(user, system)
            .collect();
        assert_eq!(implied.len(), 1);
        assert_eq!(implied[0].description(), "Uses");
        assert_eq!(implied[0].technology(), "HTTPS");
        assert_eq!(implied[0].origin(), RelationshipOrigin::Implied(explicit));
    }

    #[test]
    fn test_implied_relationships_skip_siblings_of_common_parent() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();
        let db = builder.add_container(system, "Database", None).unwrap();

        builder.add_relationship(web, db, "Reads from", "").unwrap();

        assert_eq!(builder.model().relationships().count(), 1);
    }

    #[test]
    fn test_implied_relationships_can_be_disabled() {
        let mut builder = WorkspaceBuilder::default();
        builder.set_implied_relationships(false);
        let user = builder.add_person("User", None).unwrap();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();

        builder.add_relationship(user, web, "Uses", "").unwrap();

        assert!(!builder.model().has_relationship(user, system));
    }

    #[test]
    fn test_instances_replicate_relationships() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();
        let db = builder.add_container(system, "Database", None).unwrap();
        builder.add_relationship(web, db, "Reads from", "JDBC").unwrap();

        let server = builder.add_deployment_node("Live", None, "Server").unwrap();
        let web_instance = builder.add_instance(server, web).unwrap();
        let db_instance = builder.add_instance(server, db).unwrap();

        let replicated: Vec<_> = builder
            .model()
            .relationships_between(web_instance, db_instance)
            .collect();
        assert_eq!(replicated.len(), 1);
        assert_eq!(replicated[0].technology(), "JDBC");
    }

    #[test]
    fn test_duplicate_instance_on_same_node() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        let server = builder.add_deployment_node("Live", None, "Server").unwrap();

        builder.add_instance(server, system).unwrap();
        assert!(matches!(
            builder.add_instance(server, system),
            Err(ModelError::DuplicateInstance { .. })
        ));
    }

    #[test]
    fn test_technology_only_where_supported() {
        let mut builder = WorkspaceBuilder::default();
        let user = builder.add_person("User", None).unwrap();
        let system = builder.add_software_system("System", None).unwrap();
        let web = builder.add_container(system, "Web", None).unwrap();

        assert!(builder.set_element_technology(web, "Rust").is_ok());
        assert!(matches!(
            builder.set_element_technology(user, "Wetware"),
            Err(ModelError::UnsupportedProperty { .. })
        ));
    }

    #[test]
    fn test_ids_are_shared_and_sequential() {
        let mut builder = WorkspaceBuilder::default();
        let a = builder.add_person("A", None).unwrap();
        let b = builder.add_software_system("B", None).unwrap();
        let r = builder.add_relationship(a, b, "Uses", "").unwrap();
        let c = builder.add_person("C", None).unwrap();

        assert_eq!((a.index(), b.index(), r.index(), c.index()), (1, 2, 3, 4));
        assert_eq!(names(&builder, [a, b, c]), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_failed_insert_does_not_consume_id() {
        let mut builder = WorkspaceBuilder::default();
        builder.add_person("A", None).unwrap();
        assert!(builder.add_person("A", None).is_err());
        let b = builder.add_person("B", None).unwrap();

        assert_eq!(b.index(), 2);
    }

    #[test]
    fn test_decisions_are_scoped_to_workspace_or_element() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        builder
            .add_decisions(None, vec![Decision::new("1", "Record decisions")])
            .unwrap();
        builder
            .add_decisions(Some(system), vec![Decision::new("1", "Use Postgres")])
            .unwrap();

        let workspace = builder.finish();
        let docs = workspace.documentation();
        assert_eq!(docs.decisions().count(), 1);
        assert_eq!(
            docs.decision(Some(system), "1").map(Decision::title),
            Some("Use Postgres")
        );
        assert_eq!(docs.decisions_of(system).count(), 1);
        assert_eq!(docs.decision(Some(system), "1").unwrap().element(), Some(system));
    }

    #[test]
    fn test_duplicate_decision_rejects_whole_batch() {
        let mut builder = WorkspaceBuilder::default();
        let result = builder.add_decisions(
            None,
            vec![
                Decision::new("1", "First"),
                Decision::new("2", "Second"),
                Decision::new("1", "First again"),
            ],
        );

        assert_eq!(result, Err(ModelError::DuplicateDecision("1".to_string())));
        assert!(builder.finish().documentation().is_empty());
    }

    #[test]
    fn test_decision_links_must_resolve_in_scope() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("System", None).unwrap();
        builder
            .add_decisions(None, vec![Decision::new("1", "Workspace level")])
            .unwrap();

        let result = builder.add_decisions(
            Some(system),
            vec![Decision::new("2", "Replace it").with_link("1", "Supersedes")],
        );
        assert_eq!(
            result,
            Err(ModelError::UnknownDecision {
                from: "2".to_string(),
                to: "1".to_string(),
            })
        );

        builder
            .add_decisions(
                None,
                vec![Decision::new("2", "Replace it").with_link("1", "Supersedes")],
            )
            .unwrap();
    }

    #[test]
    fn test_decisions_only_on_systems_containers_and_components() {
        let mut builder = WorkspaceBuilder::default();
        let user = builder.add_person("User", None).unwrap();

        assert!(matches!(
            builder.add_decisions(Some(user), vec![Decision::new("1", "Hire")]),
            Err(ModelError::UnsupportedProperty {
                property: "decisions",
                ..
            })
        ));
    }
}

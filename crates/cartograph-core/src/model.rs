//! The architecture model: elements, their containment tree and the
//! relationship multigraph over them.
//!
//! A [`Model`] is read-only. It is populated through
//! [`WorkspaceBuilder`](crate::builder::WorkspaceBuilder) and handed out once
//! the workspace is finished.

mod element;
mod item;
mod relationship;

pub use element::{Element, ElementId, ElementKind};
pub use item::{INTRA_WORKSPACE_URL_PREFIX, ItemMetadata, Perspective, is_valid_url};
pub(crate) use item::check_property;
pub use relationship::{RELATIONSHIP_TAG, Relationship, RelationshipId, RelationshipOrigin};

use std::collections::HashMap;

use indexmap::IndexMap;

/// Model property that enables nested groups and names their separator.
pub const GROUP_SEPARATOR_PROPERTY: &str = "structurizr.groupSeparator";

/// Elements and relationships of a workspace.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) elements: IndexMap<ElementId, Element>,
    pub(crate) relationships: IndexMap<RelationshipId, Relationship>,
    pub(crate) canonical_names: HashMap<String, ElementId>,
    pub(crate) properties: IndexMap<String, String>,
}

impl Model {
    /// All elements in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element_by_canonical_name(&self, canonical_name: &str) -> Option<&Element> {
        self.canonical_names
            .get(canonical_name)
            .and_then(|id| self.elements.get(id))
    }

    pub fn elements_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements().filter(move |e| e.kind() == kind)
    }

    pub fn elements_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.has_tag(tag))
    }

    /// Direct children of `parent` in the containment tree.
    pub fn children_of(&self, parent: ElementId) -> impl Iterator<Item = &Element> {
        self.elements().filter(move |e| e.parent() == Some(parent))
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut ancestors = Vec::new();
        let mut current = self.element(id).and_then(Element::parent);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.element(parent).and_then(Element::parent);
        }
        ancestors
    }

    /// Whether `ancestor` contains `id`, directly or transitively.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// All relationships in declaration order, implied ones included.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.get(&id)
    }

    pub fn relationships_between(
        &self,
        source: ElementId,
        destination: ElementId,
    ) -> impl Iterator<Item = &Relationship> {
        self.relationships()
            .filter(move |r| r.source() == source && r.destination() == destination)
    }

    /// Relationships whose source is `id`.
    pub fn efferent_relationships(&self, id: ElementId) -> impl Iterator<Item = &Relationship> {
        self.relationships().filter(move |r| r.source() == id)
    }

    /// Relationships whose destination is `id`.
    pub fn afferent_relationships(&self, id: ElementId) -> impl Iterator<Item = &Relationship> {
        self.relationships().filter(move |r| r.destination() == id)
    }

    pub fn has_relationship(&self, source: ElementId, destination: ElementId) -> bool {
        self.relationships_between(source, destination)
            .next()
            .is_some()
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Separator for nested group names, when nested groups are enabled.
    pub fn group_separator(&self) -> Option<&str> {
        self.properties
            .get(GROUP_SEPARATOR_PROPERTY)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

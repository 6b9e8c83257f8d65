//! Relationships between elements.

use std::fmt;

use crate::model::{element::ElementId, item::ItemMetadata};

/// Tag carried by every relationship.
pub const RELATIONSHIP_TAG: &str = "Relationship";

/// Position of a relationship in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(pub(crate) usize);

impl RelationshipId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a relationship came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipOrigin {
    /// Declared by the author.
    Explicit,
    /// Created between ancestors of the endpoints of another relationship.
    Implied(RelationshipId),
    /// Copied between deployment instances from a relationship between the
    /// elements they are instances of.
    Replicated(RelationshipId),
}

/// A directed, described link between two elements.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub(crate) id: RelationshipId,
    pub(crate) source: ElementId,
    pub(crate) destination: ElementId,
    pub(crate) description: String,
    pub(crate) technology: String,
    pub(crate) origin: RelationshipOrigin,
    pub(crate) item: ItemMetadata,
}

impl Relationship {
    pub(crate) fn new(
        id: RelationshipId,
        source: ElementId,
        destination: ElementId,
        description: &str,
        technology: &str,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            description: description.to_string(),
            technology: technology.to_string(),
            origin: RelationshipOrigin::Explicit,
            item: ItemMetadata::with_tags(&[RELATIONSHIP_TAG]),
        }
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    pub fn source(&self) -> ElementId {
        self.source
    }

    pub fn destination(&self) -> ElementId {
        self.destination
    }

    /// Description; empty when the author gave none.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Technology; empty when the author gave none.
    pub fn technology(&self) -> &str {
        &self.technology
    }

    pub fn origin(&self) -> RelationshipOrigin {
        self.origin
    }

    pub fn is_implied(&self) -> bool {
        matches!(self.origin, RelationshipOrigin::Implied(_))
    }

    pub fn item(&self) -> &ItemMetadata {
        &self.item
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.item.has_tag(tag)
    }
}

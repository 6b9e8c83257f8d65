//! Architecture decision records.
//!
//! Decisions belong either to the workspace or to one software system,
//! container or component. Identifiers are unique within that scope, and a
//! decision may link to other decisions of the same scope (for example
//! "Superseded by").

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::model::ElementId;

/// A link from one decision to another in the same scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecisionLink {
    id: String,
    description: String,
}

impl DecisionLink {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
        }
    }

    /// Identifier of the linked decision.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// One architecture decision record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) date: String,
    pub(crate) status: String,
    pub(crate) content: String,
    pub(crate) links: BTreeSet<DecisionLink>,
    pub(crate) element: Option<ElementId>,
}

impl Decision {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            date: String::new(),
            status: String::new(),
            content: String::new(),
            links: BTreeSet::new(),
            element: None,
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    /// Adds a link to another decision. Links to itself are ignored.
    pub fn with_link(mut self, id: &str, description: &str) -> Self {
        if id != self.id {
            self.links.insert(DecisionLink::new(id, description));
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Date as written in the record, usually `yyyy-mm-dd`.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// The full Markdown text of the record.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Links sorted by target identifier.
    pub fn links(&self) -> impl Iterator<Item = &DecisionLink> {
        self.links.iter()
    }

    /// The element this decision documents, or `None` for the workspace.
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }
}

/// Every decision in a workspace, in the order they were imported.
#[derive(Debug, Clone, Default)]
pub struct Documentation {
    pub(crate) decisions: IndexMap<(Option<ElementId>, String), Decision>,
}

impl Documentation {
    /// Decisions recorded against the workspace itself.
    pub fn decisions(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.values().filter(|d| d.element.is_none())
    }

    /// Decisions recorded against `element`.
    pub fn decisions_of(&self, element: ElementId) -> impl Iterator<Item = &Decision> {
        self.decisions
            .values()
            .filter(move |d| d.element == Some(element))
    }

    pub fn decision(&self, element: Option<ElementId>, id: &str) -> Option<&Decision> {
        self.decisions.get(&(element, id.to_string()))
    }

    /// Every decision regardless of scope.
    pub fn all(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.values()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub(crate) fn contains(&self, element: Option<ElementId>, id: &str) -> bool {
        self.decisions.contains_key(&(element, id.to_string()))
    }
}

//! Views: named, ordered selections of elements and relationships.

use std::{collections::HashMap, fmt, str::FromStr};

use indexmap::{IndexMap, IndexSet};

use crate::{
    model::{ElementId, ElementKind, RelationshipId},
    style::Styles,
};

/// The kinds of view a workspace can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    SystemLandscape,
    SystemContext,
    Container,
    Component,
    Dynamic,
    Deployment,
    Custom,
}

impl ViewKind {
    /// Prefix of generated view keys, e.g. `SystemContext-001`.
    pub fn key_prefix(self) -> &'static str {
        match self {
            ViewKind::SystemLandscape => "SystemLandscape",
            ViewKind::SystemContext => "SystemContext",
            ViewKind::Container => "Container",
            ViewKind::Component => "Component",
            ViewKind::Dynamic => "Dynamic",
            ViewKind::Deployment => "Deployment",
            ViewKind::Custom => "Custom",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ViewKind::SystemLandscape => "systemLandscape",
            ViewKind::SystemContext => "systemContext",
            ViewKind::Container => "container",
            ViewKind::Component => "component",
            ViewKind::Dynamic => "dynamic",
            ViewKind::Deployment => "deployment",
            ViewKind::Custom => "custom",
        }
    }

    /// Element kinds this view can show, before scope rules are applied.
    pub fn permits(self, kind: ElementKind) -> bool {
        use ElementKind as K;
        match self {
            ViewKind::SystemLandscape | ViewKind::SystemContext => {
                matches!(kind, K::Person | K::SoftwareSystem | K::CustomElement)
            }
            ViewKind::Container => matches!(
                kind,
                K::Person | K::SoftwareSystem | K::Container | K::CustomElement
            ),
            ViewKind::Component | ViewKind::Dynamic => {
                kind.is_static_structure() || kind.is_custom()
            }
            ViewKind::Deployment => kind.is_deployment(),
            ViewKind::Custom => kind.is_custom(),
        }
    }

    pub fn is_static(self) -> bool {
        !matches!(self, ViewKind::Dynamic)
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Direction in which automatic layout ranks elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDirection {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl FromStr for RankDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tb" => Ok(RankDirection::TopBottom),
            "bt" => Ok(RankDirection::BottomTop),
            "lr" => Ok(RankDirection::LeftRight),
            "rl" => Ok(RankDirection::RightLeft),
            _ => Err(format!(
                "`{s}` is not a valid rank direction, expected one of: tb, bt, lr, rl"
            )),
        }
    }
}

/// Automatic layout settings of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoLayout {
    direction: RankDirection,
    rank_separation: u32,
    node_separation: u32,
}

impl AutoLayout {
    pub const DEFAULT_SEPARATION: u32 = 300;

    pub fn new(direction: RankDirection, rank_separation: u32, node_separation: u32) -> Self {
        Self {
            direction,
            rank_separation,
            node_separation,
        }
    }

    pub fn direction(&self) -> RankDirection {
        self.direction
    }

    pub fn rank_separation(&self) -> u32 {
        self.rank_separation
    }

    pub fn node_separation(&self) -> u32 {
        self.node_separation
    }
}

impl Default for AutoLayout {
    fn default() -> Self {
        Self::new(
            RankDirection::default(),
            Self::DEFAULT_SEPARATION,
            Self::DEFAULT_SEPARATION,
        )
    }
}

/// A relationship as it appears in a view.
///
/// Dynamic views may show the same relationship several times, each with its
/// own description and order. A response is drawn from the relationship's
/// destination back to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipView {
    relationship: RelationshipId,
    source: ElementId,
    destination: ElementId,
    description: String,
    technology: String,
    order: Option<String>,
    response: bool,
}

impl RelationshipView {
    pub(crate) fn new(relationship: RelationshipId, source: ElementId, destination: ElementId) -> Self {
        Self {
            relationship,
            source,
            destination,
            description: String::new(),
            technology: String::new(),
            order: None,
            response: false,
        }
    }

    pub(crate) fn with_interaction(mut self, description: &str, technology: &str) -> Self {
        self.description = description.to_string();
        self.technology = technology.to_string();
        self
    }

    pub(crate) fn as_response(mut self) -> Self {
        self.response = true;
        self
    }

    pub(crate) fn set_order(&mut self, order: String) {
        self.order = Some(order);
    }

    pub fn relationship(&self) -> RelationshipId {
        self.relationship
    }

    /// Element the line is drawn from.
    pub fn source(&self) -> ElementId {
        self.source
    }

    /// Element the line is drawn to.
    pub fn destination(&self) -> ElementId {
        self.destination
    }

    /// Description shown in this view; empty means the model description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Technology the author asked for; empty when none was given.
    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// Ordering label, used by renderers to number dynamic-view steps.
    pub fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    pub fn is_response(&self) -> bool {
        self.response
    }
}

/// An endpoint of a dynamic-view interaction, classified by capability.
///
/// Only static-structure and custom elements can take part in an
/// interaction, so every interaction is one of four combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    StaticStructure(ElementId),
    Custom(ElementId),
}

impl Participant {
    pub fn id(self) -> ElementId {
        match self {
            Participant::StaticStructure(id) | Participant::Custom(id) => id,
        }
    }
}

/// Step numbering of a dynamic view.
///
/// A parallel block numbers its steps from the value current when it opened,
/// and closing it restores that value, so sibling blocks share numbers.
/// Closing the outermost block continues after the highest number used.
#[derive(Debug, Clone, Default)]
pub(crate) struct SequenceCounter {
    value: u32,
    highest: u32,
    saved: Vec<u32>,
}

impl SequenceCounter {
    pub(crate) fn next(&mut self) -> String {
        self.value += 1;
        self.highest = self.highest.max(self.value);
        self.value.to_string()
    }

    pub(crate) fn start_parallel(&mut self) {
        self.saved.push(self.value);
    }

    pub(crate) fn end_parallel(&mut self) -> bool {
        match self.saved.pop() {
            Some(value) if self.saved.is_empty() => {
                self.value = self.highest.max(value);
                true
            }
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }
}

/// A single view.
#[derive(Debug, Clone)]
pub struct View {
    pub(crate) key: String,
    pub(crate) kind: ViewKind,
    pub(crate) scope: Option<ElementId>,
    pub(crate) environment: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) auto_layout: Option<AutoLayout>,
    pub(crate) properties: IndexMap<String, String>,
    pub(crate) elements: IndexSet<ElementId>,
    pub(crate) relationships: Vec<RelationshipView>,
    pub(crate) sequence: SequenceCounter,
}

impl View {
    pub(crate) fn new(key: String, kind: ViewKind, scope: Option<ElementId>) -> Self {
        Self {
            key,
            kind,
            scope,
            environment: None,
            title: None,
            description: None,
            auto_layout: None,
            properties: IndexMap::new(),
            elements: IndexSet::new(),
            relationships: Vec::new(),
            sequence: SequenceCounter::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Software system or container the view is about; `None` for
    /// landscape, custom and unscoped dynamic or deployment views.
    pub fn scope(&self) -> Option<ElementId> {
        self.scope
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn auto_layout(&self) -> Option<&AutoLayout> {
        self.auto_layout.as_ref()
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().copied()
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.contains(&id)
    }

    pub fn relationships(&self) -> &[RelationshipView] {
        &self.relationships
    }

    pub fn contains_relationship(&self, id: RelationshipId) -> bool {
        self.relationships.iter().any(|r| r.relationship == id)
    }
}

/// Every view of a workspace plus the shared styling.
#[derive(Debug, Clone, Default)]
pub struct ViewSet {
    pub(crate) views: IndexMap<String, View>,
    pub(crate) styles: Styles,
    pub(crate) themes: Vec<String>,
    pub(crate) properties: IndexMap<String, String>,
    pub(crate) generated_keys: HashMap<ViewKind, usize>,
}

impl ViewSet {
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn view(&self, key: &str) -> Option<&View> {
        self.views.get(key)
    }

    pub fn views_of_kind(&self, kind: ViewKind) -> impl Iterator<Item = &View> {
        self.views().filter(move |v| v.kind == kind)
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Next unused generated key for `kind`: `SystemContext-001`, `-002`, ...
    pub(crate) fn generate_key(&mut self, kind: ViewKind) -> String {
        loop {
            let counter = self.generated_keys.entry(kind).or_insert(0);
            *counter += 1;
            let key = format!("{}-{:03}", kind.key_prefix(), counter);
            if !self.views.contains_key(&key) {
                return key;
            }
        }
    }
}

/// Checks that a view key only uses letters, digits, `_` and `-`.
pub fn is_valid_view_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_are_sequential_per_kind() {
        let mut views = ViewSet::default();

        assert_eq!(views.generate_key(ViewKind::SystemContext), "SystemContext-001");
        assert_eq!(views.generate_key(ViewKind::SystemContext), "SystemContext-002");
        assert_eq!(views.generate_key(ViewKind::Container), "Container-001");
    }

    #[test]
    fn test_generated_key_skips_taken_keys() {
        let mut views = ViewSet::default();
        views.views.insert(
            "Dynamic-001".to_string(),
            View::new("Dynamic-001".to_string(), ViewKind::Dynamic, None),
        );

        assert_eq!(views.generate_key(ViewKind::Dynamic), "Dynamic-002");
    }

    #[test]
    fn test_view_key_validation() {
        assert!(is_valid_view_key("SystemContext-001"));
        assert!(is_valid_view_key("signin_flow"));
        assert!(!is_valid_view_key("sign in"));
        assert!(!is_valid_view_key(""));
    }

    #[test]
    fn test_sequence_counter_parallel_blocks() {
        let mut counter = SequenceCounter::default();
        assert_eq!(counter.next(), "1");

        counter.start_parallel();
        counter.start_parallel();
        assert_eq!(counter.next(), "2");
        assert_eq!(counter.next(), "3");
        assert!(counter.end_parallel());

        counter.start_parallel();
        assert_eq!(counter.next(), "2");
        assert!(counter.end_parallel());
        assert!(counter.end_parallel());
        assert!(!counter.end_parallel());

        assert_eq!(counter.next(), "4");
    }

    #[test]
    fn test_permitted_kinds() {
        assert!(ViewKind::SystemContext.permits(ElementKind::Person));
        assert!(!ViewKind::SystemContext.permits(ElementKind::Container));
        assert!(ViewKind::Deployment.permits(ElementKind::ContainerInstance));
        assert!(!ViewKind::Dynamic.permits(ElementKind::DeploymentNode));
        assert!(ViewKind::Custom.permits(ElementKind::CustomElement));
    }

    #[test]
    fn test_rank_direction_from_str() {
        assert_eq!("lr".parse(), Ok(RankDirection::LeftRight));
        assert!("diagonal".parse::<RankDirection>().is_err());
    }
}

//! The finished, read-only workspace.

use indexmap::IndexMap;

use crate::{
    configuration::WorkspaceConfiguration, documentation::Documentation, model::Model,
    view::ViewSet,
};

/// Workspace property that switches all advisory recommendations off.
pub const RECOMMENDATIONS_PROPERTY: &str = "structurizr.recommendations";

/// One architecture model plus its views and configuration.
///
/// Produced by [`WorkspaceBuilder::finish`](crate::builder::WorkspaceBuilder::finish);
/// nothing can change a workspace afterwards.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) properties: IndexMap<String, String>,
    pub(crate) configuration: WorkspaceConfiguration,
    pub(crate) model: Model,
    pub(crate) views: ViewSet,
    pub(crate) documentation: Documentation,
}

impl Workspace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn configuration(&self) -> &WorkspaceConfiguration {
        &self.configuration
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    /// Architecture decisions imported into the workspace.
    pub fn documentation(&self) -> &Documentation {
        &self.documentation
    }

    /// Whether advisory recommendations are enabled for this workspace.
    ///
    /// They are on unless the workspace sets
    /// `structurizr.recommendations` to `false`.
    pub fn recommendations_enabled(&self) -> bool {
        !self
            .properties
            .get(RECOMMENDATIONS_PROPERTY)
            .is_some_and(|v| v.eq_ignore_ascii_case("false"))
    }
}

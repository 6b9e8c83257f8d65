//! The context stack: one frame per open block.
//!
//! The top frame decides which statements are legal. Frames carry only the
//! state their block needs, plus the identifier scope that declarations made
//! inside the block are bound in.

use std::fmt;

use cartograph_core::{
    ItemRef,
    model::{ElementId, RelationshipId},
};
use log::debug;

use crate::{registry::ScopeId, span::Span};

/// Where the lines of a `properties` block are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PropertyTarget {
    Workspace,
    Model,
    Item(ItemRef),
    View(String),
    Views,
    ElementStyle(String),
    RelationshipStyle(String),
}

/// A kind of open block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    Workspace,
    Model,
    /// A named group of elements; `parent` is the enclosing software system
    /// or container, if any.
    Group {
        name: String,
        parent: Option<ElementId>,
    },
    /// The body of a person, software system, container, component, custom
    /// element, infrastructure node or instance.
    Element(ElementId),
    DeploymentEnvironment(String),
    DeploymentNode {
        element: ElementId,
        environment: String,
    },
    Relationship(RelationshipId),
    Properties(PropertyTarget),
    Perspectives(ItemRef),
    Views,
    StaticView(String),
    DynamicView(String),
    /// A `{ ... }` parallel sequence inside a dynamic view.
    ParallelSequence(String),
    Styles,
    ElementStyle(String),
    RelationshipStyle(String),
    Configuration,
    Users,
}

impl Context {
    /// Name of the block, used in log lines and error messages.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Context::Workspace => "workspace",
            Context::Model => "model",
            Context::Group { .. } => "group",
            Context::Element(_) => "element",
            Context::DeploymentEnvironment(_) => "deploymentEnvironment",
            Context::DeploymentNode { .. } => "deploymentNode",
            Context::Relationship(_) => "relationship",
            Context::Properties(_) => "properties",
            Context::Perspectives(_) => "perspectives",
            Context::Views => "views",
            Context::StaticView(_) => "view",
            Context::DynamicView(_) => "dynamic view",
            Context::ParallelSequence(_) => "parallel sequence",
            Context::Styles => "styles",
            Context::ElementStyle(_) => "element style",
            Context::RelationshipStyle(_) => "relationship style",
            Context::Configuration => "configuration",
            Context::Users => "users",
        }
    }

    /// The element a block belongs to, used as the implicit relationship
    /// source and as `this`.
    pub(crate) fn element(&self) -> Option<ElementId> {
        match self {
            Context::Element(element) | Context::DeploymentNode { element, .. } => Some(*element),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub context: Context,
    pub scope: ScopeId,
    /// Line on which the block was opened.
    pub line: usize,
    /// The statement that opened the block.
    pub span: Span,
}

#[derive(Debug, Default)]
pub(crate) struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub(crate) fn push(&mut self, context: Context, scope: ScopeId, line: usize, span: Span) {
        debug!(context = context.name(), depth = self.frames.len() + 1, line = line; "Context pushed");
        self.frames.push(Frame {
            context,
            scope,
            line,
            span,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        debug!(context = frame.context.name(), depth = self.frames.len(); "Context popped");
        Some(frame)
    }

    pub(crate) fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Identifier scope of the innermost block.
    pub(crate) fn scope(&self) -> ScopeId {
        self.top().map_or(ScopeId::ROOT, |f| f.scope)
    }

    /// The nearest enclosing element, if any block on the stack has one.
    pub(crate) fn enclosing_element(&self) -> Option<ElementId> {
        self.frames.iter().rev().find_map(|f| f.context.element())
    }

    /// The innermost open group, if it is directly enclosing.
    pub(crate) fn current_group(&self) -> Option<&str> {
        match self.top().map(|f| &f.context) {
            Some(Context::Group { name, .. }) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use cartograph_core::WorkspaceBuilder;

    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = ContextStack::default();
        assert!(stack.top().is_none());

        stack.push(Context::Workspace, ScopeId::ROOT, 1, Span::default());
        stack.push(Context::Model, ScopeId::ROOT, 2, Span::new(12..17));

        assert_eq!(stack.scope(), ScopeId::ROOT);
        assert_eq!(stack.top().map(|f| &f.context), Some(&Context::Model));
        assert_eq!(stack.pop().map(|f| f.line), Some(2));
        assert_eq!(stack.pop().map(|f| f.context), Some(Context::Workspace));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_enclosing_element_skips_non_element_blocks() {
        let mut builder = WorkspaceBuilder::default();
        let system = builder.add_software_system("Bank", None).unwrap();

        let mut stack = ContextStack::default();
        stack.push(Context::Workspace, ScopeId::ROOT, 1, Span::default());
        stack.push(Context::Model, ScopeId::ROOT, 2, Span::default());
        assert_eq!(stack.enclosing_element(), None);

        stack.push(Context::Element(system), ScopeId::ROOT, 3, Span::default());
        stack.push(
            Context::Group {
                name: "Web".to_string(),
                parent: Some(system),
            },
            ScopeId::ROOT,
            4,
            Span::default(),
        );

        assert_eq!(stack.enclosing_element(), Some(system));
        assert_eq!(stack.current_group(), Some("Web"));
    }
}

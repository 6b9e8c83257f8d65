//! Errors raised when a model invariant would be broken.

use thiserror::Error;

use crate::model::ElementKind;

/// A violated model invariant.
///
/// The workspace builder rejects the offending insertion and returns one of
/// these; nothing is added to the model when an error is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("a {kind} named `{name}` already exists")]
    DuplicateElement { kind: ElementKind, name: String },

    #[error("`{container}` already contains an instance of `{element}`")]
    DuplicateInstance { container: String, element: String },

    #[error("a relationship with the description `{description}` between `{from}` and `{to}` already exists")]
    DuplicateRelationship {
        from: String,
        to: String,
        description: String,
    },

    #[error("relationships from `{0}` to itself are not permitted")]
    SelfRelationship(String),

    #[error("relationships cannot be added between parents and children (`{parent}` contains `{child}`)")]
    ParentChildRelationship { parent: String, child: String },

    #[error("a {child} cannot be placed inside a {parent}")]
    IllegalNesting {
        parent: ElementKind,
        child: ElementKind,
    },

    #[error("a {0} must be declared inside its parent")]
    MissingParent(ElementKind),

    #[error("`{element}` ({kind}) cannot be added to the {view} view")]
    IllegalViewElement {
        view: String,
        element: String,
        kind: ElementKind,
    },

    #[error("a {view} view cannot be scoped to `{element}` ({kind})")]
    InvalidViewScope {
        view: String,
        element: String,
        kind: ElementKind,
    },

    #[error("a {kind} does not support `{property}`")]
    UnsupportedProperty {
        kind: ElementKind,
        property: &'static str,
    },

    #[error("a {0} view must be scoped to an element")]
    MissingViewScope(&'static str),

    #[error("a deployment view must name a deployment environment")]
    MissingEnvironment,

    #[error("`{0}` is the scope of this view and cannot be added to it")]
    ViewScopeElement(String),

    #[error("a relationship between `{from}` and `{to}` does not exist in the model")]
    MissingRelationship { from: String, to: String },

    #[error("a view with the key `{0}` already exists")]
    DuplicateViewKey(String),

    #[error("view key `{0}` may only contain letters, digits, underscores and hyphens")]
    InvalidViewKey(String),

    #[error("a perspective named `{0}` already exists")]
    DuplicatePerspective(String),

    #[error("{0}")]
    InvalidPerspective(String),

    #[error("{0}")]
    InvalidProperty(String),

    #[error("`{0}` is not a valid URL")]
    InvalidUrl(String),

    #[error("no element with id {0}")]
    UnknownElement(usize),

    #[error("no relationship with id {0}")]
    UnknownRelationship(usize),

    #[error("no view with the key `{0}`")]
    UnknownView(String),

    #[error("a decision with the id `{0}` already exists")]
    DuplicateDecision(String),

    #[error("decision `{from}` links to `{to}`, which does not exist")]
    UnknownDecision { from: String, to: String },

    #[error("{0}")]
    InvalidDecision(String),

    #[error("`{operation}` is not supported by the {view} view")]
    UnsupportedViewOperation {
        view: String,
        operation: &'static str,
    },
}

//! Cartograph Core Types
//!
//! This crate holds the model graph of a Cartograph architecture workspace.
//! It includes:
//!
//! - **Identifiers**: string-interned identifiers used by the DSL
//!   ([`identifier::Id`])
//! - **Model**: elements, their containment tree and the relationship
//!   multigraph ([`model`] module)
//! - **Views**: view definitions, dynamic-view sequencing and styles
//!   ([`view`] and [`style`] modules)
//! - **Builder**: [`builder::WorkspaceBuilder`], the only way to populate a
//!   model; it enforces the model invariants on every insertion
//! - **Documentation**: architecture decision records
//!   ([`documentation`] module)
//!
//! A finished [`workspace::Workspace`] is read-only.

pub mod builder;
pub mod color;
pub mod configuration;
pub mod documentation;
pub mod error;
pub mod identifier;
pub mod model;
pub mod style;
pub mod view;
pub mod workspace;

pub use builder::{ItemRef, WorkspaceBuilder};
pub use error::ModelError;
pub use workspace::Workspace;

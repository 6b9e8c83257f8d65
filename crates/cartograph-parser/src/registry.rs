//! Identifier registry: binds user-chosen names to model entities.
//!
//! Scopes live in an arena and point at their parent by index. The root
//! scope holds every binding in flat mode; in hierarchical mode each element
//! block opens a scope of its own, lookups walk outward from the current
//! scope, and a dotted path (`bank.api`) descends from the root.

use std::collections::HashMap;

use cartograph_core::{
    identifier::{Id, IdentifierMode, PATH_SEPARATOR},
    model::{ElementId, RelationshipId},
};
use log::trace;
use thiserror::Error;

/// Index of a scope in the registry's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ScopeId(usize);

impl ScopeId {
    pub(crate) const ROOT: ScopeId = ScopeId(0);
}

/// What an identifier is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Element(ElementId),
    Relationship(RelationshipId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("the identifier `{0}` is already in use")]
    Duplicate(String),

    #[error("`{0}` is not a valid identifier, only letters, digits, `_` and `-` are permitted")]
    Invalid(String),
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    bindings: HashMap<Id, Binding>,
}

#[derive(Debug)]
pub(crate) struct IdentifierRegistry {
    mode: IdentifierMode,
    scopes: Vec<Scope>,
    /// The scope opened by each element's block, created on demand.
    element_scopes: HashMap<ElementId, ScopeId>,
}

impl IdentifierRegistry {
    pub(crate) fn new(mode: IdentifierMode) -> Self {
        Self {
            mode,
            scopes: vec![Scope {
                parent: None,
                bindings: HashMap::new(),
            }],
            element_scopes: HashMap::new(),
        }
    }

    /// Switches identifier mode; only honoured before anything is bound.
    pub(crate) fn set_mode(&mut self, mode: IdentifierMode) -> bool {
        if self.scopes.iter().any(|s| !s.bindings.is_empty()) {
            return self.mode == mode;
        }
        self.mode = mode;
        true
    }

    /// The scope that declarations inside `element`'s block are bound in.
    ///
    /// In flat mode this is always the root.
    pub(crate) fn scope_of(&mut self, element: ElementId, parent: ScopeId) -> ScopeId {
        if self.mode == IdentifierMode::Flat {
            return ScopeId::ROOT;
        }
        if let Some(scope) = self.element_scopes.get(&element) {
            return *scope;
        }
        let scope = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(parent),
            bindings: HashMap::new(),
        });
        self.element_scopes.insert(element, scope);
        scope
    }

    /// Binds `name` in `scope`.
    ///
    /// Fails when the name is malformed or already resolves from `scope`:
    /// a name may not shadow one visible in an ancestor scope.
    pub(crate) fn register(
        &mut self,
        name: &str,
        binding: Binding,
        scope: ScopeId,
    ) -> Result<Id, RegistryError> {
        if !is_valid_identifier(name) {
            return Err(RegistryError::Invalid(name.to_string()));
        }
        let id = Id::new(name);
        if self.resolve_in_chain(id, scope).is_some() {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        trace!(name = name, scope = scope.0; "Identifier registered");
        self.scope_mut(scope).bindings.insert(id, binding);
        Ok(id)
    }

    /// Binds the synthesised name of an anonymous entity.
    pub(crate) fn register_anonymous(&mut self, index: usize, binding: Binding, scope: ScopeId) {
        let id = Id::from_anonymous(index);
        self.scope_mut(scope).bindings.insert(id, binding);
    }

    /// Binds a name supplied by a collaborator before parsing begins.
    pub(crate) fn register_external(
        &mut self,
        name: &str,
        binding: Binding,
    ) -> Result<Id, RegistryError> {
        let id = Id::new(name);
        if name.is_empty() || self.scopes[ScopeId::ROOT.0].bindings.contains_key(&id) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.scope_mut(ScopeId::ROOT).bindings.insert(id, binding);
        Ok(id)
    }

    /// Finds the nearest binding of `name` visible from `scope`.
    ///
    /// Dotted paths are resolved from the root, one segment per scope.
    pub(crate) fn resolve(&self, name: &str, scope: ScopeId) -> Option<Binding> {
        let id = Id::new(name);
        if let Some(binding) = self.resolve_in_chain(id, scope) {
            return Some(binding);
        }
        if self.mode == IdentifierMode::Hierarchical && name.contains(PATH_SEPARATOR) {
            return self.resolve_path(name);
        }
        None
    }

    fn resolve_in_chain(&self, id: Id, scope: ScopeId) -> Option<Binding> {
        let mut current = Some(scope);
        while let Some(scope) = current {
            let scope = &self.scopes[scope.0];
            if let Some(binding) = scope.bindings.get(&id) {
                return Some(*binding);
            }
            current = scope.parent;
        }
        None
    }

    fn resolve_path(&self, path: &str) -> Option<Binding> {
        let mut scope = ScopeId::ROOT;
        let mut binding = None;
        for segment in path.split(PATH_SEPARATOR) {
            if binding.is_some() {
                let Some(Binding::Element(element)) = binding else {
                    return None;
                };
                scope = *self.element_scopes.get(&element)?;
            }
            binding = Some(*self.scopes[scope.0].bindings.get(&Id::new(segment))?);
        }
        binding
    }

    fn scope_mut(&mut self, scope: ScopeId) -> &mut Scope {
        &mut self.scopes[scope.0]
    }
}

/// Identifiers are letters, digits, `_` and `-`; anonymous names are
/// reserved.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with("__")
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use cartograph_core::WorkspaceBuilder;
    use proptest::prelude::*;

    use super::*;

    fn elements(count: usize) -> Vec<ElementId> {
        let mut builder = WorkspaceBuilder::default();
        (0..count)
            .map(|i| builder.add_person(&format!("Person {i}"), None).unwrap())
            .collect()
    }

    #[test]
    fn test_flat_mode_shares_one_scope() {
        let ids = elements(3);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Flat);

        let scope = registry.scope_of(ids[0], ScopeId::ROOT);
        assert_eq!(scope, ScopeId::ROOT);

        registry
            .register("api", Binding::Element(ids[1]), scope)
            .unwrap();
        let err = registry
            .register("api", Binding::Element(ids[2]), ScopeId::ROOT)
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("api".to_string()));
    }

    #[test]
    fn test_hierarchical_resolution_walks_outward() {
        let ids = elements(3);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Hierarchical);

        registry
            .register("bank", Binding::Element(ids[0]), ScopeId::ROOT)
            .unwrap();
        let bank = registry.scope_of(ids[0], ScopeId::ROOT);
        registry
            .register("api", Binding::Element(ids[1]), bank)
            .unwrap();

        assert_eq!(registry.resolve("api", bank), Some(Binding::Element(ids[1])));
        assert_eq!(registry.resolve("bank", bank), Some(Binding::Element(ids[0])));
        assert_eq!(registry.resolve("api", ScopeId::ROOT), None);
        assert_eq!(
            registry.resolve("bank.api", ScopeId::ROOT),
            Some(Binding::Element(ids[1]))
        );
        assert_eq!(registry.resolve("bank.missing", ScopeId::ROOT), None);
    }

    #[test]
    fn test_child_cannot_shadow_ancestor() {
        let ids = elements(2);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Hierarchical);

        registry
            .register("bank", Binding::Element(ids[0]), ScopeId::ROOT)
            .unwrap();
        let bank = registry.scope_of(ids[0], ScopeId::ROOT);

        assert!(matches!(
            registry.register("bank", Binding::Element(ids[1]), bank),
            Err(RegistryError::Duplicate(_))
        ));
    }

    #[test]
    fn test_invalid_identifiers() {
        let ids = elements(1);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Flat);

        for name in ["", "a.b", "has space", "__1"] {
            assert_eq!(
                registry.register(name, Binding::Element(ids[0]), ScopeId::ROOT),
                Err(RegistryError::Invalid(name.to_string()))
            );
        }
    }

    #[test]
    fn test_anonymous_and_external_bindings() {
        let ids = elements(2);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Flat);

        registry.register_anonymous(7, Binding::Element(ids[0]), ScopeId::ROOT);
        registry
            .register_external("com.example.Api", Binding::Element(ids[1]))
            .unwrap();

        assert_eq!(registry.resolve("__7", ScopeId::ROOT), Some(Binding::Element(ids[0])));
        assert_eq!(
            registry.resolve("com.example.Api", ScopeId::ROOT),
            Some(Binding::Element(ids[1]))
        );
    }

    #[test]
    fn test_mode_is_fixed_once_bound() {
        let ids = elements(1);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Flat);

        assert!(registry.set_mode(IdentifierMode::Hierarchical));
        registry
            .register("a", Binding::Element(ids[0]), ScopeId::ROOT)
            .unwrap();
        assert!(!registry.set_mode(IdentifierMode::Flat));
        assert!(registry.set_mode(IdentifierMode::Hierarchical));
    }

    fn identifier_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,8}"
    }

    /// The same name in two sibling scopes binds independently.
    fn check_sibling_scopes(name: &str) -> Result<(), TestCaseError> {
        prop_assume!(name != "left-parent" && name != "right-parent");
        let ids = elements(4);
        let mut registry = IdentifierRegistry::new(IdentifierMode::Hierarchical);

        registry
            .register("left-parent", Binding::Element(ids[0]), ScopeId::ROOT)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        registry
            .register("right-parent", Binding::Element(ids[1]), ScopeId::ROOT)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let left = registry.scope_of(ids[0], ScopeId::ROOT);
        let right = registry.scope_of(ids[1], ScopeId::ROOT);

        let first = registry.register(name, Binding::Element(ids[2]), left);
        let second = registry.register(name, Binding::Element(ids[3]), right);
        prop_assert!(first.is_ok());
        prop_assert!(second.is_ok());
        prop_assert_eq!(registry.resolve(name, left), Some(Binding::Element(ids[2])));
        prop_assert_eq!(registry.resolve(name, right), Some(Binding::Element(ids[3])));
        Ok(())
    }

    /// A second binding of a name in the same scope always fails.
    fn check_same_scope(name: &str, mode: IdentifierMode) -> Result<(), TestCaseError> {
        let ids = elements(2);
        let mut registry = IdentifierRegistry::new(mode);

        prop_assert!(registry.register(name, Binding::Element(ids[0]), ScopeId::ROOT).is_ok());
        prop_assert_eq!(
            registry.register(name, Binding::Element(ids[1]), ScopeId::ROOT),
            Err(RegistryError::Duplicate(name.to_string()))
        );
        prop_assert_eq!(registry.resolve(name, ScopeId::ROOT), Some(Binding::Element(ids[0])));
        Ok(())
    }

    proptest! {
        #[test]
        fn sibling_scopes_may_reuse_names(name in identifier_strategy()) {
            check_sibling_scopes(&name)?;
        }

        #[test]
        fn same_scope_rejects_duplicates(
            name in identifier_strategy(),
            hierarchical in any::<bool>(),
        ) {
            let mode = if hierarchical { IdentifierMode::Hierarchical } else { IdentifierMode::Flat };
            check_same_scope(&name, mode)?;
        }
    }
}

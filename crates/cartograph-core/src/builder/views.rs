//! View, style and theme operations of the workspace builder.

use log::trace;

use super::WorkspaceBuilder;
use crate::{
    error::ModelError,
    model::{ElementId, ElementKind, RelationshipId, is_valid_url, check_property},
    style::{ElementStyle, RelationshipStyle},
    view::{AutoLayout, Participant, RelationshipView, View, ViewKind, is_valid_view_key},
};

/// Which elements a view accepts, derived from its kind and scope.
#[derive(Debug, Clone, Copy)]
enum Eligibility {
    /// People, software systems and custom elements.
    Landscape,
    /// Landscape elements except `system`, plus containers. With
    /// `own_only`, only the containers of `system`.
    Containers { system: ElementId, own_only: bool },
    /// Container-view elements except `container` and its parent, plus
    /// components. With `own_only`, only the components of `container`.
    Components {
        container: ElementId,
        own_only: bool,
    },
    Deployment,
    Custom,
}

impl WorkspaceBuilder {
    /// Declares a view and returns its key.
    ///
    /// When `key` is `None` a key is generated from the view kind.
    pub fn add_view(
        &mut self,
        kind: ViewKind,
        key: Option<&str>,
        scope: Option<ElementId>,
        environment: Option<&str>,
    ) -> Result<String, ModelError> {
        self.check_view_scope(kind, scope)?;
        if kind == ViewKind::Deployment && environment.is_none() {
            return Err(ModelError::MissingEnvironment);
        }

        let key = match key {
            Some(key) if !is_valid_view_key(key) => {
                return Err(ModelError::InvalidViewKey(key.to_string()));
            }
            Some(key) if self.views.views.contains_key(key) => {
                return Err(ModelError::DuplicateViewKey(key.to_string()));
            }
            Some(key) => key.to_string(),
            None => self.views.generate_key(kind),
        };

        let mut view = View::new(key.clone(), kind, scope);
        view.environment = environment.map(str::to_string);
        trace!(key = key.as_str(), kind = kind.keyword(); "View added");
        self.views.views.insert(key.clone(), view);
        Ok(key)
    }

    pub fn set_view_title(&mut self, key: &str, title: &str) -> Result<(), ModelError> {
        self.view_mut(key)?.title = Some(title.to_string());
        Ok(())
    }

    pub fn set_view_description(&mut self, key: &str, description: &str) -> Result<(), ModelError> {
        self.view_mut(key)?.description = Some(description.to_string());
        Ok(())
    }

    pub fn set_auto_layout(&mut self, key: &str, auto_layout: AutoLayout) -> Result<(), ModelError> {
        self.view_mut(key)?.auto_layout = Some(auto_layout);
        Ok(())
    }

    pub fn add_view_property(&mut self, key: &str, name: &str, value: &str) -> Result<(), ModelError> {
        check_property(name, value)?;
        self.view_mut(key)?
            .properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Checks whether `element` may appear in the view, explaining why not.
    pub fn check_view_element(&self, key: &str, element: ElementId) -> Result<(), ModelError> {
        let view = self.view(key)?;
        self.check_eligible(view, element)
    }

    pub fn can_include(&self, key: &str, element: ElementId) -> bool {
        self.check_view_element(key, element).is_ok()
    }

    /// Adds an element to a view.
    ///
    /// Static views also pick up every relationship between the element and
    /// elements already shown; deployment views add the enclosing
    /// deployment nodes.
    pub fn include_element(&mut self, key: &str, element: ElementId) -> Result<(), ModelError> {
        self.check_view_element(key, element)?;
        self.insert_view_elements(key, element, true)
    }

    /// Removes an element and every relationship touching it from a view.
    pub fn exclude_element(&mut self, key: &str, element: ElementId) -> Result<(), ModelError> {
        self.element(element)?;
        let view = self.view_mut(key)?;
        view.elements.shift_remove(&element);
        view.relationships
            .retain(|r| r.source() != element && r.destination() != element);
        Ok(())
    }

    /// Adds a relationship and its endpoints to a static view.
    pub fn include_relationship(
        &mut self,
        key: &str,
        relationship: RelationshipId,
    ) -> Result<(), ModelError> {
        let view = self.view(key)?;
        if !view.kind.is_static() {
            return Err(ModelError::UnsupportedViewOperation {
                view: view.key.clone(),
                operation: "include",
            });
        }
        let r = self.relationship(relationship)?;
        let (source, destination) = (r.source, r.destination);
        self.check_eligible(view, source)?;
        self.check_eligible(view, destination)?;

        self.insert_view_elements(key, source, false)?;
        self.insert_view_elements(key, destination, false)?;
        let view = self.view_mut(key)?;
        if !view.contains_relationship(relationship) {
            view.relationships
                .push(RelationshipView::new(relationship, source, destination));
        }
        Ok(())
    }

    pub fn exclude_relationship(
        &mut self,
        key: &str,
        relationship: RelationshipId,
    ) -> Result<(), ModelError> {
        self.relationship(relationship)?;
        self.view_mut(key)?
            .relationships
            .retain(|r| r.relationship() != relationship);
        Ok(())
    }

    /// Handles `include *`: the default elements of the view, which are its
    /// scope's contents plus their nearest neighbours. Neighbours the view
    /// cannot show are skipped.
    pub fn include_default_elements(&mut self, key: &str) -> Result<(), ModelError> {
        let view = self.view(key)?;
        let candidates: Vec<ElementId> = match (view.kind, view.scope) {
            (ViewKind::SystemContext, Some(system)) => {
                let mut ids = vec![system];
                ids.extend(self.neighbours(system));
                ids
            }
            (ViewKind::Container | ViewKind::Component, Some(parent)) => {
                let children: Vec<ElementId> =
                    self.model.children_of(parent).map(|e| e.id).collect();
                let mut ids = children.clone();
                for child in children {
                    ids.extend(self.neighbours(child));
                }
                ids
            }
            (ViewKind::Dynamic, _) => {
                return Err(ModelError::UnsupportedViewOperation {
                    view: view.key.clone(),
                    operation: "include *",
                });
            }
            _ => self.model.elements().map(|e| e.id).collect(),
        };

        for id in candidates {
            if self.can_include(key, id) {
                self.insert_view_elements(key, id, true)?;
            }
        }
        Ok(())
    }

    /// Adds an interaction between two elements to a dynamic view.
    ///
    /// The interaction is backed by the model relationship from `source` to
    /// `destination` (restricted to `technology` when one is given,
    /// preferring one whose description matches). Failing that, the reverse
    /// relationship is used and the interaction is drawn as a response.
    pub fn add_dynamic_interaction(
        &mut self,
        key: &str,
        source: Participant,
        destination: Participant,
        description: &str,
        technology: &str,
        order: Option<&str>,
    ) -> Result<(), ModelError> {
        let view = self.dynamic_view(key)?;
        for participant in [source, destination] {
            self.check_participant(participant)?;
            self.check_eligible(view, participant.id())?;
        }
        let (s, d) = (source.id(), destination.id());

        let inclusion = match self.find_backing_relationship(s, d, description, technology) {
            Some(relationship) => RelationshipView::new(relationship, s, d),
            None => match self.find_backing_relationship(d, s, description, technology) {
                Some(relationship) => RelationshipView::new(relationship, s, d).as_response(),
                None => {
                    return Err(ModelError::MissingRelationship {
                        from: self.element(s)?.name.clone(),
                        to: self.element(d)?.name.clone(),
                    });
                }
            },
        };
        self.push_dynamic_inclusion(key, inclusion.with_interaction(description, technology), order)
    }

    /// Adds an existing model relationship to a dynamic view with a
    /// view-specific description.
    pub fn add_dynamic_relationship(
        &mut self,
        key: &str,
        relationship: RelationshipId,
        description: &str,
        order: Option<&str>,
    ) -> Result<(), ModelError> {
        let view = self.dynamic_view(key)?;
        let r = self.relationship(relationship)?;
        let (s, d) = (r.source, r.destination);
        self.check_eligible(view, s)?;
        self.check_eligible(view, d)?;

        let inclusion = RelationshipView::new(relationship, s, d).with_interaction(description, "");
        self.push_dynamic_inclusion(key, inclusion, order)
    }

    pub fn start_parallel_sequence(&mut self, key: &str) -> Result<(), ModelError> {
        self.dynamic_view(key)?;
        self.view_mut(key)?.sequence.start_parallel();
        Ok(())
    }

    /// Closes the innermost parallel sequence; `false` when none is open.
    pub fn end_parallel_sequence(&mut self, key: &str) -> Result<bool, ModelError> {
        self.dynamic_view(key)?;
        Ok(self.view_mut(key)?.sequence.end_parallel())
    }

    /// Style for elements tagged `tag`, created on first use.
    pub fn element_style_mut(&mut self, tag: &str) -> &mut ElementStyle {
        self.views.styles.element_style_mut(tag)
    }

    pub fn relationship_style_mut(&mut self, tag: &str) -> &mut RelationshipStyle {
        self.views.styles.relationship_style_mut(tag)
    }

    pub fn add_theme(&mut self, url: &str) -> Result<(), ModelError> {
        if !is_valid_url(url) {
            return Err(ModelError::InvalidUrl(url.to_string()));
        }
        if !self.views.themes.iter().any(|t| t == url) {
            self.views.themes.push(url.to_string());
        }
        Ok(())
    }

    pub fn add_views_property(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        check_property(name, value)?;
        self.views
            .properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn view(&self, key: &str) -> Result<&View, ModelError> {
        self.views
            .views
            .get(key)
            .ok_or_else(|| ModelError::UnknownView(key.to_string()))
    }

    fn view_mut(&mut self, key: &str) -> Result<&mut View, ModelError> {
        self.views
            .views
            .get_mut(key)
            .ok_or_else(|| ModelError::UnknownView(key.to_string()))
    }

    fn dynamic_view(&self, key: &str) -> Result<&View, ModelError> {
        let view = self.view(key)?;
        if view.kind != ViewKind::Dynamic {
            return Err(ModelError::UnsupportedViewOperation {
                view: view.key.clone(),
                operation: "interaction",
            });
        }
        Ok(view)
    }

    fn check_view_scope(&self, kind: ViewKind, scope: Option<ElementId>) -> Result<(), ModelError> {
        let Some(scope) = scope else {
            return match kind {
                ViewKind::SystemContext | ViewKind::Container | ViewKind::Component => {
                    Err(ModelError::MissingViewScope(kind.keyword()))
                }
                _ => Ok(()),
            };
        };

        let element = self.element(scope)?;
        let permitted = match kind {
            ViewKind::SystemContext | ViewKind::Container | ViewKind::Deployment => {
                element.kind == ElementKind::SoftwareSystem
            }
            ViewKind::Component => element.kind == ElementKind::Container,
            ViewKind::Dynamic => matches!(
                element.kind,
                ElementKind::SoftwareSystem | ElementKind::Container
            ),
            ViewKind::SystemLandscape | ViewKind::Custom => false,
        };
        if permitted {
            Ok(())
        } else {
            Err(ModelError::InvalidViewScope {
                view: kind.keyword().to_string(),
                element: element.name.clone(),
                kind: element.kind,
            })
        }
    }

    fn eligibility(&self, view: &View) -> Eligibility {
        let scope = view
            .scope
            .and_then(|id| self.model.element(id))
            .map(|e| (e.id, e.kind));
        match (view.kind, scope) {
            (ViewKind::Container, Some((system, _))) => Eligibility::Containers {
                system,
                own_only: false,
            },
            (ViewKind::Component, Some((container, _))) => Eligibility::Components {
                container,
                own_only: false,
            },
            (ViewKind::Dynamic, Some((system, ElementKind::SoftwareSystem))) => {
                Eligibility::Containers {
                    system,
                    own_only: true,
                }
            }
            (ViewKind::Dynamic, Some((container, _))) => Eligibility::Components {
                container,
                own_only: true,
            },
            (ViewKind::Deployment, _) => Eligibility::Deployment,
            (ViewKind::Custom, _) => Eligibility::Custom,
            _ => Eligibility::Landscape,
        }
    }

    fn check_eligible(&self, view: &View, id: ElementId) -> Result<(), ModelError> {
        let element = self.element(id)?;
        let kind = element.kind;
        let illegal = || ModelError::IllegalViewElement {
            view: view.key.clone(),
            element: element.name.clone(),
            kind,
        };
        let is_scope = || Err(ModelError::ViewScopeElement(element.name.clone()));

        match self.eligibility(view) {
            Eligibility::Landscape => match kind {
                ElementKind::Person | ElementKind::SoftwareSystem | ElementKind::CustomElement => {
                    Ok(())
                }
                _ => Err(illegal()),
            },
            Eligibility::Containers { system, own_only } => match kind {
                ElementKind::Person | ElementKind::CustomElement => Ok(()),
                ElementKind::SoftwareSystem if id == system => is_scope(),
                ElementKind::SoftwareSystem => Ok(()),
                ElementKind::Container if own_only && element.parent != Some(system) => {
                    Err(illegal())
                }
                ElementKind::Container => Ok(()),
                _ => Err(illegal()),
            },
            Eligibility::Components {
                container,
                own_only,
            } => {
                let system = self.model.element(container).and_then(|c| c.parent);
                match kind {
                    ElementKind::Person | ElementKind::CustomElement => Ok(()),
                    ElementKind::SoftwareSystem if Some(id) == system => is_scope(),
                    ElementKind::SoftwareSystem => Ok(()),
                    ElementKind::Container if id == container => is_scope(),
                    ElementKind::Container => Ok(()),
                    ElementKind::Component if own_only && element.parent != Some(container) => {
                        Err(illegal())
                    }
                    ElementKind::Component => Ok(()),
                    _ => Err(illegal()),
                }
            }
            Eligibility::Deployment => {
                if !kind.is_deployment() || element.environment != view.environment {
                    return Err(illegal());
                }
                let Some(system) = view.scope else {
                    return Ok(());
                };
                let deployed = match kind {
                    ElementKind::SoftwareSystemInstance => element.instance_of == Some(system),
                    ElementKind::ContainerInstance => element
                        .instance_of
                        .and_then(|c| self.model.element(c))
                        .is_some_and(|c| c.parent == Some(system)),
                    _ => true,
                };
                if deployed { Ok(()) } else { Err(illegal()) }
            }
            Eligibility::Custom if kind.is_custom() => Ok(()),
            Eligibility::Custom => Err(illegal()),
        }
    }

    fn check_participant(&self, participant: Participant) -> Result<(), ModelError> {
        let element = self.element(participant.id())?;
        let matches = match participant {
            Participant::StaticStructure(_) => element.kind.is_static_structure(),
            Participant::Custom(_) => element.kind.is_custom(),
        };
        if matches {
            Ok(())
        } else {
            Err(ModelError::IllegalViewElement {
                view: ViewKind::Dynamic.keyword().to_string(),
                element: element.name.clone(),
                kind: element.kind,
            })
        }
    }

    /// Elements related to `id` in either direction.
    fn neighbours(&self, id: ElementId) -> Vec<ElementId> {
        self.model
            .efferent_relationships(id)
            .map(|r| r.destination)
            .chain(self.model.afferent_relationships(id).map(|r| r.source))
            .filter(|&other| other != id)
            .collect()
    }

    fn find_backing_relationship(
        &self,
        source: ElementId,
        destination: ElementId,
        description: &str,
        technology: &str,
    ) -> Option<RelationshipId> {
        let candidates: Vec<_> = self
            .model
            .relationships_between(source, destination)
            .filter(|r| technology.is_empty() || r.technology == technology)
            .collect();
        candidates
            .iter()
            .find(|r| r.description == description)
            .or_else(|| candidates.first())
            .map(|r| r.id)
    }

    /// Inserts `element` (and, for deployment views, its enclosing nodes)
    /// into a view, optionally with the relationships to what is already
    /// shown.
    fn insert_view_elements(
        &mut self,
        key: &str,
        element: ElementId,
        with_relationships: bool,
    ) -> Result<(), ModelError> {
        let view = self.view(key)?;
        let mut ids = Vec::new();
        if view.kind == ViewKind::Deployment {
            ids.extend(self.model.ancestors(element).into_iter().rev());
        }
        ids.push(element);
        ids.retain(|id| !view.contains_element(*id));
        if ids.is_empty() {
            return Ok(());
        }

        let shown = |id: ElementId| view.contains_element(id) || ids.contains(&id);
        let relationships: Vec<RelationshipView> = if with_relationships && view.kind.is_static() {
            self.model
                .relationships()
                .filter(|r| shown(r.source) && shown(r.destination))
                .filter(|r| ids.contains(&r.source) || ids.contains(&r.destination))
                .filter(|r| !view.contains_relationship(r.id))
                .map(|r| RelationshipView::new(r.id, r.source, r.destination))
                .collect()
        } else {
            Vec::new()
        };

        let view = self.view_mut(key)?;
        view.elements.extend(ids);
        view.relationships.extend(relationships);
        Ok(())
    }

    /// Numbers an interaction and appends it, with its endpoints, to a
    /// dynamic view. The view's counter advances even when `order` is given.
    fn push_dynamic_inclusion(
        &mut self,
        key: &str,
        mut inclusion: RelationshipView,
        order: Option<&str>,
    ) -> Result<(), ModelError> {
        let view = self.view_mut(key)?;
        let next = view.sequence.next();
        inclusion.set_order(order.map_or(next, str::to_string));
        view.elements.insert(inclusion.source());
        view.elements.insert(inclusion.destination());
        view.relationships.push(inclusion);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bank {
        builder: WorkspaceBuilder,
        customer: ElementId,
        bank: ElementId,
        email: ElementId,
        web: ElementId,
        api: ElementId,
        signin: ElementId,
    }

    fn bank() -> Bank {
        let mut builder = WorkspaceBuilder::default();
        let customer = builder.add_person("Customer", None).unwrap();
        let bank = builder.add_software_system("Internet Banking", None).unwrap();
        let email = builder.add_software_system("E-mail", None).unwrap();
        let web = builder.add_container(bank, "Web", None).unwrap();
        let api = builder.add_container(bank, "API", None).unwrap();
        let signin = builder.add_component(api, "Sign In", None).unwrap();
        builder.add_relationship(customer, web, "Uses", "HTTPS").unwrap();
        builder.add_relationship(web, signin, "Calls", "JSON").unwrap();
        builder.add_relationship(api, email, "Sends e-mail using", "SMTP").unwrap();
        Bank {
            builder,
            customer,
            bank,
            email,
            web,
            api,
            signin,
        }
    }

    #[test]
    fn test_view_keys() {
        let Bank {
            mut builder, bank, ..
        } = bank();

        let generated = builder
            .add_view(ViewKind::SystemContext, None, Some(bank), None)
            .unwrap();
        assert_eq!(generated, "SystemContext-001");

        builder
            .add_view(ViewKind::Container, Some("containers"), Some(bank), None)
            .unwrap();
        assert!(matches!(
            builder.add_view(ViewKind::Container, Some("containers"), Some(bank), None),
            Err(ModelError::DuplicateViewKey(_))
        ));
        assert!(matches!(
            builder.add_view(ViewKind::SystemLandscape, Some("my view"), None, None),
            Err(ModelError::InvalidViewKey(_))
        ));
    }

    #[test]
    fn test_view_scope_validation() {
        let Bank {
            mut builder,
            customer,
            web,
            ..
        } = bank();

        assert!(matches!(
            builder.add_view(ViewKind::SystemContext, None, Some(customer), None),
            Err(ModelError::InvalidViewScope { .. })
        ));
        assert!(matches!(
            builder.add_view(ViewKind::Component, None, None, None),
            Err(ModelError::MissingViewScope(_))
        ));
        assert!(builder.add_view(ViewKind::Dynamic, None, Some(web), None).is_ok());
    }

    #[test]
    fn test_system_context_default_elements() {
        let Bank {
            mut builder,
            customer,
            bank,
            email,
            web,
            ..
        } = bank();
        let key = builder
            .add_view(ViewKind::SystemContext, None, Some(bank), None)
            .unwrap();

        builder.include_default_elements(&key).unwrap();

        let view = builder.views().view(&key).unwrap();
        let elements: Vec<_> = view.elements().collect();
        assert_eq!(elements, vec![bank, email, customer]);
        assert!(!view.contains_element(web));
        assert_eq!(view.relationships().len(), 2);
    }

    #[test]
    fn test_container_view_rejects_scope_and_components() {
        let Bank {
            mut builder,
            bank,
            signin,
            web,
            ..
        } = bank();
        let key = builder
            .add_view(ViewKind::Container, None, Some(bank), None)
            .unwrap();

        assert!(matches!(
            builder.include_element(&key, bank),
            Err(ModelError::ViewScopeElement(_))
        ));
        assert!(matches!(
            builder.include_element(&key, signin),
            Err(ModelError::IllegalViewElement { .. })
        ));
        assert!(builder.include_element(&key, web).is_ok());
    }

    #[test]
    fn test_include_pulls_relationships_and_exclude_removes_them() {
        let Bank {
            mut builder,
            customer,
            bank,
            web,
            ..
        } = bank();
        let key = builder
            .add_view(ViewKind::Container, None, Some(bank), None)
            .unwrap();

        builder.include_element(&key, customer).unwrap();
        builder.include_element(&key, web).unwrap();
        assert_eq!(builder.views().view(&key).unwrap().relationships().len(), 1);

        builder.exclude_element(&key, web).unwrap();
        let view = builder.views().view(&key).unwrap();
        assert!(!view.contains_element(web));
        assert!(view.relationships().is_empty());
    }

    #[test]
    fn test_dynamic_interaction_defaults_and_ordering() {
        let Bank {
            mut builder,
            customer,
            bank,
            web,
            ..
        } = bank();
        let key = builder
            .add_view(ViewKind::Dynamic, Some("signin"), Some(bank), None)
            .unwrap();

        builder
            .add_dynamic_interaction(
                &key,
                Participant::StaticStructure(customer),
                Participant::StaticStructure(web),
                "",
                "",
                None,
            )
            .unwrap();
        builder
            .add_dynamic_interaction(
                &key,
                Participant::StaticStructure(web),
                Participant::StaticStructure(customer),
                "Returns page",
                "",
                Some("1a"),
            )
            .unwrap();

        let view = builder.views().view(&key).unwrap();
        let [first, second] = view.relationships() else {
            panic!("expected two interactions");
        };
        assert_eq!(first.description(), "");
        assert_eq!(first.order(), Some("1"));
        assert!(!first.is_response());
        assert_eq!(second.order(), Some("1a"));
        assert!(second.is_response());
    }

    #[test]
    fn test_dynamic_interaction_without_relationship() {
        let Bank {
            mut builder,
            customer,
            email,
            ..
        } = bank();
        let key = builder.add_view(ViewKind::Dynamic, None, None, None).unwrap();

        assert!(matches!(
            builder.add_dynamic_interaction(
                &key,
                Participant::StaticStructure(customer),
                Participant::StaticStructure(email),
                "Reads",
                "",
                None,
            ),
            Err(ModelError::MissingRelationship { .. })
        ));
    }

    #[test]
    fn test_dynamic_scoped_to_container_only_takes_its_components() {
        let Bank {
            mut builder,
            api,
            web,
            signin,
            ..
        } = bank();
        let key = builder.add_view(ViewKind::Dynamic, None, Some(api), None).unwrap();

        assert!(builder.can_include(&key, web));
        assert!(builder.can_include(&key, signin));
        assert!(!builder.can_include(&key, api));
    }

    #[test]
    fn test_deployment_view_adds_enclosing_nodes() {
        let Bank {
            mut builder,
            bank,
            web,
            ..
        } = bank();
        let server = builder.add_deployment_node("Live", None, "Server").unwrap();
        let jvm = builder.add_deployment_node("Live", Some(server), "JVM").unwrap();
        let instance = builder.add_instance(jvm, web).unwrap();
        let dev = builder.add_deployment_node("Dev", None, "Laptop").unwrap();

        let key = builder
            .add_view(ViewKind::Deployment, None, Some(bank), Some("Live"))
            .unwrap();
        builder.include_element(&key, instance).unwrap();

        let elements: Vec<_> = builder.views().view(&key).unwrap().elements().collect();
        assert_eq!(elements, vec![server, jvm, instance]);
        assert!(!builder.can_include(&key, dev));
    }

    #[test]
    fn test_themes_require_urls() {
        let mut builder = WorkspaceBuilder::default();

        assert!(builder.add_theme("https://example.com/theme.json").is_ok());
        assert!(matches!(
            builder.add_theme("theme.json"),
            Err(ModelError::InvalidUrl(_))
        ));
        assert_eq!(builder.views().themes().len(), 1);
    }
}

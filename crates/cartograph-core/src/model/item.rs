//! Metadata shared by elements and relationships.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::error::ModelError;

/// Prefix of URLs that point at another part of the same workspace.
pub const INTRA_WORKSPACE_URL_PREFIX: &str = "{workspace}";

/// A named perspective on an element or relationship, e.g. `Security`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perspective {
    name: String,
    description: String,
    value: Option<String>,
}

impl Perspective {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: value.filter(|v| !v.is_empty()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Tags, properties, perspectives and URL carried by every model item.
///
/// Tags keep insertion order, so the default tags of an element kind always
/// come first. Perspectives are kept sorted by name.
#[derive(Debug, Clone, Default)]
pub struct ItemMetadata {
    tags: IndexSet<String>,
    properties: IndexMap<String, String>,
    perspectives: BTreeMap<String, Perspective>,
    url: Option<String>,
}

impl ItemMetadata {
    pub(crate) fn with_tags(tags: &[&str]) -> Self {
        let mut item = Self::default();
        for tag in tags {
            item.add_tags(tag);
        }
        item
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag.trim())
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn perspectives(&self) -> impl Iterator<Item = &Perspective> {
        self.perspectives.values()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Adds a comma-separated list of tags, ignoring blanks and duplicates.
    pub(crate) fn add_tags(&mut self, tags: &str) {
        for tag in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            self.tags.insert(tag.to_string());
        }
    }

    pub(crate) fn set_url(&mut self, url: &str) -> Result<(), ModelError> {
        if url.trim().is_empty() {
            self.url = None;
            return Ok(());
        }
        if !is_valid_url(url) {
            return Err(ModelError::InvalidUrl(url.to_string()));
        }
        self.url = Some(url.to_string());
        Ok(())
    }

    pub(crate) fn add_property(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        check_property(name, value)?;
        self.properties.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub(crate) fn add_perspective(&mut self, perspective: Perspective) -> Result<(), ModelError> {
        if perspective.name.is_empty() {
            return Err(ModelError::InvalidPerspective(
                "a perspective name must be specified".to_string(),
            ));
        }
        if perspective.description.is_empty() {
            return Err(ModelError::InvalidPerspective(format!(
                "a description for perspective `{}` must be specified",
                perspective.name
            )));
        }
        if self.perspectives.contains_key(&perspective.name) {
            return Err(ModelError::DuplicatePerspective(perspective.name));
        }
        self.perspectives
            .insert(perspective.name.clone(), perspective);
        Ok(())
    }
}

/// Properties need a non-empty name and value.
pub(crate) fn check_property(name: &str, value: &str) -> Result<(), ModelError> {
    if name.is_empty() {
        return Err(ModelError::InvalidProperty(
            "a property name must be specified".to_string(),
        ));
    }
    if value.is_empty() {
        return Err(ModelError::InvalidProperty(format!(
            "a value for property `{name}` must be specified"
        )));
    }
    Ok(())
}

/// Checks a URL the way model items accept them.
///
/// Accepted forms are intra-workspace links (`{workspace}...`), links to
/// another workspace (`{workspace:42}/...`) and absolute URLs with a scheme
/// and a non-empty remainder.
pub fn is_valid_url(url: &str) -> bool {
    if url.starts_with(INTRA_WORKSPACE_URL_PREFIX) {
        return true;
    }

    if let Some(rest) = url.strip_prefix("{workspace:") {
        if let Some((number, path)) = rest.split_once('}') {
            return !number.is_empty()
                && number.chars().all(|c| c.is_ascii_digit())
                && path.starts_with('/');
        }
        return false;
    }

    match url.split_once("://") {
        Some((scheme, rest)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !rest.is_empty()
                && !rest.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

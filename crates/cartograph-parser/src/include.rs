//! Access to sources named by `!include` and `!adrs`.
//!
//! The interpreter never touches the file system itself; whoever drives a
//! parse supplies a [`SourceResolver`] that turns an include path into
//! source text, and a document directory into the documents inside it.

/// A source fragment returned for an `!include`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedSource {
    /// Stable name of the source, e.g. its canonical path. Used to detect
    /// include cycles and to label diagnostics.
    pub name: String,
    pub content: String,
}

impl IncludedSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Resolves the target of an `!include` statement.
pub trait SourceResolver {
    /// Reads the sources `path` refers to, in the order they should be
    /// interpreted.
    ///
    /// `from` names the including source, or is `None` for the root source.
    /// A path naming a directory may yield several sources.
    fn resolve(&self, path: &str, from: Option<&str>) -> Result<Vec<IncludedSource>, String>;

    /// Reads the documents in the directory `path`: every file directly
    /// inside it whose extension is `extension`, sorted by name.
    ///
    /// Resolvers that cannot list directories keep the default, which
    /// refuses.
    fn resolve_documents(
        &self,
        path: &str,
        _from: Option<&str>,
        _extension: &str,
    ) -> Result<Vec<IncludedSource>, String> {
        Err(format!("cannot read documents from `{path}`: no document resolver is configured"))
    }
}

/// Resolver for parses that have no sources besides the one given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncludes;

impl SourceResolver for NoIncludes {
    fn resolve(&self, path: &str, _from: Option<&str>) -> Result<Vec<IncludedSource>, String> {
        Err(format!("cannot include `{path}`: no include resolver is configured"))
    }
}

/// Resolver backed by a fixed set of named sources.
///
/// Useful when sources come from memory rather than a file system.
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    sources: Vec<IncludedSource>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.sources.push(IncludedSource::new(name, content));
        self
    }
}

impl SourceResolver for InMemorySources {
    fn resolve(&self, path: &str, _from: Option<&str>) -> Result<Vec<IncludedSource>, String> {
        self.sources
            .iter()
            .find(|s| s.name == path)
            .map(|s| vec![s.clone()])
            .ok_or_else(|| format!("`{path}` does not exist"))
    }

    fn resolve_documents(
        &self,
        path: &str,
        _from: Option<&str>,
        extension: &str,
    ) -> Result<Vec<IncludedSource>, String> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let suffix = format!(".{extension}");
        let mut documents: Vec<_> = self
            .sources
            .iter()
            .filter(|s| {
                s.name
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/') && rest.ends_with(&suffix))
            })
            .cloned()
            .collect();
        if documents.is_empty() {
            return Err(format!("`{path}` contains no `{suffix}` documents"));
        }
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_includes_rejects_everything() {
        assert!(NoIncludes.resolve("model.dsl", None).is_err());
    }

    #[test]
    fn test_in_memory_sources() {
        let sources = InMemorySources::new().with_source("people.dsl", "user = person User");

        let found = sources.resolve("people.dsl", None).unwrap();
        assert_eq!(found, vec![IncludedSource::new("people.dsl", "user = person User")]);
        assert!(sources.resolve("missing.dsl", Some("people.dsl")).is_err());
    }

    #[test]
    fn test_in_memory_documents_are_listed_by_name() {
        let sources = InMemorySources::new()
            .with_source("docs/adr/0002-use-postgres.md", "# 2. Use Postgres")
            .with_source("docs/adr/0001-record.md", "# 1. Record")
            .with_source("docs/adr/notes.txt", "scratch")
            .with_source("docs/adr/old/0001-old.md", "# 1. Old");

        let names: Vec<_> = sources
            .resolve_documents("docs/adr/", None, "md")
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["docs/adr/0001-record.md", "docs/adr/0002-use-postgres.md"]);
        assert!(sources.resolve_documents("docs/none", None, "md").is_err());
        assert!(NoIncludes.resolve_documents("docs/adr", None, "md").is_err());
    }
}

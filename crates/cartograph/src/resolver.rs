//! Reads `!include` and `!adrs` targets from the file system.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, trace};

use cartograph_parser::include::{IncludedSource, SourceResolver};

/// Extension of files picked up when a directory is included.
const SOURCE_EXTENSION: &str = "dsl";

/// Resolves include paths against the directory of the including file.
///
/// Paths from the root source are resolved against `base`. Including a
/// directory reads every `.dsl` file directly inside it, sorted by name.
/// Sources are named by their canonical path, which is what include cycle
/// detection compares.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    base: PathBuf,
}

impl FileSystemResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Canonical name of `path`, as used for source names.
    pub fn source_name(path: &Path) -> String {
        fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string()
    }

    fn directory_of(&self, from: Option<&str>) -> PathBuf {
        from.map(Path::new)
            .and_then(Path::parent)
            .map_or_else(|| self.base.clone(), Path::to_path_buf)
    }

    fn read(path: &Path) -> Result<IncludedSource, String> {
        let content = fs::read_to_string(path)
            .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
        Ok(IncludedSource::new(Self::source_name(path), content))
    }

    fn read_directory(path: &Path, extension: &str) -> Result<Vec<IncludedSource>, String> {
        let entries = fs::read_dir(path)
            .map_err(|err| format!("cannot read directory `{}`: {err}", path.display()))?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(extension))
            .collect();
        files.sort();

        debug!(directory = path.display().to_string(), files = files.len(); "Reading directory");
        files.iter().map(|file| Self::read(file)).collect()
    }
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

impl SourceResolver for FileSystemResolver {
    fn resolve(&self, path: &str, from: Option<&str>) -> Result<Vec<IncludedSource>, String> {
        if is_remote(path) {
            return Err(format!("cannot include `{path}`: only local files can be included"));
        }

        let target = self.directory_of(from).join(path);
        trace!(path = path, target = target.display().to_string(); "Resolving include");
        if target.is_dir() {
            Self::read_directory(&target, SOURCE_EXTENSION)
        } else if target.is_file() {
            Self::read(&target).map(|source| vec![source])
        } else {
            Err(format!("`{}` does not exist", target.display()))
        }
    }

    fn resolve_documents(
        &self,
        path: &str,
        from: Option<&str>,
        extension: &str,
    ) -> Result<Vec<IncludedSource>, String> {
        if is_remote(path) {
            return Err(format!("cannot read `{path}`: only local directories can be read"));
        }

        let target = self.directory_of(from).join(path);
        trace!(path = path, target = target.display().to_string(); "Resolving documents");
        if !target.is_dir() {
            return Err(format!("`{}` is not a directory", target.display()));
        }
        Self::read_directory(&target, extension)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_resolves_relative_to_base() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("people.dsl"), "customer = person \"Customer\"").unwrap();

        let resolver = FileSystemResolver::new(dir.path());
        let sources = resolver.resolve("people.dsl", None).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].content, "customer = person \"Customer\"");
    }

    #[test]
    fn test_resolves_relative_to_including_file() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("model");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("systems.dsl"), "bank = softwareSystem \"Bank\"").unwrap();
        let including = nested.join("people.dsl");
        fs::write(&including, "").unwrap();

        let resolver = FileSystemResolver::new(dir.path());
        let from = FileSystemResolver::source_name(&including);
        let sources = resolver.resolve("systems.dsl", Some(&from)).unwrap();

        assert_eq!(sources[0].content, "bank = softwareSystem \"Bank\"");
    }

    #[test]
    fn test_directory_sources_are_sorted() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model");
        fs::create_dir(&model).unwrap();
        fs::write(model.join("b.dsl"), "b").unwrap();
        fs::write(model.join("a.dsl"), "a").unwrap();
        fs::write(model.join("notes.txt"), "ignored").unwrap();

        let resolver = FileSystemResolver::new(dir.path());
        let contents: Vec<_> = resolver
            .resolve("model", None)
            .unwrap()
            .into_iter()
            .map(|s| s.content)
            .collect();

        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_and_remote_sources() {
        let dir = tempdir().unwrap();
        let resolver = FileSystemResolver::new(dir.path());

        assert!(resolver.resolve("missing.dsl", None).is_err());
        assert!(
            resolver
                .resolve("https://example.com/model.dsl", None)
                .is_err()
        );
    }

    #[test]
    fn test_documents_are_read_by_extension() {
        let dir = tempdir().unwrap();
        let adr = dir.path().join("adr");
        fs::create_dir(&adr).unwrap();
        fs::write(adr.join("0002-b.md"), "# 2. B").unwrap();
        fs::write(adr.join("0001-a.md"), "# 1. A").unwrap();
        fs::write(adr.join("model.dsl"), "ignored").unwrap();

        let resolver = FileSystemResolver::new(dir.path());
        let contents: Vec<_> = resolver
            .resolve_documents("adr", None, "md")
            .unwrap()
            .into_iter()
            .map(|s| s.content)
            .collect();

        assert_eq!(contents, vec!["# 1. A", "# 2. B"]);
        assert!(resolver.resolve_documents("adr/0001-a.md", None, "md").is_err());
    }
}

//! Cartograph - software architecture models as code.
//!
//! Loads workspaces written in the Cartograph DSL: people, software
//! systems, containers, components and deployment nodes, the relationships
//! between them, and the views drawn from them.

pub mod config;

mod error;
mod resolver;
mod summary;

pub use cartograph_core::{
    Workspace, color, configuration, documentation, identifier, model, style, view,
};
pub use cartograph_parser::{ParsedWorkspace, error as diagnostics};

pub use error::CartographError;
pub use resolver::FileSystemResolver;

use std::{fs, path::Path};

use log::{debug, info, trace};

use cartograph_parser::Interpreter;

use config::AppConfig;

/// Loader for Cartograph workspaces.
///
/// # Examples
///
/// ```rust
/// use cartograph::{WorkspaceLoader, config::AppConfig};
///
/// let source = r#"
///     workspace "Banking" {
///         model {
///             customer = person "Customer"
///             bank = softwareSystem "Bank"
///             customer -> bank "Uses"
///         }
///     }
/// "#;
///
/// let loader = WorkspaceLoader::new(AppConfig::default());
/// let parsed = loader.parse(source).expect("Failed to parse");
/// assert_eq!(parsed.workspace().model().relationships().count(), 1);
///
/// // Or use default config
/// let loader = WorkspaceLoader::default();
/// ```
#[derive(Debug, Default)]
pub struct WorkspaceLoader {
    config: AppConfig,
}

impl WorkspaceLoader {
    /// Create a new loader with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse workspace source held in memory.
    ///
    /// `!include` is refused, as there is no file to resolve it against;
    /// use [`WorkspaceLoader::load`] for sources on disk.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Parse` with the first fatal diagnostic and
    /// the warnings raised before it.
    pub fn parse(&self, source: &str) -> Result<ParsedWorkspace, CartographError> {
        info!("Parsing workspace");

        let parsed = cartograph_parser::parse(source, self.config.parser().parse_options())
            .map_err(|err| CartographError::new_parse_error(err, source, None))?;

        debug!(warnings = parsed.warnings().len(); "Workspace parsed successfully");
        trace!(workspace:? = parsed.workspace(); "Parsed workspace");
        Ok(parsed)
    }

    /// Load a workspace from a file.
    ///
    /// `!include` paths are resolved relative to the file that contains
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Read` when the file cannot be read and
    /// `CartographError::Parse` when it does not parse.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ParsedWorkspace, CartographError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading workspace");

        let source = fs::read_to_string(path).map_err(|source| CartographError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = FileSystemResolver::source_name(path);
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let resolver = FileSystemResolver::new(base);

        let parsed = Interpreter::new(self.config.parser().parse_options())
            .with_resolver(&resolver)
            .parse_named(&source, &name)
            .map_err(|err| CartographError::new_parse_error(err, source.as_str(), Some(name.clone())))?;

        info!(
            path = path.display().to_string(),
            elements = parsed.workspace().model().elements().count(),
            views = parsed.workspace().views().views().count();
            "Workspace loaded"
        );
        Ok(parsed)
    }

    /// Render a plain-text summary of a workspace.
    pub fn render_summary(&self, workspace: &Workspace) -> String {
        summary::render_summary(workspace)
    }
}

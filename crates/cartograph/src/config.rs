//! Configuration types for loading Cartograph workspaces.
//!
//! All types implement [`serde::Deserialize`] so they can be read from a
//! TOML file by the CLI or built in code by library users.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`ParserConfig`] - Defaults for every parse. The `!identifiers` and
//!   `!impliedRelationships` directives still override them per workspace.
//!
//! # Example
//!
//! ```
//! # use cartograph::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [parser]
//!     identifiers = "hierarchical"
//!     warnings_as_errors = true
//!     "#,
//! )
//! .unwrap();
//! assert!(config.parser().warnings_as_errors());
//! ```

use serde::Deserialize;

use cartograph_core::identifier::IdentifierMode;
use cartograph_parser::ParseOptions;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parser configuration section.
    #[serde(default)]
    parser: ParserConfig,
}

impl AppConfig {
    pub fn new(parser: ParserConfig) -> Self {
        Self { parser }
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }
}

/// Defaults applied to every parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Identifier mode used until a workspace selects one.
    identifiers: IdentifierMode,

    /// Whether implied relationships are created.
    implied_relationships: bool,

    /// Refuse `!include` when set.
    restricted: bool,

    /// Promote warnings to errors.
    warnings_as_errors: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            identifiers: IdentifierMode::Flat,
            implied_relationships: true,
            restricted: false,
            warnings_as_errors: false,
        }
    }
}

impl ParserConfig {
    pub fn new(
        identifiers: IdentifierMode,
        implied_relationships: bool,
        restricted: bool,
        warnings_as_errors: bool,
    ) -> Self {
        Self {
            identifiers,
            implied_relationships,
            restricted,
            warnings_as_errors,
        }
    }

    pub fn identifiers(&self) -> IdentifierMode {
        self.identifiers
    }

    pub fn implied_relationships(&self) -> bool {
        self.implied_relationships
    }

    pub fn restricted(&self) -> bool {
        self.restricted
    }

    pub fn warnings_as_errors(&self) -> bool {
        self.warnings_as_errors
    }

    /// The options handed to the parser.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new(
            self.identifiers,
            self.implied_relationships,
            self.restricted,
            self.warnings_as_errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parse_options() {
        assert_eq!(
            ParserConfig::default().parse_options(),
            ParseOptions::default()
        );
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str("[parser]\nimplied_relationships = false\n").unwrap();
        let parser = config.parser();

        assert!(!parser.implied_relationships());
        assert_eq!(parser.identifiers(), IdentifierMode::Flat);
        assert!(!parser.restricted());
    }

    #[test]
    fn test_empty_file() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.parser().implied_relationships());
    }

    #[test]
    fn test_unknown_identifier_mode() {
        assert!(toml::from_str::<AppConfig>("[parser]\nidentifiers = \"nested\"\n").is_err());
    }
}

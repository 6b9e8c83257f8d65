//! Interned identifiers for DSL names.
//!
//! Every user-chosen identifier in a workspace source (`user`, `webapp`,
//! `system.api`) is interned once and compared by symbol afterwards. The
//! registry in the parser keys its scopes by [`Id`], so lookups never hash
//! or compare full strings.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::Deserialize;
use string_interner::{DefaultStringInterner, DefaultSymbol};

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Separator used between the segments of a hierarchical identifier.
pub const PATH_SEPARATOR: char = '.';

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        // A poisoned interner still holds valid symbols; keep using it.
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An interned identifier.
///
/// # Examples
///
/// ```
/// use cartograph_core::identifier::Id;
///
/// let system = Id::new("bank");
/// let api = system.create_nested(Id::new("api"));
/// assert_eq!(api, "bank.api");
///
/// let anonymous = Id::from_anonymous(7);
/// assert_eq!(anonymous, "__7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Synthesises the identifier bound to an element or relationship whose
    /// author gave it no name.
    ///
    /// The index is the entity's position in the model, so parsing the same
    /// source twice produces the same anonymous identifiers.
    pub fn from_anonymous(idx: usize) -> Self {
        Self::new(&format!("__{idx}"))
    }

    /// Joins this identifier and `child` with [`PATH_SEPARATOR`].
    pub fn create_nested(&self, child: Id) -> Self {
        let mut interner = interner();
        let nested = match (interner.resolve(self.0), interner.resolve(child.0)) {
            (Some(parent), Some(child)) => format!("{parent}{PATH_SEPARATOR}{child}"),
            // Symbols only come from this interner, so both always resolve.
            _ => String::new(),
        };
        Self(interner.get_or_intern(nested))
    }

    /// Returns `true` for identifiers synthesised by [`Id::from_anonymous`].
    pub fn is_anonymous(&self) -> bool {
        self.with_str(|s| s.starts_with("__"))
    }

    /// Returns `true` if this identifier contains a path separator.
    pub fn is_path(&self) -> bool {
        self.with_str(|s| s.contains(PATH_SEPARATOR))
    }

    /// Splits a hierarchical identifier into its segments.
    pub fn segments(&self) -> Vec<Id> {
        let text = self.to_string();
        text.split(PATH_SEPARATOR).map(Id::new).collect()
    }

    fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// How identifiers declared inside element blocks are scoped.
///
/// In `Flat` mode every identifier lives in the workspace-wide scope. In
/// `Hierarchical` mode identifiers are scoped to their enclosing element and
/// may be referenced from outside with a dotted path such as `bank.api`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierMode {
    #[default]
    Flat,
    Hierarchical,
}

impl std::str::FromStr for IdentifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "hierarchical" => Ok(Self::Hierarchical),
            other => Err(format!(
                "identifier mode `{other}` is not supported, expected `flat` or `hierarchical`"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_new_interns_equal_names() {
        let a = Id::new("customer");
        let b = Id::new("customer");
        let c = Id::new("admin");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "customer");
    }

    #[test]
    fn test_from_anonymous_is_deterministic() {
        assert_eq!(Id::from_anonymous(3), Id::from_anonymous(3));
        assert_ne!(Id::from_anonymous(3), Id::from_anonymous(4));
        assert!(Id::from_anonymous(3).is_anonymous());
        assert!(!Id::new("named").is_anonymous());
    }

    #[test]
    fn test_create_nested_uses_dots() {
        let system = Id::new("bank");
        let container = system.create_nested(Id::new("web"));
        let component = container.create_nested(Id::new("signin"));

        assert_eq!(container, "bank.web");
        assert_eq!(component, "bank.web.signin");
        assert!(component.is_path());
        assert_eq!(
            component.segments(),
            vec![Id::new("bank"), Id::new("web"), Id::new("signin")]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Id::new("display_me").to_string(), "display_me");
    }

    #[test]
    fn test_identifier_mode_from_str() {
        assert_eq!("flat".parse::<IdentifierMode>(), Ok(IdentifierMode::Flat));
        assert_eq!(
            "Hierarchical".parse::<IdentifierMode>(),
            Ok(IdentifierMode::Hierarchical)
        );
        assert!("nested".parse::<IdentifierMode>().is_err());
    }

    proptest! {
        #[test]
        fn prop_nested_segments_round_trip(parts in prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..5)) {
            let ids: Vec<Id> = parts.iter().map(|p| Id::new(p)).collect();
            let nested = ids[1..]
                .iter()
                .fold(ids[0], |acc, child| acc.create_nested(*child));

            prop_assert_eq!(nested.to_string(), parts.join("."));
            prop_assert_eq!(nested.segments(), ids);
            prop_assert_eq!(nested.is_path(), parts.len() > 1);
        }
    }
}

//! Colours used by element and relationship styles.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// A CSS colour such as `#1168bd`, `rgb(8, 66, 123)` or `white`.
///
/// The text the author wrote is kept so styles can be echoed back verbatim.
#[derive(Clone, Debug)]
pub struct Color {
    color: DynamicColor,
    source: String,
}

impl Color {
    /// Parses a CSS colour string.
    ///
    /// # Examples
    ///
    /// ```
    /// use cartograph_core::color::Color;
    ///
    /// assert!(Color::new("#08427b").is_ok());
    /// assert!(Color::new("not-a-colour").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(|color| Self {
                color,
                source: color_str.to_string(),
            })
            .map_err(|err| format!("invalid colour `{color_str}`: {err}"))
    }

    /// Returns the colour exactly as written in the source.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color.to_string().hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_named() {
        let hex = Color::new("#ffffff").unwrap();
        let named = Color::new("white").unwrap();

        assert_eq!(hex, Color::new("#ffffff").unwrap());
        assert_eq!(hex.as_str(), "#ffffff");
        assert_eq!(named.to_string(), "white");
    }

    #[test]
    fn test_invalid_colour() {
        let err = Color::new("#zzzzzz").unwrap_err();
        assert!(err.contains("#zzzzzz"));
    }
}

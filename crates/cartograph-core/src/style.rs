//! Element and relationship styles, keyed by tag.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;

use crate::color::Color;

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// All accepted spellings, for error messages.
            pub fn variants() -> &'static [&'static str] {
                &[$($text),+]
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(format!(
                    "`{s}` is not a valid {}, expected one of: {}",
                    stringify!($name).to_ascii_lowercase(),
                    Self::variants().join(", ")
                ))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(
    /// Shape used to draw an element.
    Shape {
        Box => "Box",
        RoundedBox => "RoundedBox",
        Circle => "Circle",
        Ellipse => "Ellipse",
        Hexagon => "Hexagon",
        Diamond => "Diamond",
        Cylinder => "Cylinder",
        Bucket => "Bucket",
        Pipe => "Pipe",
        Person => "Person",
        Robot => "Robot",
        Folder => "Folder",
        WebBrowser => "WebBrowser",
        Window => "Window",
        MobileDevicePortrait => "MobileDevicePortrait",
        MobileDeviceLandscape => "MobileDeviceLandscape",
        Component => "Component",
    }
);

keyword_enum!(
    /// Border of an element shape.
    Border {
        Solid => "solid",
        Dashed => "dashed",
        Dotted => "dotted",
    }
);

keyword_enum!(
    /// Line style of a relationship.
    LineStyle {
        Solid => "solid",
        Dashed => "dashed",
        Dotted => "dotted",
    }
);

keyword_enum!(
    /// How relationship lines are routed.
    Routing {
        Direct => "Direct",
        Orthogonal => "Orthogonal",
        Curved => "Curved",
    }
);

/// One property of an element style.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementStyleProperty {
    Shape(Shape),
    Icon(String),
    Width(u32),
    Height(u32),
    Background(Color),
    Color(Color),
    Stroke(Color),
    StrokeWidth(u32),
    FontSize(u32),
    Border(Border),
    Opacity(u8),
    Metadata(bool),
    Description(bool),
}

/// Style applied to every element carrying `tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    tag: String,
    shape: Option<Shape>,
    icon: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    background: Option<Color>,
    color: Option<Color>,
    stroke: Option<Color>,
    stroke_width: Option<u32>,
    font_size: Option<u32>,
    border: Option<Border>,
    opacity: Option<u8>,
    metadata: Option<bool>,
    description: Option<bool>,
    properties: IndexMap<String, String>,
}

impl ElementStyle {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            shape: None,
            icon: None,
            width: None,
            height: None,
            background: None,
            color: None,
            stroke: None,
            stroke_width: None,
            font_size: None,
            border: None,
            opacity: None,
            metadata: None,
            description: None,
            properties: IndexMap::new(),
        }
    }

    /// Sets one property; a later value for the same property wins.
    pub fn apply(&mut self, property: ElementStyleProperty) {
        match property {
            ElementStyleProperty::Shape(v) => self.shape = Some(v),
            ElementStyleProperty::Icon(v) => self.icon = Some(v),
            ElementStyleProperty::Width(v) => self.width = Some(v),
            ElementStyleProperty::Height(v) => self.height = Some(v),
            ElementStyleProperty::Background(v) => self.background = Some(v),
            ElementStyleProperty::Color(v) => self.color = Some(v),
            ElementStyleProperty::Stroke(v) => self.stroke = Some(v),
            ElementStyleProperty::StrokeWidth(v) => self.stroke_width = Some(v),
            ElementStyleProperty::FontSize(v) => self.font_size = Some(v),
            ElementStyleProperty::Border(v) => self.border = Some(v),
            ElementStyleProperty::Opacity(v) => self.opacity = Some(v),
            ElementStyleProperty::Metadata(v) => self.metadata = Some(v),
            ElementStyleProperty::Description(v) => self.description = Some(v),
        }
    }

    pub fn add_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn background(&self) -> Option<&Color> {
        self.background.as_ref()
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn stroke(&self) -> Option<&Color> {
        self.stroke.as_ref()
    }

    pub fn stroke_width(&self) -> Option<u32> {
        self.stroke_width
    }

    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn border(&self) -> Option<Border> {
        self.border
    }

    pub fn opacity(&self) -> Option<u8> {
        self.opacity
    }

    pub fn metadata(&self) -> Option<bool> {
        self.metadata
    }

    pub fn description(&self) -> Option<bool> {
        self.description
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }
}

/// One property of a relationship style.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipStyleProperty {
    Thickness(u32),
    Color(Color),
    Style(LineStyle),
    Routing(Routing),
    FontSize(u32),
    Width(u32),
    Position(u8),
    Opacity(u8),
}

/// Style applied to every relationship carrying `tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipStyle {
    tag: String,
    thickness: Option<u32>,
    color: Option<Color>,
    style: Option<LineStyle>,
    routing: Option<Routing>,
    font_size: Option<u32>,
    width: Option<u32>,
    position: Option<u8>,
    opacity: Option<u8>,
    properties: IndexMap<String, String>,
}

impl RelationshipStyle {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            thickness: None,
            color: None,
            style: None,
            routing: None,
            font_size: None,
            width: None,
            position: None,
            opacity: None,
            properties: IndexMap::new(),
        }
    }

    pub fn apply(&mut self, property: RelationshipStyleProperty) {
        match property {
            RelationshipStyleProperty::Thickness(v) => self.thickness = Some(v),
            RelationshipStyleProperty::Color(v) => self.color = Some(v),
            RelationshipStyleProperty::Style(v) => self.style = Some(v),
            RelationshipStyleProperty::Routing(v) => self.routing = Some(v),
            RelationshipStyleProperty::FontSize(v) => self.font_size = Some(v),
            RelationshipStyleProperty::Width(v) => self.width = Some(v),
            RelationshipStyleProperty::Position(v) => self.position = Some(v),
            RelationshipStyleProperty::Opacity(v) => self.opacity = Some(v),
        }
    }

    pub fn add_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn thickness(&self) -> Option<u32> {
        self.thickness
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn style(&self) -> Option<LineStyle> {
        self.style
    }

    pub fn routing(&self) -> Option<Routing> {
        self.routing
    }

    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn position(&self) -> Option<u8> {
        self.position
    }

    pub fn opacity(&self) -> Option<u8> {
        self.opacity
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }
}

/// All styles of a workspace.
#[derive(Debug, Clone, Default)]
pub struct Styles {
    elements: IndexMap<String, ElementStyle>,
    relationships: IndexMap<String, RelationshipStyle>,
}

impl Styles {
    pub fn element_styles(&self) -> impl Iterator<Item = &ElementStyle> {
        self.elements.values()
    }

    pub fn element_style(&self, tag: &str) -> Option<&ElementStyle> {
        self.elements.get(tag)
    }

    pub fn relationship_styles(&self) -> impl Iterator<Item = &RelationshipStyle> {
        self.relationships.values()
    }

    pub fn relationship_style(&self, tag: &str) -> Option<&RelationshipStyle> {
        self.relationships.get(tag)
    }

    /// Returns the style for `tag`, creating an empty one first if needed.
    pub(crate) fn element_style_mut(&mut self, tag: &str) -> &mut ElementStyle {
        self.elements
            .entry(tag.to_string())
            .or_insert_with(|| ElementStyle::new(tag))
    }

    pub(crate) fn relationship_style_mut(&mut self, tag: &str) -> &mut RelationshipStyle {
        self.relationships
            .entry(tag.to_string())
            .or_insert_with(|| RelationshipStyle::new(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_enums_parse_case_insensitively() {
        assert_eq!("cylinder".parse(), Ok(Shape::Cylinder));
        assert_eq!("WebBrowser".parse(), Ok(Shape::WebBrowser));
        assert_eq!("DASHED".parse(), Ok(Border::Dashed));
        assert_eq!("orthogonal".parse(), Ok(Routing::Orthogonal));
    }

    #[test]
    fn test_keyword_enum_error_lists_variants() {
        let err = "Triangle".parse::<Shape>().unwrap_err();
        assert!(err.contains("Triangle"));
        assert!(err.contains("RoundedBox"));
    }

    #[test]
    fn test_element_style_later_value_wins() {
        let mut styles = Styles::default();
        let style = styles.element_style_mut("Person");
        style.apply(ElementStyleProperty::Shape(Shape::Box));
        style.apply(ElementStyleProperty::Shape(Shape::Person));

        assert_eq!(
            styles.element_style("Person").and_then(ElementStyle::shape),
            Some(Shape::Person)
        );
    }

    #[test]
    fn test_relationship_style_created_once() {
        let mut styles = Styles::default();
        styles
            .relationship_style_mut("Async")
            .apply(RelationshipStyleProperty::Style(LineStyle::Dashed));
        styles
            .relationship_style_mut("Async")
            .apply(RelationshipStyleProperty::Thickness(3));

        assert_eq!(styles.relationship_styles().count(), 1);
        let style = styles.relationship_style("Async").unwrap();
        assert_eq!(style.style(), Some(LineStyle::Dashed));
        assert_eq!(style.thickness(), Some(3));
    }
}

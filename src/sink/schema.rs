//! Property schema and settings model.

use serde_json::{Map, Value};

/// Settings object of a sink (or of a group within it), keyed by property name.
pub type Settings = Map<String, Value>;

/// Member of a font settings object holding the style bitmask.
pub const FONT_FLAGS_KEY: &str = "flags";

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Boolean leaf.
    Bool,
    /// Text leaf.
    Text,
    /// Font leaf: an object whose [`FONT_FLAGS_KEY`] member is a bitmask.
    Font,
    /// Group of nested properties; its settings live in a nested object.
    Group(PropertySchema),
    /// Any other kind; bindings targeting it do nothing.
    Other,
}

/// A named property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (settings key).
    pub name: String,
    /// Declared type.
    pub kind: PropertyKind,
}

impl Property {
    /// Create a new property.
    pub fn new(name: &str, kind: PropertyKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Ordered list of properties with lookup by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySchema {
    properties: Vec<Property>,
}

impl PropertySchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property.
    pub fn with(mut self, name: &str, kind: PropertyKind) -> Self {
        self.properties.push(Property::new(name, kind));
        self
    }

    /// Append a boolean property.
    pub fn bool(self, name: &str) -> Self {
        self.with(name, PropertyKind::Bool)
    }

    /// Append a text property.
    pub fn text(self, name: &str) -> Self {
        self.with(name, PropertyKind::Text)
    }

    /// Append a font property.
    pub fn font(self, name: &str) -> Self {
        self.with(name, PropertyKind::Font)
    }

    /// Append a group property.
    pub fn group(self, name: &str, nested: PropertySchema) -> Self {
        self.with(name, PropertyKind::Group(nested))
    }

    /// Append a property of a kind bindings do not handle.
    pub fn other(self, name: &str) -> Self {
        self.with(name, PropertyKind::Other)
    }

    /// Look up a property by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Iterate properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Number of top-level properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if schema is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

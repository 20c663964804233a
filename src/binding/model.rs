//! Binding data model.

use serde::{Deserialize, Deserializer, Serialize};

/// Name given to newly created bindings.
pub const DEFAULT_BINDING_NAME: &str = "New Binding";

/// One projection from a scoreboard range onto a sink property.
///
/// Serialized field names are stable; the `alias`es accept records written
/// with the legacy field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Binding {
    /// Disabled bindings are skipped by the engine.
    pub enabled: bool,
    /// User label, display only.
    pub name: String,
    /// 1-based start position in the scoreboard buffer.
    pub item_number: u32,
    /// Number of positions projected.
    pub field_length: u32,
    /// Target sink ID (empty = inert).
    #[serde(alias = "source_id")]
    pub sink_id: String,
    /// Group names down to the target property; the last element is the leaf.
    #[serde(alias = "parent_prop", deserialize_with = "path_elements")]
    pub parent_path: Vec<String>,
    /// Strip leading/trailing spaces before writing a text leaf.
    #[serde(alias = "trim_str")]
    pub trim: bool,
    /// Invert the boolean reading of the range.
    #[serde(alias = "invert_bool")]
    pub invert: bool,
    /// Bits set or cleared on a font leaf's style flags.
    pub flag_value: u32,
}

/// One element of a stored property path.
///
/// Legacy records wrap each name in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum PathElement {
    Name(String),
    Legacy { parent_prop_elem: String },
}

fn path_elements<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let elements = Vec::<PathElement>::deserialize(deserializer)?;
    Ok(elements
        .into_iter()
        .map(|element| match element {
            PathElement::Name(name) | PathElement::Legacy { parent_prop_elem: name } => name,
        })
        .collect())
}

impl Binding {
    /// Create a disabled binding with the given label.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Disable the binding and forget its target and transforms.
    ///
    /// Applied when the target sink no longer exists. The label and range
    /// are kept.
    pub fn reset_sink(&mut self) {
        self.enabled = false;
        self.sink_id.clear();
        self.parent_path.clear();
        self.trim = false;
        self.invert = false;
        self.flag_value = 0;
    }

    /// 0-based `(start, len)` of the projected range.
    ///
    /// `None` when `item_number` is 0, which addresses nothing.
    pub fn byte_range(&self) -> Option<(usize, usize)> {
        let start = usize::try_from(self.item_number.checked_sub(1)?).ok()?;
        let len = usize::try_from(self.field_length).ok()?;
        Some((start, len))
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self {
            enabled: false,
            name: DEFAULT_BINDING_NAME.to_string(),
            item_number: 1,
            field_length: 1,
            sink_id: String::new(),
            parent_path: Vec::new(),
            trim: false,
            invert: false,
            flag_value: 0,
        }
    }
}

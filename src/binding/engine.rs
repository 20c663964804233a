//! Binding engine.
//!
//! For every enabled binding: resolve the sink, read the projected range,
//! walk the group path through the sink's schema and settings, coerce the
//! range to the leaf's kind, then commit and refresh the sink.
//!
//! Range readings:
//! - boolean: true iff any byte is not a space, then `invert` applied
//! - text: the bytes as a string, optionally space-trimmed
//! - font: the boolean reading sets or clears `flag_value` in the style flags
//!
//! A failure affects only the binding it occurs in. An unresolvable sink
//! resets the binding so it stops referencing a sink that is gone.

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::Binding;
use crate::scoreboard::{ScoreboardBuffer, FILL};
use crate::sink::{PropertyKind, Settings, Sink, SinkRegistry, FONT_FLAGS_KEY};

/// Why a binding could not be applied this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("binding has no property path")]
    EmptyPath,

    #[error("item number must be at least 1")]
    InvalidItemNumber,

    #[error("property '{0}' not found")]
    MissingProperty(String),

    #[error("property '{0}' is not a group")]
    NotAGroup(String),

    #[error("setting '{0}' is not an object")]
    NotAnObject(String),
}

/// What one evaluation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Bindings whose sink received a new value.
    pub updated: usize,
    /// Bindings targeting a leaf kind that takes no value.
    pub ignored: usize,
    /// Bindings that failed to resolve their property path.
    pub failed: usize,
    /// Bindings reset because their sink no longer exists.
    pub reset: usize,
}

/// Outcome of applying one binding.
enum Applied {
    Written,
    Ignored,
}

/// Evaluate every enabled binding against `buffer`.
///
/// Never fails as a whole; see [`EvaluationSummary`] for per-binding results.
pub fn evaluate<R>(
    bindings: &mut [Binding],
    buffer: &ScoreboardBuffer,
    registry: &mut R,
) -> EvaluationSummary
where
    R: SinkRegistry + ?Sized,
{
    let mut summary = EvaluationSummary::default();

    for binding in bindings.iter_mut().filter(|b| b.enabled) {
        let Some(sink) = registry.resolve(&binding.sink_id) else {
            debug!(
                binding = %binding.name,
                sink_id = %binding.sink_id,
                "sink not found, resetting binding"
            );
            binding.reset_sink();
            summary.reset += 1;
            continue;
        };

        match apply(binding, buffer, sink) {
            Ok(Applied::Written) => summary.updated += 1,
            Ok(Applied::Ignored) => summary.ignored += 1,
            Err(e) => {
                debug!(binding = %binding.name, error = %e, "skipping binding");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Apply one binding to its resolved sink.
fn apply(
    binding: &Binding,
    buffer: &ScoreboardBuffer,
    sink: &mut dyn Sink,
) -> Result<Applied, BindingError> {
    let (leaf, groups) = binding
        .parent_path
        .split_last()
        .ok_or(BindingError::EmptyPath)?;
    let (start, len) = binding
        .byte_range()
        .ok_or(BindingError::InvalidItemNumber)?;
    // padding is all spaces, so only the written part matters for
    // booleans and trimmed text
    let written = buffer.written(start, len);

    let schema = sink.schema();
    let mut settings = sink.settings();

    let mut properties = &schema;
    let mut target = &mut settings;
    for name in groups {
        let property = properties
            .get(name)
            .ok_or_else(|| BindingError::MissingProperty(name.clone()))?;
        let PropertyKind::Group(nested) = &property.kind else {
            return Err(BindingError::NotAGroup(name.clone()));
        };
        properties = nested;
        target = child_object(target, name)?;
    }

    let property = properties
        .get(leaf)
        .ok_or_else(|| BindingError::MissingProperty(leaf.clone()))?;

    match &property.kind {
        PropertyKind::Bool => {
            let value = reading(written, binding.invert);
            target.insert(leaf.clone(), Value::Bool(value));
        }
        PropertyKind::Text => {
            let text = if binding.trim {
                Cow::Borrowed(trim_spaces(written))
            } else {
                buffer.range(start, len)
            };
            let text = String::from_utf8_lossy(&text).into_owned();
            target.insert(leaf.clone(), Value::String(text));
        }
        PropertyKind::Font => {
            let value = reading(written, binding.invert);
            let font = child_object(target, leaf)?;
            let mask = u64::from(binding.flag_value);
            let flags = font
                .get(FONT_FLAGS_KEY)
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let flags = if value { flags | mask } else { flags & !mask };
            font.insert(FONT_FLAGS_KEY.to_string(), Value::from(flags));
        }
        PropertyKind::Group(_) | PropertyKind::Other => return Ok(Applied::Ignored),
    }

    sink.update(settings);
    sink.refresh_schema();
    Ok(Applied::Written)
}

/// Boolean reading of a range: any non-space byte, optionally inverted.
fn reading(range: &[u8], invert: bool) -> bool {
    range.iter().any(|&b| b != FILL) != invert
}

/// Narrow `bytes` to exclude leading and trailing spaces.
fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| b != FILL)
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| b != FILL)
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// The nested settings object `name`, created empty if absent.
fn child_object<'a>(settings: &'a mut Settings, name: &str) -> Result<&'a mut Settings, BindingError> {
    settings
        .entry(name)
        .or_insert_with(|| Value::Object(Settings::new()))
        .as_object_mut()
        .ok_or_else(|| BindingError::NotAnObject(name.to_string()))
}

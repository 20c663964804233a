//! Sink module - targets that bindings write into.
//!
//! Provides:
//! - [`PropertySchema`] / [`PropertyKind`] - the nested property schema a sink exposes
//! - [`Sink`] - a live target with a schema and a mutable settings object
//! - [`SinkRegistry`] - resolves sink IDs to live sinks
//! - [`MemorySink`] / [`MemorySinkRegistry`] - in-memory implementations
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::sink::{MemorySink, MemorySinkRegistry, PropertySchema, SinkRegistry};
//!
//! let schema = PropertySchema::new().text("text").bool("visible");
//!
//! let mut registry = MemorySinkRegistry::new();
//! registry.insert("home-score", MemorySink::new(schema));
//!
//! assert!(registry.resolve("home-score").is_some());
//! assert!(registry.resolve("away-score").is_none());
//! ```

mod memory;
mod schema;

pub use memory::{MemorySink, MemorySinkRegistry};
pub use schema::{Property, PropertyKind, PropertySchema, Settings, FONT_FLAGS_KEY};

/// A live target whose settings bindings write into.
pub trait Sink {
    /// Current property schema.
    fn schema(&self) -> PropertySchema;

    /// Snapshot of the current settings.
    fn settings(&self) -> Settings;

    /// Commit new settings.
    fn update(&mut self, settings: Settings);

    /// Ask the sink to rebuild its schema; leaf kinds may depend on settings.
    fn refresh_schema(&mut self) {}
}

/// Resolves sink IDs to live sinks.
pub trait SinkRegistry {
    /// Look up a sink; `None` when the ID is empty or no longer exists.
    fn resolve(&mut self, sink_id: &str) -> Option<&mut dyn Sink>;
}

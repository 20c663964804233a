//! In-memory sinks.
//!
//! [`MemorySink`] keeps its settings in a JSON object and counts commits and
//! schema refreshes. [`MemorySinkRegistry`] maps sink IDs to memory sinks.

use std::collections::HashMap;

use serde_json::Value;

use super::{PropertySchema, Settings, Sink, SinkRegistry};

/// Sink backed by an in-memory settings object.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    schema: PropertySchema,
    settings: Settings,
    updates: usize,
    refreshes: usize,
}

impl MemorySink {
    /// Create a sink with the given schema and empty settings.
    pub fn new(schema: PropertySchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Create a sink with initial settings.
    pub fn with_settings(schema: PropertySchema, settings: Settings) -> Self {
        Self {
            schema,
            settings,
            ..Self::default()
        }
    }

    /// Read a top-level setting.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.settings.get(name)
    }

    /// Read a setting by path through nested objects.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.settings.get(*first)?, |value, name| value.get(*name))
    }

    /// Number of committed updates.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Number of schema refresh requests.
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }
}

impl Sink for MemorySink {
    fn schema(&self) -> PropertySchema {
        self.schema.clone()
    }

    fn settings(&self) -> Settings {
        self.settings.clone()
    }

    fn update(&mut self, settings: Settings) {
        self.settings = settings;
        self.updates += 1;
    }

    fn refresh_schema(&mut self) {
        self.refreshes += 1;
    }
}

/// Registry of [`MemorySink`]s keyed by sink ID.
#[derive(Debug, Default)]
pub struct MemorySinkRegistry {
    sinks: HashMap<String, MemorySink>,
}

impl MemorySinkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a sink.
    pub fn insert(&mut self, sink_id: &str, sink: MemorySink) {
        self.sinks.insert(sink_id.to_string(), sink);
    }

    /// Remove a sink, returning it if it existed.
    pub fn remove(&mut self, sink_id: &str) -> Option<MemorySink> {
        self.sinks.remove(sink_id)
    }

    /// Get a sink by ID.
    pub fn get(&self, sink_id: &str) -> Option<&MemorySink> {
        self.sinks.get(sink_id)
    }

    /// Number of registered sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if no sinks are registered.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SinkRegistry for MemorySinkRegistry {
    fn resolve(&mut self, sink_id: &str) -> Option<&mut dyn Sink> {
        self.sinks
            .get_mut(sink_id)
            .map(|sink| sink as &mut dyn Sink)
    }
}

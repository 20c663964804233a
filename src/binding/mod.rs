//! Binding module - projections from scoreboard ranges onto sink properties.
//!
//! Provides:
//! - [`Binding`] - one persisted projection (range, target path, transforms)
//! - [`evaluate`] - the engine that pushes buffer contents into every enabled binding's sink
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::binding::{evaluate, Binding};
//! use scoreboard_receiver::sink::{MemorySink, MemorySinkRegistry, PropertySchema};
//! use scoreboard_receiver::ScoreboardBuffer;
//!
//! let mut registry = MemorySinkRegistry::new();
//! registry.insert("clock", MemorySink::new(PropertySchema::new().text("text")));
//!
//! let mut bindings = vec![Binding {
//!     enabled: true,
//!     item_number: 1,
//!     field_length: 5,
//!     sink_id: "clock".to_string(),
//!     parent_path: vec!["text".to_string()],
//!     ..Binding::default()
//! }];
//!
//! let mut buffer = ScoreboardBuffer::new();
//! buffer.apply(0, b"12:34");
//!
//! let summary = evaluate(&mut bindings, &buffer, &mut registry);
//! assert_eq!(summary.updated, 1);
//! assert_eq!(registry.get("clock").unwrap().get("text").unwrap(), "12:34");
//! ```

mod engine;
mod model;

pub use engine::{evaluate, BindingError, EvaluationSummary};
pub use model::{Binding, DEFAULT_BINDING_NAME};

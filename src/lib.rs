//! # scoreboard-receiver
//!
//! Receiver for scoreboard controller data streamed over UDP.
//!
//! A scoreboard controller transmits framed updates that write text into a
//! virtual character buffer (the scoreboard). Bindings project ranges of that
//! buffer onto properties of live sinks: text, booleans, or font style flags.
//!
//! ## Pipeline
//!
//! - **Extract**: split each datagram into `SYN ..= ETB` candidates
//! - **Decode**: validate framing and checksum, parse the offset
//! - **Apply**: write the body into the scoreboard buffer
//! - **Bind**: once per burst, push bound ranges into their sinks
//!
//! ## Example
//!
//! ```ignore
//! use scoreboard_receiver::{ReceiverBuilder, ReceiverConfig};
//! use scoreboard_receiver::sink::MemorySinkRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut receiver = ReceiverBuilder::new()
//!         .config(ReceiverConfig::load_or_default("receiver.json")?)
//!         .persist_to("receiver.json")
//!         .start()
//!         .await?;
//!
//!     let (_stop, shutdown) = tokio::sync::oneshot::channel();
//!     receiver.run(&mut MemorySinkRegistry::new(), shutdown).await?;
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod config;
pub mod counters;
pub mod error;
pub mod protocol;
pub mod scoreboard;
pub mod sink;
pub mod transport;

mod receiver;

pub use binding::{Binding, BindingError, EvaluationSummary};
pub use config::ReceiverConfig;
pub use counters::{CounterEvent, CounterId, Counters};
pub use error::ScoreboardError;
pub use receiver::{Receiver, ReceiverBuilder};
pub use scoreboard::ScoreboardBuffer;
pub use sink::{Sink, SinkRegistry};

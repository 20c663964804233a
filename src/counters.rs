//! Pipeline counters with change notification.
//!
//! Three monotonically increasing counters: datagrams processed, frames
//! accepted and frames dropped. Every increment notifies all observers with
//! `(counter, new value)`. The receiver increments only after the unit of
//! work (frame, datagram) is fully processed.
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::counters::{CounterId, Counters};
//!
//! let mut counters = Counters::new();
//! let mut events = counters.subscribe_channel();
//!
//! counters.increment(CounterId::Frames);
//!
//! let event = events.try_recv().unwrap();
//! assert_eq!(event.counter, CounterId::Frames);
//! assert_eq!(event.value, 1);
//! ```

use std::fmt;

use tokio::sync::mpsc;

/// Identifies one of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterId {
    /// Datagrams processed.
    Datagrams,
    /// Frames decoded and applied.
    Frames,
    /// Frames rejected.
    Drops,
}

impl CounterId {
    /// All counters, in storage order.
    pub const ALL: [CounterId; 3] = [CounterId::Datagrams, CounterId::Frames, CounterId::Drops];

    #[inline]
    fn index(self) -> usize {
        match self {
            CounterId::Datagrams => 0,
            CounterId::Frames => 1,
            CounterId::Drops => 2,
        }
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CounterId::Datagrams => "datagrams",
            CounterId::Frames => "frames",
            CounterId::Drops => "drops",
        };
        f.write_str(name)
    }
}

/// A counter change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterEvent {
    /// Which counter changed.
    pub counter: CounterId,
    /// Its new value.
    pub value: u64,
}

/// Boxed counter observer callback.
pub type CounterObserver = Box<dyn Fn(CounterId, u64) + Send + Sync>;

/// The three pipeline counters and their observers.
#[derive(Default)]
pub struct Counters {
    values: [u64; 3],
    observers: Vec<CounterObserver>,
}

impl Counters {
    /// Create zeroed counters with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked after every increment.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(CounterId, u64) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Register a channel that receives every change.
    ///
    /// Sending stops silently once the receiver is dropped.
    pub fn subscribe_channel(&mut self) -> mpsc::UnboundedReceiver<CounterEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribe(move |counter, value| {
            let _ = tx.send(CounterEvent { counter, value });
        });
        rx
    }

    /// Increment a counter and notify observers. Returns the new value.
    pub fn increment(&mut self, counter: CounterId) -> u64 {
        let slot = &mut self.values[counter.index()];
        *slot = slot.wrapping_add(1);
        let value = *slot;

        for observer in &self.observers {
            observer(counter, value);
        }
        value
    }

    /// Current value of a counter.
    pub fn get(&self, counter: CounterId) -> u64 {
        self.values[counter.index()]
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counters")
            .field("datagrams", &self.get(CounterId::Datagrams))
            .field("frames", &self.get(CounterId::Frames))
            .field("drops", &self.get(CounterId::Drops))
            .field("observers", &self.observers.len())
            .finish()
    }
}

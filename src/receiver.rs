//! Receiver builder and runtime loop.
//!
//! The [`ReceiverBuilder`] provides a fluent API for configuring the
//! receiver. The [`Receiver`] owns the whole pipeline:
//! 1. Bind the UDP socket (optionally connected to the upstream server)
//! 2. Drain every pending datagram, extracting and decoding frames
//! 3. Apply accepted frames to the scoreboard buffer
//! 4. Evaluate bindings once per burst
//!
//! # Example
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
//!         .on_counter(|counter, value| println!("{counter}: {value}"))
//!         .build();
//!     receiver.enable().await?;
//!
//!     let (_stop, shutdown) = tokio::sync::oneshot::channel();
//!     let mut sinks = MemorySinkRegistry::new();
//!     receiver.run(&mut sinks, shutdown).await?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::binding::{self, Binding, EvaluationSummary};
use crate::config::ReceiverConfig;
use crate::counters::{CounterId, CounterObserver, Counters};
use crate::error::{Result, ScoreboardError};
use crate::protocol::{Decoded, FrameDecoder, FrameExtractor};
use crate::scoreboard::ScoreboardBuffer;
use crate::sink::SinkRegistry;
use crate::transport::UdpSource;

/// Builder for configuring and creating a [`Receiver`].
#[derive(Default)]
pub struct ReceiverBuilder {
    config: ReceiverConfig,
    persist_to: Option<PathBuf>,
    observers: Vec<CounterObserver>,
}

impl ReceiverBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for network settings, checksum validation and bindings.
    pub fn config(mut self, config: ReceiverConfig) -> Self {
        self.config = config;
        self
    }

    /// Save the configuration to `path` whenever the receiver is enabled.
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_to = Some(path.into());
        self
    }

    /// Register a counter observer.
    pub fn on_counter<F>(mut self, observer: F) -> Self
    where
        F: Fn(CounterId, u64) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    /// Build a disabled receiver.
    pub fn build(self) -> Receiver {
        Receiver::new(self)
    }

    /// Build the receiver and enable it if the configuration says it was running.
    ///
    /// A bind failure leaves the receiver disabled and is returned.
    pub async fn start(self) -> Result<Receiver> {
        let mut receiver = self.build();
        if receiver.config.receiver_running {
            receiver.enable().await?;
        }
        Ok(receiver)
    }
}

/// Why the run loop woke up.
enum Wake {
    Shutdown,
    Readable(std::io::Result<()>),
}

/// A scoreboard receiver.
///
/// Frames only touch the scoreboard buffer; sinks are written by
/// [`update_sinks`](Self::update_sinks), once per burst in [`run`](Self::run).
pub struct Receiver {
    /// Network and checksum settings; bindings live in `bindings`.
    config: ReceiverConfig,
    /// Binding list, in evaluation order.
    bindings: Vec<Binding>,
    buffer: ScoreboardBuffer,
    counters: Counters,
    decoder: FrameDecoder,
    /// Bound socket; `None` while disabled.
    source: Option<UdpSource>,
    persist_to: Option<PathBuf>,
}

impl Receiver {
    /// Create a new receiver builder.
    pub fn builder() -> ReceiverBuilder {
        ReceiverBuilder::new()
    }

    fn new(builder: ReceiverBuilder) -> Self {
        let ReceiverBuilder {
            mut config,
            persist_to,
            observers,
        } = builder;

        let mut counters = Counters::new();
        for observer in observers {
            counters.subscribe(observer);
        }

        let bindings = std::mem::take(&mut config.bindings);
        let decoder = FrameDecoder::with_checksum_validation(config.validate_checksums);

        Self {
            config,
            bindings,
            buffer: ScoreboardBuffer::new(),
            counters,
            decoder,
            source: None,
            persist_to,
        }
    }

    /// Bind the socket and start accepting datagrams.
    ///
    /// On failure the receiver stays disabled. On success the configuration
    /// is saved when a persistence path was given.
    pub async fn enable(&mut self) -> Result<()> {
        if self.is_enabled() {
            return Ok(());
        }

        let listen = self.config.listen_socket_addr();
        let upstream = self.config.upstream_socket_addr();

        let source = match UdpSource::bind(listen, upstream).await {
            Ok(source) => source,
            Err(e) => {
                error!(error = %e, "failed to enable receiver");
                return Err(e);
            }
        };

        info!(
            addr = %source.local_addr().unwrap_or(listen),
            upstream = ?upstream,
            "receiver enabled"
        );
        self.source = Some(source);
        self.config.receiver_running = true;

        if self.persist_to.is_some() {
            if let Err(e) = self.save_config() {
                error!(error = %e, "failed to save receiver configuration");
            }
        }
        Ok(())
    }

    /// Close the socket. Buffer, bindings and counters are kept.
    pub fn disable(&mut self) {
        if self.source.take().is_some() {
            info!("receiver disabled");
        }
        self.config.receiver_running = false;
    }

    /// Enable or disable.
    pub async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            self.enable().await
        } else {
            self.disable();
            Ok(())
        }
    }

    /// Whether the socket is bound.
    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.source.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Toggle checksum validation for subsequent frames.
    pub fn set_validate_checksums(&mut self, validate: bool) {
        self.config.validate_checksums = validate;
        self.decoder = FrameDecoder::with_checksum_validation(validate);
    }

    /// Run one datagram through extraction, decoding and the apply step.
    ///
    /// Every candidate is counted as accepted or dropped once it is handled;
    /// the datagram is counted after its last candidate.
    pub fn process_datagram(&mut self, datagram: Bytes) {
        for candidate in FrameExtractor::new(datagram) {
            match self.decoder.decode(&candidate) {
                Ok(Decoded::Frame(frame)) => {
                    self.buffer.apply(frame.offset, frame.body());
                    self.counters.increment(CounterId::Frames);
                }
                Ok(Decoded::Empty) => {}
                Err(e) => {
                    warn!(error = %e, frame = ?candidate, "dropping frame");
                    self.counters.increment(CounterId::Drops);
                }
            }
        }
        self.counters.increment(CounterId::Datagrams);
    }

    /// Process every datagram already queued on the socket without waiting.
    ///
    /// Returns the number of datagrams processed.
    pub fn drain_pending(&mut self) -> usize {
        let mut processed = 0;
        loop {
            let Some(source) = self.source.as_mut() else {
                break;
            };
            match source.try_recv() {
                Ok(Some(datagram)) => {
                    self.process_datagram(datagram);
                    processed += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "failed to receive datagram");
                    break;
                }
            }
        }
        processed
    }

    /// Evaluate every enabled binding against the current buffer.
    pub fn update_sinks<R>(&mut self, registry: &mut R) -> EvaluationSummary
    where
        R: SinkRegistry + ?Sized,
    {
        binding::evaluate(&mut self.bindings, &self.buffer, registry)
    }

    /// Process a burst of datagrams, then evaluate bindings once.
    pub fn process_burst<I, R>(&mut self, datagrams: I, registry: &mut R) -> EvaluationSummary
    where
        I: IntoIterator<Item = Bytes>,
        R: SinkRegistry + ?Sized,
    {
        for datagram in datagrams {
            self.process_datagram(datagram);
        }
        self.update_sinks(registry)
    }

    /// Receive and process datagrams until `shutdown` fires.
    ///
    /// Each wakeup drains every pending datagram before evaluating bindings
    /// once. Receive errors are logged and the loop continues. The receiver
    /// is disabled on shutdown.
    pub async fn run<R>(
        &mut self,
        registry: &mut R,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<()>
    where
        R: SinkRegistry + ?Sized,
    {
        if !self.is_enabled() {
            return Err(ScoreboardError::ReceiverDisabled);
        }

        loop {
            let wake = {
                let Some(source) = self.source.as_ref() else {
                    return Ok(());
                };
                tokio::select! {
                    // A dropped sender also stops the loop.
                    _ = &mut shutdown => Wake::Shutdown,
                    ready = source.readable() => Wake::Readable(ready),
                }
            };

            match wake {
                Wake::Shutdown => {
                    self.disable();
                    return Ok(());
                }
                Wake::Readable(Err(e)) => {
                    error!(error = %e, "socket error");
                }
                Wake::Readable(Ok(())) => {
                    if self.drain_pending() > 0 {
                        self.update_sinks(registry);
                    }
                }
            }
        }
    }

    /// The scoreboard buffer.
    pub fn buffer(&self) -> &ScoreboardBuffer {
        &self.buffer
    }

    /// The binding list.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Mutable access to the binding list.
    pub fn bindings_mut(&mut self) -> &mut Vec<Binding> {
        &mut self.bindings
    }

    /// The pipeline counters.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Mutable access to the counters, e.g. to subscribe late.
    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    /// Snapshot of the current configuration, bindings included.
    pub fn to_config(&self) -> ReceiverConfig {
        ReceiverConfig {
            receiver_running: self.is_enabled(),
            bindings: self.bindings.clone(),
            ..self.config.clone()
        }
    }

    /// Write the current configuration to the persistence path.
    ///
    /// Does nothing when no path was given.
    pub fn save_config(&self) -> Result<()> {
        match &self.persist_to {
            Some(path) => self.to_config().save(path),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("enabled", &self.is_enabled())
            .field("buffer_len", &self.buffer.len())
            .field("bindings", &self.bindings.len())
            .field("counters", &self.counters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::build_frame;
    use crate::sink::{MemorySink, MemorySinkRegistry, PropertySchema};
    use std::sync::{Arc, Mutex};
    use tokio::net::UdpSocket;

    fn loopback_config() -> ReceiverConfig {
        ReceiverConfig {
            listen_addr: "127.0.0.1".parse().unwrap(),
            listen_port: 0,
            ..ReceiverConfig::default()
        }
    }

    fn text_binding(sink_id: &str, item_number: u32, field_length: u32) -> Binding {
        Binding {
            enabled: true,
            sink_id: sink_id.to_string(),
            parent_path: vec!["text".to_string()],
            item_number,
            field_length,
            ..Binding::new("clock")
        }
    }

    #[test]
    fn test_process_datagram_applies_frame() {
        let mut receiver = ReceiverBuilder::new().build();
        receiver.process_datagram(Bytes::from_static(b"\x16\x01001\x02OK\x0432\x17"));

        assert_eq!(receiver.buffer().as_bytes(), b" OK");
        assert_eq!(receiver.counters().get(CounterId::Frames), 1);
        assert_eq!(receiver.counters().get(CounterId::Drops), 0);
        assert_eq!(receiver.counters().get(CounterId::Datagrams), 1);
    }

    #[test]
    fn test_process_datagram_counts_drops() {
        let mut receiver = ReceiverBuilder::new().build();
        let mut bad = build_frame(0, b"AB");
        let n = bad.len();
        bad[n - 2] = b'0';
        bad[n - 3] = b'0';

        let mut datagram = bad;
        datagram.extend_from_slice(&build_frame(4, b"CD"));
        receiver.process_datagram(Bytes::from(datagram));

        assert_eq!(receiver.buffer().as_bytes(), b"    CD");
        assert_eq!(receiver.counters().get(CounterId::Drops), 1);
        assert_eq!(receiver.counters().get(CounterId::Frames), 1);
        assert_eq!(receiver.counters().get(CounterId::Datagrams), 1);
    }

    #[test]
    fn test_empty_frame_counts_nothing() {
        let mut receiver = ReceiverBuilder::new().build();
        receiver.process_datagram(Bytes::from_static(b"\x16\x01001\x04\x17"));

        assert!(receiver.buffer().is_empty());
        assert_eq!(receiver.counters().get(CounterId::Frames), 0);
        assert_eq!(receiver.counters().get(CounterId::Drops), 0);
        assert_eq!(receiver.counters().get(CounterId::Datagrams), 1);
    }

    #[test]
    fn test_checksum_bypass() {
        let mut receiver = ReceiverBuilder::new().build();
        receiver.set_validate_checksums(false);
        receiver.process_datagram(Bytes::from_static(b"\x16\x01001\x02OK\x0400\x17"));

        assert_eq!(receiver.buffer().as_bytes(), b" OK");
        assert!(!receiver.to_config().validate_checksums);
    }

    #[test]
    fn test_counter_order_within_datagram() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut receiver = ReceiverBuilder::new()
            .on_counter(move |counter, value| log.lock().unwrap().push((counter, value)))
            .build();

        let mut datagram = build_frame(0, b"A");
        datagram.extend_from_slice(b"\x16\x01\x17");
        receiver.process_datagram(Bytes::from(datagram));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (CounterId::Frames, 1),
                (CounterId::Drops, 1),
                (CounterId::Datagrams, 1),
            ]
        );
    }

    #[test]
    fn test_process_burst_evaluates_once() {
        let config = ReceiverConfig {
            bindings: vec![text_binding("clock", 1, 4)],
            ..ReceiverConfig::default()
        };
        let mut receiver = ReceiverBuilder::new().config(config).build();

        let mut registry = MemorySinkRegistry::new();
        registry.insert("clock", MemorySink::new(PropertySchema::new().text("text")));

        let burst = vec![
            Bytes::from(build_frame(0, b"12:00")),
            Bytes::from(build_frame(0, b"11:59")),
        ];
        let summary = receiver.process_burst(burst, &mut registry);

        assert_eq!(summary.updated, 1);
        let sink = registry.get("clock").unwrap();
        assert_eq!(sink.update_count(), 1);
        assert_eq!(sink.get("text").unwrap(), "11:5");
    }

    #[test]
    fn test_update_sinks_resets_missing_sink() {
        let config = ReceiverConfig {
            bindings: vec![text_binding("gone", 1, 2)],
            ..ReceiverConfig::default()
        };
        let mut receiver = ReceiverBuilder::new().config(config).build();
        let mut registry = MemorySinkRegistry::new();

        let summary = receiver.update_sinks(&mut registry);
        assert_eq!(summary.reset, 1);
        assert!(receiver.bindings()[0].sink_id.is_empty());
        assert_eq!(receiver.bindings()[0].name, "clock");
    }

    #[test]
    fn test_to_config_includes_bindings() {
        let config = ReceiverConfig {
            listen_port: 22000,
            bindings: vec![text_binding("clock", 3, 5)],
            ..ReceiverConfig::default()
        };
        let receiver = ReceiverBuilder::new().config(config.clone()).build();

        let snapshot = receiver.to_config();
        assert_eq!(snapshot, config);
        assert!(!snapshot.receiver_running);
    }

    #[tokio::test]
    async fn test_enable_disable() {
        let mut receiver = ReceiverBuilder::new().config(loopback_config()).build();
        assert!(!receiver.is_enabled());

        receiver.enable().await.unwrap();
        assert!(receiver.is_enabled());
        assert!(receiver.local_addr().is_some());
        assert!(receiver.to_config().receiver_running);

        receiver.set_enabled(false).await.unwrap();
        assert!(!receiver.is_enabled());
        assert!(!receiver.to_config().receiver_running);
    }

    #[tokio::test]
    async fn test_enable_bind_failure_stays_disabled() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = ReceiverConfig {
            listen_port: taken.local_addr().unwrap().port(),
            ..loopback_config()
        };
        let mut receiver = ReceiverBuilder::new().config(config).build();

        let err = receiver.enable().await.unwrap_err();
        assert!(matches!(err, ScoreboardError::Bind { .. }));
        assert!(!receiver.is_enabled());
    }

    #[tokio::test]
    async fn test_enable_persists_config() {
        let path = std::env::temp_dir().join(format!(
            "scoreboard-receiver-enable-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut receiver = ReceiverBuilder::new()
            .config(loopback_config())
            .persist_to(&path)
            .build();
        receiver.enable().await.unwrap();

        let saved = ReceiverConfig::load(&path).unwrap();
        assert!(saved.receiver_running);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_start_honors_receiver_running() {
        let config = ReceiverConfig {
            receiver_running: true,
            ..loopback_config()
        };
        let receiver = ReceiverBuilder::new().config(config).start().await.unwrap();
        assert!(receiver.is_enabled());

        let receiver = ReceiverBuilder::new()
            .config(loopback_config())
            .start()
            .await
            .unwrap();
        assert!(!receiver.is_enabled());
    }

    #[tokio::test]
    async fn test_run_requires_enabled() {
        let mut receiver = ReceiverBuilder::new().build();
        let mut registry = MemorySinkRegistry::new();
        let (_tx, rx) = oneshot::channel();

        let err = receiver.run(&mut registry, rx).await.unwrap_err();
        assert!(matches!(err, ScoreboardError::ReceiverDisabled));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut receiver = ReceiverBuilder::new().config(loopback_config()).build();
        receiver.enable().await.unwrap();
        let mut registry = MemorySinkRegistry::new();

        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        receiver.run(&mut registry, rx).await.unwrap();

        assert!(!receiver.is_enabled());
    }
}

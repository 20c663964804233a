//! Receiver configuration and binding persistence.
//!
//! The configuration is a single JSON document holding the network
//! settings, the checksum toggle, the enable state and the binding list.
//! Missing fields fall back to defaults, so older or partial files load.
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::config::ReceiverConfig;
//!
//! let config = ReceiverConfig::from_json(r#"{ "listen_port": 22000 }"#).unwrap();
//! assert_eq!(config.listen_port, 22000);
//! assert!(config.validate_checksums);
//! assert!(config.bindings.is_empty());
//! ```

use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binding::Binding;
use crate::error::Result;

/// Default UDP port the receiver listens on.
pub const DEFAULT_LISTEN_PORT: u16 = 21000;

/// Default port of the upstream data server.
pub const DEFAULT_UPSTREAM_PORT: u16 = 20999;

/// Persisted receiver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Whether the receiver should be enabled at startup.
    pub receiver_running: bool,
    /// Local address to bind.
    pub listen_addr: IpAddr,
    /// Local UDP port to bind.
    pub listen_port: u16,
    /// Upstream data server; when set, only its datagrams are accepted.
    #[serde(alias = "uds_addr")]
    pub upstream_addr: Option<IpAddr>,
    /// Upstream data server port.
    #[serde(alias = "uds_port")]
    pub upstream_port: u16,
    /// Reject frames with a wrong checksum.
    pub validate_checksums: bool,
    /// Binding list, in evaluation order.
    pub bindings: Vec<Binding>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            receiver_running: false,
            listen_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: DEFAULT_LISTEN_PORT,
            upstream_addr: None,
            upstream_port: DEFAULT_UPSTREAM_PORT,
            validate_checksums: true,
            bindings: Vec::new(),
        }
    }
}

impl ReceiverConfig {
    /// Socket address to bind.
    pub fn listen_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.listen_port)
    }

    /// Upstream socket address, if one is configured.
    pub fn upstream_socket_addr(&self) -> Option<SocketAddr> {
        self.upstream_addr
            .map(|addr| SocketAddr::new(addr, self.upstream_port))
    }

    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a pretty-printed document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from a file, falling back to defaults when it does not exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "no receiver configuration found, falling back to defaults"
                );
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a file, replacing it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "scoreboard-receiver-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    fn sample() -> ReceiverConfig {
        ReceiverConfig {
            receiver_running: true,
            listen_addr: "127.0.0.1".parse().unwrap(),
            listen_port: 21001,
            upstream_addr: Some("10.0.0.5".parse().unwrap()),
            upstream_port: 20998,
            validate_checksums: false,
            bindings: vec![
                Binding {
                    enabled: true,
                    name: "Clock".to_string(),
                    item_number: 1,
                    field_length: 5,
                    sink_id: "clock-text".to_string(),
                    parent_path: vec!["text".to_string()],
                    trim: true,
                    ..Binding::default()
                },
                Binding {
                    enabled: true,
                    name: "Bonus".to_string(),
                    item_number: 220,
                    field_length: 1,
                    sink_id: "bonus".to_string(),
                    parent_path: vec!["style".to_string(), "font".to_string()],
                    invert: true,
                    flag_value: 1,
                    ..Binding::default()
                },
            ],
        }
    }

    #[test]
    fn test_defaults() {
        let config = ReceiverConfig::default();

        assert!(!config.receiver_running);
        assert_eq!(config.listen_socket_addr().to_string(), "0.0.0.0:21000");
        assert_eq!(config.upstream_socket_addr(), None);
        assert_eq!(config.upstream_port, DEFAULT_UPSTREAM_PORT);
        assert!(config.validate_checksums);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = sample();
        let parsed = ReceiverConfig::from_json(&config.to_json().unwrap()).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_upstream_socket_addr() {
        assert_eq!(
            sample().upstream_socket_addr().unwrap().to_string(),
            "10.0.0.5:20998"
        );
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = ReceiverConfig::from_json(r#"{ "uds_addr": "192.168.1.2" }"#).unwrap();

        assert_eq!(config.upstream_addr, Some("192.168.1.2".parse().unwrap()));
        assert_eq!(config.listen_port, DEFAULT_LISTEN_PORT);
        assert!(config.validate_checksums);
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(ReceiverConfig::from_json("{ not json").is_err());
        assert!(ReceiverConfig::from_json(r#"{ "listen_port": "x" }"#).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save-load");
        let config = sample();

        config.save(&path).unwrap();
        let loaded = ReceiverConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            ReceiverConfig::load_or_default(&path).unwrap(),
            ReceiverConfig::default()
        );
        assert!(ReceiverConfig::load(&path).is_err());
    }
}

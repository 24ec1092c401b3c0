//! Listener configuration.
//!
//! Sources, lowest precedence first: [`ListenerConfig::default`], an
//! optional YAML file ([`ListenerConfig::load`]), then `PADDOCK_*`
//! environment variables ([`ListenerConfig::apply_env`]). Command-line flags
//! are layered on top by the caller.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use paddock_tracker::TrackerConfig;
use paddock_wire::{HEADER_SIZE, MAX_DATAGRAM_BYTES};
use serde::{Deserialize, Serialize};

use crate::error::ListenerError;

/// Default F1 22 UDP telemetry port.
pub const DEFAULT_PORT: u16 = 20777;

/// Env var to override the UDP bind port.
pub const ENV_PORT: &str = "PADDOCK_UDP_PORT";
/// Env var to override the bind IP address.
pub const ENV_BIND_ADDR: &str = "PADDOCK_BIND_ADDR";
/// Env var to override the receive timeout in milliseconds.
pub const ENV_RECV_TIMEOUT_MS: &str = "PADDOCK_RECV_TIMEOUT_MS";

pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on one blocking receive, so shutdown is seen promptly.
    pub recv_timeout_ms: u64,
    /// Receive buffer size. Longer datagrams are truncated by the socket.
    pub max_datagram_bytes: usize,
    /// Capacity of each outgoing channel (laps, events, subscriptions).
    pub channel_capacity: usize,
    pub tracker: TrackerConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            recv_timeout_ms: DEFAULT_RECV_TIMEOUT_MS,
            max_datagram_bytes: MAX_DATAGRAM_BYTES,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            tracker: TrackerConfig::default(),
        }
    }
}

impl ListenerConfig {
    /// Defaults with the `PADDOCK_*` environment applied.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Read a YAML config file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ListenerError::ConfigRead`] if the file cannot be read,
    /// [`ListenerError::ConfigParse`] if it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ListenerError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ListenerError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        serde_yaml::from_str(&content).map_err(|source| ListenerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Override fields from `lookup`. Unset, unparsable and zero values are
    /// ignored.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ip) = lookup(ENV_BIND_ADDR).and_then(|v| v.trim().parse::<IpAddr>().ok()) {
            self.bind_addr.set_ip(ip);
        }
        self.bind_addr
            .set_port(env_u16(&lookup, ENV_PORT, self.bind_addr.port()));
        self.recv_timeout_ms = env_u64(&lookup, ENV_RECV_TIMEOUT_MS, self.recv_timeout_ms);
        self
    }

    /// Override the UDP bind port (useful in tests).
    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    /// # Errors
    ///
    /// [`ListenerError::InvalidConfig`] for zero timeouts or capacities and
    /// buffers too small for a header; tracker errors are passed through.
    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.recv_timeout_ms == 0 {
            return Err(ListenerError::InvalidConfig {
                field: "recv_timeout_ms",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_datagram_bytes < HEADER_SIZE {
            return Err(ListenerError::InvalidConfig {
                field: "max_datagram_bytes",
                message: format!("must hold a {HEADER_SIZE}-byte header"),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ListenerError::InvalidConfig {
                field: "channel_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        self.tracker.validate()?;
        Ok(())
    }
}

fn env_u16(lookup: &impl Fn(&str) -> Option<String>, name: &str, fallback: u16) -> u16 {
    lookup(name)
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

fn env_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str, fallback: u64) -> u64 {
    lookup(name)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() -> TestResult {
        let config = ListenerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:20777".parse::<SocketAddr>()?);
        assert_eq!(config.recv_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_datagram_bytes, 2048);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn env_overrides_port_ip_and_timeout() -> TestResult {
        let config = ListenerConfig::default().apply_env_with(lookup(&[
            (ENV_PORT, "20888"),
            (ENV_BIND_ADDR, "127.0.0.1"),
            (ENV_RECV_TIMEOUT_MS, "250"),
        ]));
        assert_eq!(config.bind_addr, "127.0.0.1:20888".parse::<SocketAddr>()?);
        assert_eq!(config.recv_timeout_ms, 250);
        Ok(())
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let config = ListenerConfig::default().apply_env_with(lookup(&[
            (ENV_PORT, "0"),
            (ENV_BIND_ADDR, "not-an-ip"),
            (ENV_RECV_TIMEOUT_MS, "soon"),
        ]));
        assert_eq!(config, ListenerConfig::default());
    }

    #[test]
    fn validate_rejects_zero_capacity_and_tiny_buffer() {
        let config = ListenerConfig {
            channel_capacity: 0,
            ..ListenerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ListenerError::InvalidConfig {
                field: "channel_capacity",
                ..
            })
        ));

        let config = ListenerConfig {
            max_datagram_bytes: 10,
            ..ListenerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_checks_tracker_settings() {
        let mut config = ListenerConfig::default();
        config.tracker.packet_format = 2021;
        assert!(matches!(config.validate(), Err(ListenerError::Tracker(_))));
    }
}

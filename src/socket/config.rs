//! Session configuration.
//!
//! Capacities and timeouts are fixed when a `Session` is built. Timeouts are
//! milliseconds; negative inputs clamp to 0, and 0 means "do not wait".
//!
//! # Example
//!
//! ```rust,ignore
//! use ssocket::socket::config::SessionConfig;
//!
//! let config = SessionConfig::builder()
//!     .buffer_size(64)
//!     .connect_timeout_ms(1000)
//!     .recv_timeout_ms(500)
//!     .send_timeout_ms(500)
//!     .build();
//!
//! let config = SessionConfig::from_json(r#"{"recv_timeout_ms": 250}"#)?;
//! ```

use crate::socket::options::TcpOptions;
use serde::{Deserialize, Deserializer, Serialize};

/// Capacity used when a buffer size of 0 is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// Clamp signed milliseconds into the `[0, u32::MAX]` range.
pub fn clamp_timeout(ms: i64) -> u32 {
    u32::try_from(ms.max(0)).unwrap_or(u32::MAX)
}

fn clamped_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    i64::deserialize(deserializer).map(clamp_timeout)
}

/// Non-positive sizes read as 0, which selects the default capacity.
fn clamped_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    i64::deserialize(deserializer).map(|n| usize::try_from(n.max(0)).unwrap_or(usize::MAX))
}

/// The three per-operation timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeouts {
    pub connect_ms: u32,
    pub recv_ms: u32,
    pub send_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Receive buffer capacity in bytes (0 selects the default).
    #[serde(deserialize_with = "clamped_size")]
    pub recv_buffer_size: usize,

    /// Send buffer capacity in bytes (0 selects the default).
    #[serde(deserialize_with = "clamped_size")]
    pub send_buffer_size: usize,

    #[serde(deserialize_with = "clamped_ms")]
    pub connect_timeout_ms: u32,

    #[serde(deserialize_with = "clamped_ms")]
    pub recv_timeout_ms: u32,

    #[serde(deserialize_with = "clamped_ms")]
    pub send_timeout_ms: u32,

    /// Socket tuning applied after connect.
    pub tcp: TcpOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: DEFAULT_BUFFER_SIZE,
            send_buffer_size: DEFAULT_BUFFER_SIZE,
            connect_timeout_ms: 2000,
            recv_timeout_ms: 1000,
            send_timeout_ms: 1000,
            tcp: TcpOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Both buffers get `buffer_size` bytes; timeouts are clamped.
    pub fn new(buffer_size: usize, connect_ms: i64, recv_ms: i64, send_ms: i64) -> Self {
        Self {
            recv_buffer_size: buffer_size,
            send_buffer_size: buffer_size,
            connect_timeout_ms: clamp_timeout(connect_ms),
            recv_timeout_ms: clamp_timeout(recv_ms),
            send_timeout_ms: clamp_timeout(send_ms),
            tcp: TcpOptions::default(),
        }
    }

    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn recv_capacity(&self) -> usize {
        effective_size(self.recv_buffer_size)
    }

    pub fn send_capacity(&self) -> usize {
        effective_size(self.send_buffer_size)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect_ms: self.connect_timeout_ms,
            recv_ms: self.recv_timeout_ms,
            send_ms: self.send_timeout_ms,
        }
    }
}

fn effective_size(size: usize) -> usize {
    if size == 0 {
        DEFAULT_BUFFER_SIZE
    } else {
        size
    }
}

/// Builder for `SessionConfig`.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both buffer capacities.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self.config.send_buffer_size = size;
        self
    }

    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.config.send_buffer_size = size;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: i64) -> Self {
        self.config.connect_timeout_ms = clamp_timeout(ms);
        self
    }

    pub fn recv_timeout_ms(mut self, ms: i64) -> Self {
        self.config.recv_timeout_ms = clamp_timeout(ms);
        self
    }

    pub fn send_timeout_ms(mut self, ms: i64) -> Self {
        self.config.send_timeout_ms = clamp_timeout(ms);
        self
    }

    pub fn tcp_options(mut self, opts: TcpOptions) -> Self {
        self.config.tcp = opts;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

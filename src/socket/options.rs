use serde::{Deserialize, Serialize};
use socket2::{Socket, TcpKeepalive};
use std::time::Duration;

/// Keepalive probe policy applied once a connection is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepalivePolicy {
    /// Idle time before the first probe, in seconds.
    pub idle_secs: u64,

    /// Interval between probes, in seconds.
    pub interval_secs: u64,

    /// Unanswered probes before the connection is dropped.
    pub retries: u32,
}

impl Default for KeepalivePolicy {
    fn default() -> Self {
        Self {
            idle_secs: 45,
            interval_secs: 30,
            retries: 1,
        }
    }
}

impl KeepalivePolicy {
    fn to_socket2(self) -> TcpKeepalive {
        let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(self.idle_secs));

        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "freebsd",
            target_vendor = "apple"
        ))]
        let keepalive = keepalive
            .with_interval(Duration::from_secs(self.interval_secs))
            .with_retries(self.retries);

        keepalive
    }
}

/// Builder for `TcpOptions`.
#[must_use]
#[derive(Debug, Clone)]
pub struct TcpOptionsBuilder {
    config: TcpOptions,
}

/// TCP tuning applied after the handshake completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpOptions {
    /// Disable Nagle's algorithm.
    pub nodelay: bool,

    /// Keepalive policy; `None` leaves keepalive off.
    pub keepalive: Option<KeepalivePolicy>,

    /// Put the descriptor back into blocking mode after connect.
    /// Session I/O never blocks either way, since every read and write is
    /// issued with `MSG_DONTWAIT` after a readiness wait.
    pub restore_blocking: bool,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            nodelay: true,
            keepalive: Some(KeepalivePolicy::default()),
            restore_blocking: true,
        }
    }
}

impl TcpOptionsBuilder {
    pub fn new() -> Self {
        Self {
            config: TcpOptions::default(),
        }
    }

    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.config.nodelay = enabled;
        self
    }

    pub fn keepalive(mut self, policy: KeepalivePolicy) -> Self {
        self.config.keepalive = Some(policy);
        self
    }

    pub fn no_keepalive(mut self) -> Self {
        self.config.keepalive = None;
        self
    }

    pub fn restore_blocking(mut self, enabled: bool) -> Self {
        self.config.restore_blocking = enabled;
        self
    }

    pub fn build(self) -> TcpOptions {
        self.config
    }
}

impl Default for TcpOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpOptions {
    pub fn builder() -> TcpOptionsBuilder {
        TcpOptionsBuilder::new()
    }

    /// Apply this configuration to a freshly connected socket.
    ///
    /// A failing option is logged and skipped; the connection stays usable.
    pub fn apply_to_socket(&self, socket: &Socket, send_timeout_ms: u32) {
        if self.restore_blocking {
            if let Err(e) = socket.set_nonblocking(false) {
                tracing::warn!(error = %e, "failed to restore blocking mode");
            }
        }

        if self.nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(error = %e, "failed to set TCP_NODELAY");
            }
        }

        if let Some(policy) = self.keepalive {
            if let Err(e) = socket.set_tcp_keepalive(&policy.to_socket2()) {
                tracing::warn!(error = %e, ?policy, "failed to set keepalive");
            }
        }

        // SO_SNDTIMEO of zero means "forever" to the kernel, so leave it unset.
        if send_timeout_ms > 0 {
            let timeout = Duration::from_millis(u64::from(send_timeout_ms));
            if let Err(e) = socket.set_write_timeout(Some(timeout)) {
                tracing::warn!(error = %e, "failed to set SO_SNDTIMEO");
            }
        }

        #[cfg(target_vendor = "apple")]
        if let Err(e) = socket.set_nosigpipe(true) {
            tracing::warn!(error = %e, "failed to set SO_NOSIGPIPE");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_connect_policy() {
        let opts = TcpOptions::default();
        assert!(opts.nodelay);
        assert!(opts.restore_blocking);
        assert_eq!(
            opts.keepalive,
            Some(KeepalivePolicy {
                idle_secs: 45,
                interval_secs: 30,
                retries: 1,
            })
        );
    }

    #[test]
    fn test_builder() {
        let opts = TcpOptions::builder()
            .nodelay(false)
            .no_keepalive()
            .restore_blocking(false)
            .build();
        assert!(!opts.nodelay);
        assert!(opts.keepalive.is_none());
        assert!(!opts.restore_blocking);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: TcpOptions = serde_json::from_str(r#"{"keepalive":{"idle_secs":10}}"#).unwrap();
        assert!(opts.nodelay);
        let policy = opts.keepalive.unwrap();
        assert_eq!(policy.idle_secs, 10);
        assert_eq!(policy.interval_secs, 30);
    }
}

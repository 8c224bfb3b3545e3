use serde::Serialize;

/// The connection state of a `Session`.
/// This roughly matches the connect steps of net/socket/tcp_client_socket.h
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectState {
    /// No descriptor is held.
    #[default]
    Disconnected,

    /// A non-blocking connect is in flight.
    Connecting,

    /// The TCP handshake completed and the socket is tuned.
    Connected,

    /// The last connect attempt failed. No descriptor is held; a new
    /// connect may be issued.
    Failed,
}

impl ConnectState {
    /// Returns true if a descriptor is held in this state.
    pub fn holds_socket(&self) -> bool {
        matches!(self, ConnectState::Connecting | ConnectState::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectState::Disconnected => "disconnected",
            ConnectState::Connecting => "connecting",
            ConnectState::Connected => "connected",
            ConnectState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ConnectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_live_states_hold_a_socket() {
        assert!(ConnectState::Connected.holds_socket());
        assert!(ConnectState::Connecting.holds_socket());
        assert!(!ConnectState::Disconnected.holds_socket());
        assert!(!ConnectState::Failed.holds_socket());
    }

    #[test]
    fn test_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ConnectState::Failed).unwrap(),
            "\"failed\""
        );
        assert_eq!(ConnectState::default().to_string(), "disconnected");
    }
}

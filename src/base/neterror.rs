use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed by peer")]
    ConnectionClosed,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Socket not connected")]
    SocketNotConnected,
    #[error("Socket is already connected")]
    SocketIsConnected,

    // Addressing Errors
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Address invalid")]
    AddressInvalid,
    #[error("No address set")]
    AddressNotSet,
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,

    // I/O Errors
    #[error("Write timed out")]
    WriteTimedOut,
    #[error("Write failed")]
    WriteFailed,
    #[error("Read failed")]
    ReadFailed,
    #[error("Buffer full")]
    BufferFull,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::SocketNotConnected => -15,
            NetError::SocketIsConnected => -23,
            NetError::ConnectionClosed => -100,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::AddressInvalid => -108,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::UnknownUrlScheme => -302,

            // Session errors (custom codes starting at -910)
            NetError::WriteTimedOut => -910,
            NetError::WriteFailed => -911,
            NetError::ReadFailed => -912,
            NetError::BufferFull => -913,
            NetError::AddressNotSet => -914,
            NetError::Unknown(code) => *code,
        }
    }

    /// Whether the session is torn down when this error is returned from I/O.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NetError::ConnectionClosed | NetError::ReadFailed | NetError::WriteFailed
        )
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -15 => NetError::SocketNotConnected,
            -23 => NetError::SocketIsConnected,
            -100 => NetError::ConnectionClosed,
            -102 => NetError::ConnectionRefused,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -108 => NetError::AddressInvalid,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -302 => NetError::UnknownUrlScheme,

            -910 => NetError::WriteTimedOut,
            -911 => NetError::WriteFailed,
            -912 => NetError::ReadFailed,
            -913 => NetError::BufferFull,
            -914 => NetError::AddressNotSet,
            _ => NetError::Unknown(code),
        }
    }
}

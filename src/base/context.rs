//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into `NetError` codes. The OS error itself is
//! reported through `tracing` at the point of conversion, since `NetError`
//! only carries the code.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use ssocket::base::context::IoResultExt;
    ///
    /// socket.connect(&addr.into()).connect_context("127.0.0.1", 8848)?;
    /// // Err(NetError::ConnectionRefused) if nothing listens there
    /// ```
    fn connect_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;

    /// Add write-path context to an IO error.
    fn write_context(self) -> Result<T, NetError>;

    /// Add read-path context to an IO error.
    fn read_context(self) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connect_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(host = %host, port, error = %e, "connect failed");
            connect_error(&e)
        })
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(domain = %domain, error = %e, "DNS resolution failed");
            NetError::NameNotResolved
        })
    }

    fn write_context(self) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::warn!(error = %e, "socket write failed");
            NetError::WriteFailed
        })
    }

    fn read_context(self) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::warn!(error = %e, "socket read failed");
            NetError::ReadFailed
        })
    }
}

/// Classify an error reported by `connect(2)` or by `SO_ERROR` afterwards.
pub fn connect_error(e: &io::Error) -> NetError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
        io::ErrorKind::TimedOut => NetError::ConnectionTimedOut,
        _ => NetError::ConnectionFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_connect_context() {
        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::ConnectionRefused, "refused"));
        let err = result.connect_context("example.com", 443).unwrap_err();
        assert_eq!(err, NetError::ConnectionRefused);

        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::TimedOut, "slow"));
        let err = result.connect_context("example.com", 443).unwrap_err();
        assert_eq!(err, NetError::ConnectionTimedOut);

        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::PermissionDenied, "nope"));
        let err = result.connect_context("example.com", 443).unwrap_err();
        assert_eq!(err, NetError::ConnectionFailed);
    }

    #[test]
    fn test_dns_context() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::NotFound, "no such host"));
        let err = result.dns_context("unknown.example.com").unwrap_err();
        assert_eq!(err, NetError::NameNotResolved);
    }

    #[test]
    fn test_io_path_context() {
        let result: Result<usize, io::Error> = Err(Error::new(ErrorKind::BrokenPipe, "pipe"));
        assert_eq!(result.write_context().unwrap_err(), NetError::WriteFailed);

        let result: Result<usize, io::Error> =
            Err(Error::new(ErrorKind::ConnectionReset, "reset"));
        assert_eq!(result.read_context().unwrap_err(), NetError::ReadFailed);

        let ok: Result<usize, io::Error> = Ok(4);
        assert_eq!(ok.read_context(), Ok(4));
    }
}

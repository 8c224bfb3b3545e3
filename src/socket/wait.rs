//! Readiness polling.
//!
//! [`wait`] is the one place the crate blocks on a descriptor. Connect,
//! the send loop, the receive loop and `Session::is_readable` all go
//! through it with their own timeout.

use std::os::fd::{AsRawFd, RawFd};
use std::time::{Duration, Instant};

/// Direction(s) a caller waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
    Both,
}

impl Interest {
    fn events(self) -> libc::c_short {
        match self {
            Interest::Readable => libc::POLLIN,
            Interest::Writable => libc::POLLOUT,
            Interest::Both => libc::POLLIN | libc::POLLOUT,
        }
    }
}

/// Outcome of a [`wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// The descriptor can make progress in the requested direction, or has a
    /// pending error/hang-up that the next operation will surface.
    Ready,
    /// The timeout elapsed first.
    Timeout,
    /// The descriptor is invalid or `poll` itself failed.
    Error,
}

impl WaitResult {
    pub fn is_ready(self) -> bool {
        self == WaitResult::Ready
    }
}

/// Block until `fd` is ready for `interest` or `timeout_ms` elapses.
///
/// A timeout of 0 checks once without blocking. Interrupted polls are
/// restarted with whatever time is left.
pub fn wait<F: AsRawFd>(fd: &F, interest: Interest, timeout_ms: u32) -> WaitResult {
    wait_raw(fd.as_raw_fd(), interest, timeout_ms)
}

pub(crate) fn wait_raw(fd: RawFd, interest: Interest, timeout_ms: u32) -> WaitResult {
    if fd < 0 {
        return WaitResult::Error;
    }

    let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
    let mut remaining = timeout_ms;

    loop {
        let mut pfd = libc::pollfd {
            fd,
            events: interest.events(),
            revents: 0,
        };
        let timeout = libc::c_int::try_from(remaining).unwrap_or(libc::c_int::MAX);

        // SAFETY: `pfd` is a single valid pollfd that outlives the call.
        let ret = unsafe { libc::poll(&mut pfd, 1, timeout) };

        if ret > 0 {
            if pfd.revents & libc::POLLNVAL != 0 {
                tracing::trace!(fd, "poll reported invalid descriptor");
                return WaitResult::Error;
            }
            return WaitResult::Ready;
        }
        if ret == 0 {
            return WaitResult::Timeout;
        }

        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            tracing::debug!(fd, error = %err, "poll failed");
            return WaitResult::Error;
        }

        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() && timeout_ms > 0 {
            return WaitResult::Timeout;
        }
        remaining = u32::try_from(left.as_millis()).unwrap_or(u32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn test_readable_times_out_without_data() {
        let (client, _server) = pair();
        let start = Instant::now();
        assert_eq!(wait(&client, Interest::Readable, 0), WaitResult::Timeout);
        assert!(start.elapsed() < Duration::from_millis(50));

        assert_eq!(wait(&client, Interest::Readable, 30), WaitResult::Timeout);
    }

    #[test]
    fn test_readable_after_peer_writes() {
        let (client, mut server) = pair();
        server.write_all(b"x").unwrap();
        assert_eq!(wait(&client, Interest::Readable, 1000), WaitResult::Ready);
    }

    #[test]
    fn test_fresh_socket_is_writable() {
        let (client, _server) = pair();
        assert_eq!(wait(&client, Interest::Writable, 0), WaitResult::Ready);
        assert_eq!(wait(&client, Interest::Both, 0), WaitResult::Ready);
    }

    #[test]
    fn test_peer_close_reports_ready() {
        let (client, server) = pair();
        drop(server);
        assert_eq!(wait(&client, Interest::Readable, 1000), WaitResult::Ready);
    }

    #[test]
    fn test_invalid_descriptor() {
        assert_eq!(wait_raw(-1, Interest::Readable, 0), WaitResult::Error);
        assert!(!WaitResult::Error.is_ready());
    }
}

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::dns::SocketAddrs;
use crate::socket::options::TcpOptions;
use crate::socket::wait::{wait, Interest, WaitResult};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::ErrorKind;
use std::net::SocketAddrV4;
use std::time::{Duration, Instant};

/// Manages the connection process: socket -> non-blocking connect -> tune.
/// Roughly equivalent to net::TransportConnectJob, minus DNS (the caller
/// hands in resolved candidates).
pub struct ConnectJob<'a> {
    timeout_ms: u32,
    send_timeout_ms: u32,
    options: &'a TcpOptions,
}

impl<'a> ConnectJob<'a> {
    pub fn new(timeout_ms: u32, send_timeout_ms: u32, options: &'a TcpOptions) -> Self {
        Self {
            timeout_ms,
            send_timeout_ms,
            options,
        }
    }

    /// Try each candidate in order and return the first connected socket.
    ///
    /// All candidates share one deadline of `timeout_ms`, so a host with
    /// several dead addresses still fails within the connect timeout. The
    /// error of the last attempt is returned when every candidate fails.
    pub fn connect_any(&self, addrs: SocketAddrs) -> Result<(Socket, SocketAddrV4), NetError> {
        let deadline = Instant::now() + Duration::from_millis(u64::from(self.timeout_ms));
        let mut last_err = NetError::NameNotResolved;
        let mut attempted = false;

        for addr in addrs {
            let left = deadline.saturating_duration_since(Instant::now());
            if attempted && left.is_zero() {
                tracing::debug!(%addr, "connect deadline reached, skipping remaining candidates");
                return Err(NetError::ConnectionTimedOut);
            }
            attempted = true;

            let budget = u32::try_from(left.as_millis()).unwrap_or(u32::MAX);
            match self.connect_within(addr, budget) {
                Ok(socket) => return Ok((socket, addr)),
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "candidate failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Connect to a single IPv4 address within the full connect timeout.
    ///
    /// On any failure the socket is dropped (closed) before returning, so no
    /// half-open descriptor escapes.
    pub fn connect(&self, addr: SocketAddrV4) -> Result<Socket, NetError> {
        self.connect_within(addr, self.timeout_ms)
    }

    fn connect_within(&self, addr: SocketAddrV4, timeout_ms: u32) -> Result<Socket, NetError> {
        let host = addr.ip().to_string();
        let port = addr.port();
        tracing::debug!(%addr, timeout_ms, "connecting");

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .connect_context(&host, port)?;
        socket.set_nonblocking(true).connect_context(&host, port)?;

        match socket.connect(&SockAddr::from(addr)) {
            Ok(()) => {}
            Err(e) if is_in_progress(&e) => finish_pending(&socket, addr, timeout_ms)?,
            Err(e) => return Err(e).connect_context(&host, port),
        }

        self.options.apply_to_socket(&socket, self.send_timeout_ms);
        Ok(socket)
    }
}

/// Wait for an in-flight connect to settle and check `SO_ERROR`.
fn finish_pending(socket: &Socket, addr: SocketAddrV4, timeout_ms: u32) -> Result<(), NetError> {
    match wait(socket, Interest::Writable, timeout_ms) {
        WaitResult::Ready => {}
        WaitResult::Timeout => {
            tracing::debug!(%addr, "connect timed out");
            return Err(NetError::ConnectionTimedOut);
        }
        WaitResult::Error => return Err(NetError::ConnectionFailed),
    }

    match socket.take_error() {
        Ok(None) => Ok(()),
        Ok(Some(pending)) => {
            tracing::debug!(%addr, error = %pending, "connect rejected");
            Err(NetError::ConnectionRefused)
        }
        Err(e) => {
            tracing::debug!(%addr, error = %e, "reading SO_ERROR failed");
            Err(NetError::ConnectionFailed)
        }
    }
}

fn is_in_progress(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(libc::EINPROGRESS)
        || matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}

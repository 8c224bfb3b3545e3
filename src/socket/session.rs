//! A single client TCP connection with its own buffers and timeouts.
//!
//! ```rust,ignore
//! use ssocket::socket::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::new(64, 1000, 500, 500));
//! session.set_address("tcp", "127.0.0.1", 7)?;
//! session.connect()?;
//! session.send(b"ping")?;
//! if session.receive()?.is_received() {
//!     assert_eq!(session.recv_bytes(), b"ping");
//! }
//! session.disconnect();
//! ```

use crate::base::connectstate::ConnectState;
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::dns::{GaiResolver, Resolve, SocketAddrs};
use crate::socket::buffer::IoBuffer;
use crate::socket::config::{clamp_timeout, SessionConfig, Timeouts};
use crate::socket::connectjob::ConnectJob;
use crate::socket::endpoint::Endpoint;
use crate::socket::options::TcpOptions;
use crate::socket::snapshot::SessionSnapshot;
use crate::socket::wait::{wait, Interest, WaitResult};
use socket2::Socket;
use std::fmt;
use std::io::ErrorKind;
use std::mem::MaybeUninit;
use std::net::{Ipv4Addr, Shutdown, SocketAddrV4};
use std::os::fd::{AsRawFd, RawFd};
use std::sync::Arc;

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL | libc::MSG_DONTWAIT;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: libc::c_int = libc::MSG_DONTWAIT;

const RECV_FLAGS: libc::c_int = libc::MSG_DONTWAIT;

/// Outcome of a receive that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvStatus {
    /// This many bytes arrived.
    Received(usize),
    /// Nothing arrived within the receive timeout; try again later.
    NotReady,
}

impl RecvStatus {
    pub fn is_received(&self) -> bool {
        matches!(self, RecvStatus::Received(_))
    }
}

/// One client connection.
///
/// The session owns its descriptor exclusively; dropping the session closes
/// it. Fatal I/O errors (`ConnectionClosed`, `ReadFailed`, `WriteFailed`)
/// disconnect the session before they are returned.
pub struct Session {
    socket: Option<Socket>,
    state: ConnectState,
    endpoint: Option<Endpoint>,
    peer: Option<SocketAddrV4>,
    recv_buf: IoBuffer,
    send_buf: IoBuffer,
    timeouts: Timeouts,
    tcp: TcpOptions,
    resolver: Arc<dyn Resolve>,
}

impl Session {
    /// Create a disconnected session that resolves hostnames with the
    /// system resolver.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_resolver(config, Arc::new(GaiResolver::new()))
    }

    pub fn with_resolver(config: SessionConfig, resolver: Arc<dyn Resolve>) -> Self {
        Self {
            socket: None,
            state: ConnectState::Disconnected,
            endpoint: None,
            peer: None,
            recv_buf: IoBuffer::with_capacity(config.recv_capacity()),
            send_buf: IoBuffer::with_capacity(config.send_capacity()),
            timeouts: config.timeouts(),
            tcp: config.tcp,
            resolver,
        }
    }

    // ---------------------------------------------------------------------
    // Addressing
    // ---------------------------------------------------------------------

    /// Bind the target. Fails with `SocketIsConnected` while connected.
    pub fn set_address(&mut self, protocol: &str, host: &str, port: u16) -> Result<(), NetError> {
        self.set_endpoint(Endpoint::new(protocol, host, port)?)
    }

    /// Bind the target from `scheme://host:port[/path]`.
    pub fn set_url(&mut self, url: &str) -> Result<(), NetError> {
        self.set_endpoint(Endpoint::parse_url(url)?)
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint) -> Result<(), NetError> {
        if self.socket.is_some() {
            return Err(NetError::SocketIsConnected);
        }
        tracing::debug!(%endpoint, "endpoint set");
        self.endpoint = Some(endpoint);
        Ok(())
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    // ---------------------------------------------------------------------
    // Connection lifecycle
    // ---------------------------------------------------------------------

    /// Connect to the bound endpoint, trying every resolved IPv4 address in
    /// turn until one accepts within the connect timeout.
    pub fn connect(&mut self) -> Result<(), NetError> {
        if self.socket.is_some() {
            return Err(NetError::SocketIsConnected);
        }
        let endpoint = self.endpoint.as_ref().ok_or(NetError::AddressNotSet)?;
        let addrs = SocketAddrs::resolve(self.resolver.as_ref(), endpoint.host(), endpoint.port())?;

        self.state = ConnectState::Connecting;
        let job = ConnectJob::new(self.timeouts.connect_ms, self.timeouts.send_ms, &self.tcp);
        match job.connect_any(addrs) {
            Ok((socket, peer)) => {
                tracing::info!(%peer, fd = socket.as_raw_fd(), "connected");
                self.socket = Some(socket);
                self.peer = Some(peer);
                self.state = ConnectState::Connected;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "connect failed");
                self.state = ConnectState::Failed;
                Err(e)
            }
        }
    }

    /// Bind `ip:port` and connect.
    pub fn connect_ip(&mut self, ip: Ipv4Addr, port: u16) -> Result<(), NetError> {
        self.set_address("tcp", &ip.to_string(), port)?;
        self.connect()
    }

    /// Bind `host:port` (literal or hostname) and connect.
    pub fn connect_host(&mut self, host: &str, port: u16) -> Result<(), NetError> {
        self.set_address("tcp", host, port)?;
        self.connect()
    }

    /// Shut down both directions and close the descriptor. A no-op when
    /// nothing is connected.
    pub fn disconnect(&mut self) {
        if let Some(socket) = self.socket.take() {
            let fd = socket.as_raw_fd();
            if let Err(e) = socket.shutdown(Shutdown::Both) {
                // ENOTCONN once the peer has already reset the connection.
                tracing::trace!(fd, error = %e, "shutdown failed");
            }
            drop(socket);
            tracing::debug!(fd, "disconnected");
        }
        self.peer = None;
        self.state = ConnectState::Disconnected;
    }

    pub fn state(&self) -> ConnectState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// The OS descriptor, or `None` when not connected.
    pub fn descriptor(&self) -> Option<RawFd> {
        self.socket.as_ref().map(AsRawFd::as_raw_fd)
    }

    /// The address actually connected to.
    pub fn peer_addr(&self) -> Option<SocketAddrV4> {
        self.peer
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    // ---------------------------------------------------------------------
    // I/O
    // ---------------------------------------------------------------------

    /// Returns true if a read would not block within `timeout_ms`
    /// (negative values are treated as 0). Always false when disconnected.
    pub fn is_readable(&self, timeout_ms: i64) -> bool {
        match &self.socket {
            Some(socket) => wait(socket, Interest::Readable, clamp_timeout(timeout_ms)).is_ready(),
            None => false,
        }
    }

    /// Stage bytes for the next `flush`, clamped to the remaining capacity.
    /// Returns how many bytes were staged.
    pub fn append_send_buffer(&mut self, bytes: &[u8]) -> usize {
        self.send_buf.append(bytes)
    }

    /// Stage formatted text for the next `flush`, truncated at capacity.
    ///
    /// ```rust,ignore
    /// session.append_fmt(format_args!("recv:{}", reply));
    /// ```
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> usize {
        let before = self.send_buf.len();
        if fmt::Write::write_fmt(&mut self.send_buf, args).is_err() {
            tracing::debug!("formatter failed; partial output kept");
        }
        self.send_buf.len() - before
    }

    /// Stage `bytes` and flush everything staged.
    ///
    /// Fails with `BufferFull` without staging anything if `bytes` does not
    /// fit in the free space of the send buffer.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        if self.socket.is_none() {
            return Err(NetError::SocketNotConnected);
        }
        if bytes.len() > self.send_buf.remaining() {
            return Err(NetError::BufferFull);
        }
        self.send_buf.append(bytes);
        self.flush()
    }

    pub fn send_str(&mut self, s: &str) -> Result<(), NetError> {
        self.send(s.as_bytes())
    }

    /// Write out the send buffer, looping over partial writes.
    ///
    /// On success the send buffer is empty. On `WriteTimedOut` the bytes
    /// already written are dropped from the buffer and the rest stays
    /// staged, so calling `flush` again resumes where it stopped.
    pub fn flush(&mut self) -> Result<(), NetError> {
        let socket = self.socket.as_ref().ok_or(NetError::SocketNotConnected)?;
        let mut sent = 0;
        let result = write_all(socket, self.send_buf.as_bytes(), self.timeouts.send_ms, &mut sent);

        match result {
            Ok(()) => {
                tracing::trace!(bytes = sent, "send buffer flushed");
                self.send_buf.clear();
                Ok(())
            }
            Err(e) => {
                self.send_buf.consume(sent);
                self.fail_io(e)
            }
        }
    }

    /// Read whatever arrives within the receive timeout and append it to
    /// the receive buffer.
    ///
    /// Content accumulates until `clear_recv_buffer`. A full buffer fails
    /// with `BufferFull` before anything is read.
    pub fn receive(&mut self) -> Result<RecvStatus, NetError> {
        let socket = self.socket.as_ref().ok_or(NetError::SocketNotConnected)?;
        if self.recv_buf.is_full() {
            return Err(NetError::BufferFull);
        }

        match read_some(socket, self.recv_buf.spare_mut(), self.timeouts.recv_ms) {
            Ok(RecvStatus::Received(n)) => {
                self.recv_buf.advance(n);
                tracing::trace!(bytes = n, total = self.recv_buf.len(), "received");
                Ok(RecvStatus::Received(n))
            }
            Ok(RecvStatus::NotReady) => Ok(RecvStatus::NotReady),
            Err(e) => self.fail_io(e),
        }
    }

    /// Like `receive`, but reads into `buf` instead of the session buffer.
    pub fn receive_into(&mut self, buf: &mut [u8]) -> Result<RecvStatus, NetError> {
        let socket = self.socket.as_ref().ok_or(NetError::SocketNotConnected)?;
        if buf.is_empty() {
            return Err(NetError::BufferFull);
        }

        match read_some(socket, buf, self.timeouts.recv_ms) {
            Ok(status) => Ok(status),
            Err(e) => self.fail_io(e),
        }
    }

    /// The bytes received so far.
    pub fn recv_bytes(&self) -> &[u8] {
        self.recv_buf.as_bytes()
    }

    pub fn recv_buffer(&self) -> &IoBuffer {
        &self.recv_buf
    }

    pub fn send_buffer(&self) -> &IoBuffer {
        &self.send_buf
    }

    pub fn clear_send_buffer(&mut self) {
        self.send_buf.clear();
    }

    pub fn clear_recv_buffer(&mut self) {
        self.recv_buf.clear();
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            descriptor: self.descriptor(),
            state: self.state,
            endpoint: self.endpoint.clone(),
            peer: self.peer,
            recv: (&self.recv_buf).into(),
            send: (&self.send_buf).into(),
            timeouts: self.timeouts,
        }
    }

    /// Log the current snapshot at info level.
    pub fn dump(&self) {
        tracing::info!("{}", self.snapshot());
    }

    fn fail_io<T>(&mut self, e: NetError) -> Result<T, NetError> {
        if e.is_fatal() {
            tracing::warn!(error = %e, peer = ?self.peer, "fatal I/O error, disconnecting");
            self.disconnect();
        }
        Err(e)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.socket.is_some() {
            tracing::debug!("session dropped while connected");
            self.disconnect();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("descriptor", &self.descriptor())
            .field("state", &self.state)
            .field("endpoint", &self.endpoint)
            .field("peer", &self.peer)
            .field("recv_buf", &self.recv_buf)
            .field("send_buf", &self.send_buf)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

/// Write `data[*sent..]`, waiting for writability before every attempt.
/// `sent` tracks progress so the caller can keep the unsent tail on error.
fn write_all(
    socket: &Socket,
    data: &[u8],
    timeout_ms: u32,
    sent: &mut usize,
) -> Result<(), NetError> {
    while *sent < data.len() {
        match wait(socket, Interest::Writable, timeout_ms) {
            WaitResult::Ready => {}
            WaitResult::Timeout => {
                tracing::debug!(sent = *sent, total = data.len(), "send timed out");
                return Err(NetError::WriteTimedOut);
            }
            WaitResult::Error => return Err(NetError::WriteFailed),
        }

        match socket.send_with_flags(&data[*sent..], SEND_FLAGS) {
            Ok(0) => {
                tracing::warn!(sent = *sent, "socket accepted zero bytes");
                return Err(NetError::WriteFailed);
            }
            Ok(n) => {
                *sent += n;
                tracing::trace!(bytes = n, remaining = data.len() - *sent, "wrote");
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                tracing::trace!("write would block");
            }
            Err(e) => return Err(e).write_context(),
        }
    }
    Ok(())
}

/// Wait for readability, then read once into `dst`.
fn read_some(socket: &Socket, dst: &mut [u8], timeout_ms: u32) -> Result<RecvStatus, NetError> {
    match wait(socket, Interest::Readable, timeout_ms) {
        WaitResult::Ready => {}
        WaitResult::Timeout => return Ok(RecvStatus::NotReady),
        WaitResult::Error => return Err(NetError::ReadFailed),
    }

    // SAFETY: `dst` is initialized memory; viewing it as `MaybeUninit<u8>`
    // is sound and `recv` only ever writes initialized bytes into it.
    let uninit = unsafe { &mut *(dst as *mut [u8] as *mut [MaybeUninit<u8>]) };

    match socket.recv_with_flags(uninit, RECV_FLAGS) {
        Ok(0) => {
            tracing::debug!("peer closed the connection");
            Err(NetError::ConnectionClosed)
        }
        Ok(n) => Ok(RecvStatus::Received(n)),
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
            Ok(RecvStatus::NotReady)
        }
        Err(e) => Err(e).read_context(),
    }
}

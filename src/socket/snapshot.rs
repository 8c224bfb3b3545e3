//! Diagnostic view of a session.

use crate::base::connectstate::ConnectState;
use crate::socket::buffer::IoBuffer;
use crate::socket::config::Timeouts;
use crate::socket::endpoint::Endpoint;
use serde::Serialize;
use std::fmt;
use std::net::SocketAddrV4;
use std::os::fd::RawFd;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferSnapshot {
    pub len: usize,
    pub capacity: usize,
    /// Valid bytes, lossily decoded as UTF-8.
    pub content: String,
}

impl From<&IoBuffer> for BufferSnapshot {
    fn from(buf: &IoBuffer) -> Self {
        Self {
            len: buf.len(),
            capacity: buf.capacity(),
            content: buf.to_string_lossy(),
        }
    }
}

/// Point-in-time copy of everything a `Session` holds.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub descriptor: Option<RawFd>,
    pub state: ConnectState,
    pub endpoint: Option<Endpoint>,
    pub peer: Option<SocketAddrV4>,
    pub recv: BufferSnapshot,
    pub send: BufferSnapshot,
    pub timeouts: Timeouts,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "session dump:")?;
        writeln!(f, "\tfd = {}", self.descriptor.unwrap_or(-1))?;
        writeln!(f, "\tstate = {}", self.state)?;
        match &self.endpoint {
            Some(ep) => {
                writeln!(f, "\tprotocol = {}", ep.protocol())?;
                writeln!(f, "\thost = {}", ep.host())?;
                writeln!(f, "\tport = {}", ep.port())?;
            }
            None => writeln!(f, "\tendpoint = (unset)")?,
        }
        if let Some(peer) = self.peer {
            writeln!(f, "\tpeer = {peer}")?;
        }
        writeln!(
            f,
            "\trecv = {}/{} {:?}",
            self.recv.len, self.recv.capacity, self.recv.content
        )?;
        writeln!(
            f,
            "\tsend = {}/{} {:?}",
            self.send.len, self.send.capacity, self.send.content
        )?;
        write!(
            f,
            "\ttimeout = {},{},{}",
            self.timeouts.connect_ms, self.timeouts.recv_ms, self.timeouts.send_ms
        )
    }
}

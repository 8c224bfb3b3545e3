//! # ssocket
//!
//! A small synchronous TCP client session for Unix platforms.
//!
//! `ssocket` wraps one IPv4 stream socket together with a fixed-size send
//! buffer, a fixed-size receive buffer and three timeouts (connect, receive,
//! send). Every blocking step is bounded by its timeout; nothing blocks
//! indefinitely.
//!
//! ## Features
//!
//! - **Addressing**: `tcp://host:port` URLs or protocol/host/port triples
//! - **Resolution**: IPv4 literals parsed directly, hostnames via `getaddrinfo`
//!   or a custom [`Resolve`](dns::Resolve) implementation
//! - **Connect**: non-blocking connect with a deadline, every resolved
//!   address tried in turn
//! - **Buffered I/O**: partial writes looped to completion, reads accumulated
//!   until cleared
//! - **Errors**: Chromium-style [`NetError`](base::neterror::NetError) codes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ssocket::socket::{RecvStatus, Session, SessionConfig};
//!
//! fn main() -> Result<(), ssocket::NetError> {
//!     let mut session = Session::new(SessionConfig::new(64, 1000, 500, 500));
//!     session.set_url("tcp://127.0.0.1:7")?;
//!     session.connect()?;
//!     session.send(b"ping")?;
//!     if let RecvStatus::Received(n) = session.receive()? {
//!         println!("{n} bytes: {:?}", session.recv_bytes());
//!     }
//!     session.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error codes and connection state
//! - [`dns`] - Host to IPv4 address resolution
//! - [`socket`] - Sessions, buffers, readiness waiting and connect

pub mod base;
pub mod dns;
pub mod socket;

pub use base::connectstate::ConnectState;
pub use base::neterror::NetError;
pub use socket::{RecvStatus, Session, SessionConfig};

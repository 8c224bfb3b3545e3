//! Socket and session management.
//!
//! Everything needed to drive one client TCP connection:
//! - [`session`]: the `Session` itself (connect, send, receive, dump)
//! - [`connectjob`]: non-blocking connect with a deadline, one address at a time
//! - [`wait`]: readiness waiting on a single descriptor
//! - [`buffer`]: fixed-capacity send/receive regions
//! - [`endpoint`]: `tcp://host:port` targets
//! - [`config`] and [`options`]: buffer sizes, timeouts and TCP tuning

pub mod buffer;
pub mod config;
pub mod connectjob;
pub mod endpoint;
pub mod options;
pub mod session;
pub mod snapshot;
pub mod wait;

pub use buffer::IoBuffer;
pub use config::{SessionConfig, SessionConfigBuilder, Timeouts, DEFAULT_BUFFER_SIZE};
pub use endpoint::{Endpoint, Protocol};
pub use options::{KeepalivePolicy, TcpOptions, TcpOptionsBuilder};
pub use session::{RecvStatus, Session};
pub use snapshot::{BufferSnapshot, SessionSnapshot};
pub use wait::{wait, Interest, WaitResult};

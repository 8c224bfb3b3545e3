//! Address Resolution Module
//!
//! Turns the host part of an endpoint into IPv4 socket addresses:
//! - Dotted-decimal literals are parsed directly, never resolved
//! - Hostnames go through a pluggable [`Resolve`] implementation
//!   (system `getaddrinfo` by default)
//! - Hostname-to-IP overrides for tests and pinning
//!
//! # Example
//!
//! ```rust,ignore
//! use ssocket::dns::{GaiResolver, SocketAddrs};
//!
//! let addrs = SocketAddrs::resolve(&GaiResolver::new(), "example.com", 80)?;
//! for addr in addrs {
//!     println!("Resolved: {}", addr);
//! }
//! ```

mod gai;
mod resolve;

pub use gai::{is_ip_literal, GaiResolver, SocketAddrs};
pub use resolve::{Addrs, Name, Resolve, ResolverWithOverrides};

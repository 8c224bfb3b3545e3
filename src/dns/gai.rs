//! System DNS resolver using getaddrinfo.
//!
//! This resolver uses the operating system's native DNS resolution via
//! `getaddrinfo`, called synchronously on the connecting thread.
//!
//! # When to Use
//!
//! - When you need to respect system DNS configuration (/etc/resolv.conf, etc.)
//! - As the default resolver of a `Session`

use super::{Addrs, Name, Resolve};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};

/// System DNS resolver using `getaddrinfo`.
///
/// This resolver wraps the standard library's `ToSocketAddrs` trait.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    /// Creates a new `GaiResolver`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: &Name) -> Result<Addrs, NetError> {
        tracing::debug!(host = %name, "resolving via getaddrinfo");
        let addrs: Vec<SocketAddr> = (name.as_str(), 0u16)
            .to_socket_addrs()
            .dns_context(name.as_str())?
            .collect();

        if addrs.is_empty() {
            tracing::debug!(domain = %name, "no addresses returned by getaddrinfo");
            return Err(NetError::NameNotResolved);
        }

        tracing::debug!(domain = %name, count = addrs.len(), "DNS resolution complete");
        Ok(Box::new(addrs.into_iter()))
    }
}

/// Returns true if `host` consists only of digits and dots.
///
/// Such hosts are parsed as IPv4 literals and never handed to a resolver,
/// even when they fail to parse.
pub fn is_ip_literal(host: &str) -> bool {
    !host.is_empty() && host.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Resolved IPv4 candidates for one endpoint, in connect order.
#[derive(Debug)]
pub struct SocketAddrs {
    addrs: std::vec::IntoIter<SocketAddrV4>,
}

impl SocketAddrs {
    /// Creates a new `SocketAddrs` from a vector.
    pub fn new(addrs: Vec<SocketAddrV4>) -> Self {
        Self {
            addrs: addrs.into_iter(),
        }
    }

    /// Attempts to parse a host string as an IPv4 literal.
    ///
    /// Returns `None` if the host is a hostname that requires DNS resolution,
    /// and `Some(Err(AddressInvalid))` for a digits-and-dots string that is
    /// not a valid dotted-quad.
    pub fn try_parse(host: &str, port: u16) -> Option<Result<Self, NetError>> {
        if !is_ip_literal(host) {
            return None;
        }
        Some(match host.parse::<Ipv4Addr>() {
            Ok(ip) => Ok(Self::new(vec![SocketAddrV4::new(ip, port)])),
            Err(_) => {
                tracing::debug!(host = %host, "invalid IPv4 literal");
                Err(NetError::AddressInvalid)
            }
        })
    }

    /// Turns `host` into IPv4 candidates, consulting `resolver` only for
    /// hostnames. Non-IPv4 answers are discarded.
    pub fn resolve(resolver: &dyn Resolve, host: &str, port: u16) -> Result<Self, NetError> {
        if let Some(parsed) = Self::try_parse(host, port) {
            return parsed;
        }

        let addrs: Vec<SocketAddrV4> = resolver
            .resolve(&Name::new(host))
            .map_err(|_| NetError::NameNotResolved)?
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(SocketAddrV4::new(*v4.ip(), port)),
                SocketAddr::V6(_) => None,
            })
            .collect();

        if addrs.is_empty() {
            tracing::debug!(host = %host, "host has no IPv4 address");
            return Err(NetError::NameNotResolved);
        }
        Ok(Self::new(addrs))
    }

    /// Returns true if no addresses are available.
    pub fn is_empty(&self) -> bool {
        self.addrs.len() == 0
    }

    /// Returns the number of addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }
}

impl Iterator for SocketAddrs {
    type Item = SocketAddrV4;

    fn next(&mut self) -> Option<Self::Item> {
        self.addrs.next()
    }
}

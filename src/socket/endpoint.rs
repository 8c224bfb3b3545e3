//! Connection targets: protocol, host and port.

use crate::base::neterror::NetError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::{Host, Url};

/// Transport protocol of an endpoint. Only TCP is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
        }
    }
}

impl FromStr for Protocol {
    type Err = NetError;

    /// Case-insensitive; anything but `tcp` is an unknown scheme.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tcp") {
            Ok(Protocol::Tcp)
        } else {
            tracing::debug!(protocol = %s, "unsupported protocol");
            Err(NetError::UnknownUrlScheme)
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a session connects to. The host may be an IPv4 literal or a
/// hostname; it is resolved at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    protocol: Protocol,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Build an endpoint from its parts. `protocol` must be `tcp` in any case.
    pub fn new(protocol: &str, host: impl Into<String>, port: u16) -> Result<Self, NetError> {
        let protocol = protocol.parse()?;
        let host = host.into();
        if host.is_empty() {
            return Err(NetError::AddressInvalid);
        }
        Ok(Self {
            protocol,
            host,
            port,
        })
    }

    /// Shorthand for a TCP endpoint.
    pub fn tcp(host: impl Into<String>, port: u16) -> Result<Self, NetError> {
        Self::new("tcp", host, port)
    }

    /// Parse `scheme://host:port[/path]`. The port is mandatory and any
    /// path is ignored.
    pub fn parse_url(input: &str) -> Result<Self, NetError> {
        let url = Url::parse(input.trim()).map_err(|e| {
            tracing::debug!(url = %input, error = %e, "malformed endpoint URL");
            NetError::InvalidUrl
        })?;

        let protocol = url.scheme().parse()?;
        let host = match url.host() {
            Some(Host::Ipv6(_)) => return Err(NetError::AddressInvalid),
            Some(host) => host.to_string(),
            None => return Err(NetError::InvalidUrl),
        };
        if host.is_empty() {
            return Err(NetError::InvalidUrl);
        }
        let port = url.port().ok_or(NetError::InvalidUrl)?;

        Ok(Self {
            protocol,
            host,
            port,
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_url(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_with_ip() {
        let ep = Endpoint::parse_url("tcp://127.0.0.1:8848").unwrap();
        assert_eq!(ep.protocol(), Protocol::Tcp);
        assert_eq!(ep.host(), "127.0.0.1");
        assert_eq!(ep.port(), 8848);
    }

    #[test]
    fn test_parse_url_with_hostname_and_path() {
        let ep: Endpoint = "TCP://echo.example.com:7/some/path".parse().unwrap();
        assert_eq!(ep.host(), "echo.example.com");
        assert_eq!(ep.port(), 7);
        assert_eq!(ep.to_string(), "tcp://echo.example.com:7");
    }

    #[test]
    fn test_parse_url_trailing_slash() {
        let ep = Endpoint::parse_url("tcp://10.1.2.3:80/").unwrap();
        assert_eq!(ep.host(), "10.1.2.3");
        assert_eq!(ep.port(), 80);
    }

    #[test]
    fn test_parse_url_missing_port() {
        assert_eq!(
            Endpoint::parse_url("tcp://127.0.0.1").unwrap_err(),
            NetError::InvalidUrl
        );
        assert_eq!(
            Endpoint::parse_url("tcp://127.0.0.1/path").unwrap_err(),
            NetError::InvalidUrl
        );
    }

    #[test]
    fn test_parse_url_malformed() {
        assert_eq!(Endpoint::parse_url("127.0.0.1:80").unwrap_err(), NetError::InvalidUrl);
        assert_eq!(Endpoint::parse_url("tcp://host:99999").unwrap_err(), NetError::InvalidUrl);
        assert_eq!(Endpoint::parse_url("").unwrap_err(), NetError::InvalidUrl);
    }

    #[test]
    fn test_parse_url_unsupported_scheme() {
        assert_eq!(
            Endpoint::parse_url("udp://127.0.0.1:53").unwrap_err(),
            NetError::UnknownUrlScheme
        );
        assert_eq!(
            Endpoint::parse_url("http://example.com:80/").unwrap_err(),
            NetError::UnknownUrlScheme
        );
    }

    #[test]
    fn test_new_checks_protocol_and_host() {
        let ep = Endpoint::new("Tcp", "localhost", 0).unwrap();
        assert_eq!(ep.port(), 0);
        assert_eq!(Endpoint::new("udp", "localhost", 1).unwrap_err(), NetError::UnknownUrlScheme);
        assert_eq!(Endpoint::tcp("", 1).unwrap_err(), NetError::AddressInvalid);
    }
}

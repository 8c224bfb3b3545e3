//! Hostname lookup seam used by `Session::connect`.
//!
//! Literal IPv4 hosts never get here; only names do. A lookup runs on the
//! connecting thread and counts against nothing but the resolver's own
//! limits, so custom resolvers should answer quickly.

use crate::base::neterror::NetError;
use std::{borrow::Cow, collections::HashMap, fmt, net::SocketAddr, sync::Arc};

/// A hostname handed to a [`Resolve`] implementation.
///
/// Kept exactly as the caller spelled it; comparisons that must ignore
/// case (DNS names are case-insensitive) use [`Name::eq_host`].
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.host
    }

    /// Case-insensitive match against `other`, ignoring one trailing dot
    /// on either side (`Echo.Test.` matches `echo.test`).
    pub fn eq_host(&self, other: &str) -> bool {
        strip_root(&self.host).eq_ignore_ascii_case(strip_root(other))
    }
}

fn strip_root(host: &str) -> &str {
    host.strip_suffix('.').unwrap_or(host)
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Addresses produced by one lookup, in the order connect should try them.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Turns a hostname into candidate addresses for the connect path.
///
/// Answers may mix families and carry any port: the session keeps only
/// IPv4 entries and replaces the port with the endpoint's. An empty answer
/// and an `Err` both end the connect with `NameNotResolved`.
pub trait Resolve: Send + Sync {
    fn resolve(&self, name: &Name) -> Result<Addrs, NetError>;
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: &Name) -> Result<Addrs, NetError> {
        (**self).resolve(name)
    }
}

/// Pins chosen hostnames to fixed addresses and sends everything else to
/// an inner resolver.
///
/// Hostname keys match case-insensitively and ignore a trailing dot.
///
/// ```rust,ignore
/// use ssocket::dns::{GaiResolver, ResolverWithOverrides};
/// use ssocket::socket::{Session, SessionConfig};
/// use std::{collections::HashMap, sync::Arc};
///
/// let mut pins = HashMap::new();
/// pins.insert("echo.local".into(), vec!["127.0.0.1:0".parse()?]);
/// let resolver = ResolverWithOverrides::new(Arc::new(GaiResolver::new()), pins);
///
/// let mut session = Session::with_resolver(SessionConfig::default(), Arc::new(resolver));
/// session.connect_host("echo.local", 8848)?;
/// ```
pub struct ResolverWithOverrides {
    inner: Arc<dyn Resolve>,
    pins: HashMap<String, Vec<SocketAddr>>,
}

impl ResolverWithOverrides {
    pub fn new(
        inner: Arc<dyn Resolve>,
        overrides: HashMap<Cow<'static, str>, Vec<SocketAddr>>,
    ) -> Self {
        let pins = overrides
            .into_iter()
            .map(|(host, addrs)| (pin_key(&host), addrs))
            .collect();
        Self { inner, pins }
    }

    /// Number of pinned hostnames.
    pub fn override_count(&self) -> usize {
        self.pins.len()
    }

    fn pinned(&self, name: &Name) -> Option<&[SocketAddr]> {
        self.pins.get(&pin_key(name.as_str())).map(Vec::as_slice)
    }
}

fn pin_key(host: &str) -> String {
    strip_root(host).to_ascii_lowercase()
}

impl Resolve for ResolverWithOverrides {
    fn resolve(&self, name: &Name) -> Result<Addrs, NetError> {
        match self.pinned(name) {
            Some(addrs) => {
                tracing::trace!(host = %name, count = addrs.len(), "answered from pins");
                Ok(Box::new(addrs.to_vec().into_iter()))
            }
            None => self.inner.resolve(name),
        }
    }
}

impl fmt::Debug for ResolverWithOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverWithOverrides")
            .field("pinned", &self.pins.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddrV4};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), 0))
    }

    struct Fixed(Vec<SocketAddr>);

    impl Resolve for Fixed {
        fn resolve(&self, _name: &Name) -> Result<Addrs, NetError> {
            Ok(Box::new(self.0.clone().into_iter()))
        }
    }

    struct Unreachable;

    impl Resolve for Unreachable {
        fn resolve(&self, _name: &Name) -> Result<Addrs, NetError> {
            Err(NetError::NameNotResolved)
        }
    }

    fn pinned(host: &'static str, addrs: Vec<SocketAddr>) -> ResolverWithOverrides {
        let mut pins = HashMap::new();
        pins.insert(Cow::Borrowed(host), addrs);
        ResolverWithOverrides::new(Arc::new(Unreachable), pins)
    }

    #[test]
    fn test_name_keeps_spelling() {
        let name = Name::from("Echo.Test");
        assert_eq!(name.as_str(), "Echo.Test");
        assert_eq!(format!("{name}"), "Echo.Test");
        assert_eq!(format!("{name:?}"), "\"Echo.Test\"");
    }

    #[test]
    fn test_name_eq_host() {
        let name = Name::new("Echo.Test.");
        assert!(name.eq_host("echo.test"));
        assert!(name.eq_host("ECHO.TEST."));
        assert!(!name.eq_host("echo.test.example"));
    }

    #[test]
    fn test_pins_ignore_case_and_root_dot() {
        let resolver = pinned("Echo.Local.", vec![v4(127, 0, 0, 1)]);
        for host in ["echo.local", "ECHO.LOCAL", "echo.local."] {
            let addrs: Vec<_> = resolver.resolve(&Name::new(host)).unwrap().collect();
            assert_eq!(addrs, vec![v4(127, 0, 0, 1)], "{host}");
        }
    }

    #[test]
    fn test_unpinned_host_reaches_inner() {
        let resolver = pinned("echo.local", vec![v4(127, 0, 0, 1)]);
        assert_eq!(
            resolver.resolve(&Name::new("other.local")).err().unwrap(),
            NetError::NameNotResolved
        );

        let inner = Arc::new(Fixed(vec![v4(10, 0, 0, 7)]));
        let passthrough = ResolverWithOverrides::new(inner, HashMap::new());
        let addrs: Vec<_> = passthrough.resolve(&Name::new("any.host")).unwrap().collect();
        assert_eq!(addrs, vec![v4(10, 0, 0, 7)]);
        assert_eq!(passthrough.override_count(), 0);
    }

    #[test]
    fn test_pinned_order_is_kept() {
        let resolver = pinned("multi.local", vec![v4(10, 0, 0, 2), v4(10, 0, 0, 1)]);
        let addrs: Vec<_> = resolver.resolve(&Name::new("multi.local")).unwrap().collect();
        assert_eq!(addrs, vec![v4(10, 0, 0, 2), v4(10, 0, 0, 1)]);
    }

    #[test]
    fn test_arc_forwards() {
        let shared: Arc<dyn Resolve> = Arc::new(Fixed(vec![v4(1, 2, 3, 4)]));
        let addrs: Vec<_> = Arc::clone(&shared).resolve(&Name::new("x")).unwrap().collect();
        assert_eq!(addrs.len(), 1);
    }
}

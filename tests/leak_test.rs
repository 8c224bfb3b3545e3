//! Descriptor Leak Test
//!
//! Kept in its own binary so no other test opens descriptors concurrently.

#![cfg(target_os = "linux")]

use socket2::{Domain, SockAddr, Socket, Type};
use ssocket::base::neterror::NetError;
use ssocket::socket::{Session, SessionConfig};
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

fn open_descriptors() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

#[test]
fn test_failed_connects_do_not_leak() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut session = Session::new(SessionConfig::new(64, 500, 500, 500));
    // Warm up anything lazily opened on first use.
    let _ = session.connect_ip(Ipv4Addr::LOCALHOST, port);
    let before = open_descriptors();

    for _ in 0..100 {
        assert_eq!(
            session.connect_ip(Ipv4Addr::LOCALHOST, port).unwrap_err(),
            NetError::ConnectionRefused
        );
    }
    assert_eq!(open_descriptors(), before);

    // Timed-out connects must release their descriptor too. The listener
    // never accepts and its zero backlog is filled up front.
    let stalled = Socket::new(Domain::IPV4, Type::STREAM, None).unwrap();
    stalled
        .bind(&SockAddr::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)))
        .unwrap();
    stalled.listen(0).unwrap();
    let addr = stalled.local_addr().unwrap().as_socket_ipv4().unwrap();
    let fillers: Vec<Socket> = (0..8)
        .map(|_| {
            let s = Socket::new(Domain::IPV4, Type::STREAM, None).unwrap();
            s.set_nonblocking(true).unwrap();
            let _ = s.connect(&SockAddr::from(addr));
            s
        })
        .collect();

    let mut session = Session::new(SessionConfig::new(64, 50, 500, 500));
    let before = open_descriptors();
    for _ in 0..5 {
        assert_eq!(
            session.connect_ip(Ipv4Addr::LOCALHOST, addr.port()).unwrap_err(),
            NetError::ConnectionTimedOut
        );
    }
    assert_eq!(open_descriptors(), before);
    drop(fillers);
}

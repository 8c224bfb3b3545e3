//! Echo client demo.
//!
//! Connects to `tcp://127.0.0.1:8848` (or the URL given as the first
//! argument), answers every message with `recv:<message>` and exits after a
//! message containing `close` or when the server hangs up.
//!
//! ```text
//! nc -l 8848 &
//! RUST_LOG=ssocket=debug cargo run --example echo_client -- tcp://127.0.0.1:8848
//! ```

use ssocket::socket::{RecvStatus, Session, SessionConfig};
use ssocket::NetError;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ssocket=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr.with_max_level(tracing::Level::TRACE))
        .with_target(true)
        .compact()
        .init();
}

fn main() -> Result<(), NetError> {
    init_logging();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tcp://127.0.0.1:8848".to_string());

    let mut session = Session::new(SessionConfig::new(64, 1000, 500, 500));
    session.set_url(&url)?;
    session.connect()?;
    session.dump();

    loop {
        if !session.is_readable(100) {
            continue;
        }

        match session.receive() {
            Ok(RecvStatus::Received(_)) => {}
            Ok(RecvStatus::NotReady) => continue,
            Err(NetError::ConnectionClosed) => {
                tracing::info!("server closed the connection");
                break;
            }
            Err(e) => return Err(e),
        }

        let message = session.recv_buffer().to_string_lossy();
        tracing::info!(%message, "received");

        session.append_fmt(format_args!("recv:{message}"));
        session.flush()?;

        let done = message.contains("close");
        session.clear_recv_buffer();
        if done {
            break;
        }
    }

    session.dump();
    session.disconnect();
    Ok(())
}

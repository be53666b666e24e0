//! Async dialing primitives for the shipping transport (requires `tokio`).

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::transport::Endpoint;

/// Open a TCP connection to `endpoint`.
///
/// `connect_timeout` bounds connection establishment; `None` disables the
/// bound.
pub async fn dial(
    endpoint: &Endpoint,
    connect_timeout: Option<Duration>,
) -> io::Result<TcpStream> {
    let addr = (endpoint.host(), endpoint.port());
    match connect_timeout {
        Some(bound) => timeout(bound, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connection timeout"))?,
        None => TcpStream::connect(addr).await,
    }
}

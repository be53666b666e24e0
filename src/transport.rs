//! Dialing and stream primitives for the shipping transport.
//!
//! The sender never opens sockets itself; it goes through the [`Dialer`]
//! capability so deployments (and tests) can substitute how connections are
//! established. [`TcpDialer`] is the production implementation.

use std::fmt;
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Address of the remote collector.
///
/// Immutable for the lifetime of a sender.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from a hostname (or IP literal) and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Hostname or IP literal of the collector.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port of the collector.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve the endpoint to socket addresses.
    pub fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port).to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no addresses resolved for {self}"),
            ));
        }
        Ok(addrs)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

/// A connected, writable byte stream handed out by a [`Dialer`].
pub trait WireStream: Write + Send {
    /// Shut down the stream, releasing the underlying resource.
    fn close(&mut self) -> io::Result<()>;
}

impl WireStream for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Capability for establishing connections to a collector.
///
/// Given an endpoint and an optional connect timeout, a dialer returns a
/// connected writable stream or fails with an I/O error. `None` disables the
/// timeout bound entirely.
pub trait Dialer: Send {
    /// Stream type produced by successful dials.
    type Stream: WireStream;

    /// Open a new connection to `endpoint`.
    fn dial(&self, endpoint: &Endpoint, timeout: Option<Duration>) -> io::Result<Self::Stream>;
}

/// Production dialer opening plain TCP sockets via `std::net`.
///
/// Resolution may yield several addresses; each is tried in order and the
/// first successful connection wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&self, endpoint: &Endpoint, timeout: Option<Duration>) -> io::Result<Self::Stream> {
        let mut last_err = None;
        for addr in endpoint.socket_addrs()? {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        // socket_addrs guarantees at least one address, so at least one
        // attempt was made.
        Err(last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no addresses tried")))
    }
}

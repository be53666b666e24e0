//! Reliable log-shipping transport over TCP built on std::net.
//!
//! This crate delivers serialized log records (opaque byte payloads) to a
//! remote collector over a persistent TCP connection, transparently
//! re-establishing the connection on failure and on a configurable rotation
//! schedule, with a bounded retry policy for transient send failures.
//!
//! # Features
//!
//! - Single persistent connection with scheduled rotation
//! - Bounded, interruptible retry loop per message
//! - Strict send serialization: frames never interleave on the wire
//! - Never panics, never errors the logging caller; failures are reported
//!   through a pluggable error sink
//! - Injectable dialing and clock seams for deterministic tests
//! - Async variants behind the `tokio` feature
//!
//! # Example
//!
//! ```no_run
//! use logship_rs::{Endpoint, SenderConfig, TcpSender};
//!
//! let sender = TcpSender::new(
//!     Endpoint::new("graylog.example.com", 12201),
//!     SenderConfig::default(),
//! );
//!
//! let delivery = sender.send(b"{\"version\":\"1.1\",\"short_message\":\"hello\"}");
//! if !delivery.is_delivered() {
//!     // The message was dropped after the configured retries; details went
//!     // to the error sink.
//! }
//! sender.close();
//! ```
//!
//! # Wire Format
//!
//! Frames are delimiter-based, the GELF-over-TCP convention: the payload
//! bytes followed by exactly one `0x00` terminator, no length prefix.
//!
//! ```text
//! +--------+--------+-- ... --+--------+
//! |        payload bytes      |  0x00  |
//! +--------+--------+-- ... --+--------+
//! ```

pub mod clock;
pub mod codec;
pub mod connection;
pub mod error;
pub mod sender;
pub mod sink;
pub mod transport;

// Async modules (require tokio feature)
#[cfg(feature = "tokio")]
pub mod sender_async;
#[cfg(feature = "tokio")]
pub mod transport_async;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at the crate root
pub use clock::{Clock, SystemClock};
pub use codec::{frame_payload, FrameDecoder, FRAME_TERMINATOR};
pub use connection::{
    ConnectionConfig, ConnectionManager, ConnectionState, RetryPolicy, SenderConfig,
    TransportStats,
};
pub use error::{Result, ShipError};
pub use sender::{Delivery, Liveness, TcpSender};
pub use sink::{ErrorSink, LogSink};
pub use transport::{Dialer, Endpoint, TcpDialer, WireStream};

#[cfg(feature = "tokio")]
pub use connection::AsyncConnectionManager;
#[cfg(feature = "tokio")]
pub use sender_async::{AsyncTcpSender, ShutdownSignal};

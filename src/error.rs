//! Error types for the shipping transport.

use std::io;
use thiserror::Error;

use crate::transport::Endpoint;

/// Errors that can occur while shipping frames to a collector.
///
/// None of these ever reach a log-emitting caller as a panic or a returned
/// error from [`TcpSender::send`](crate::TcpSender::send); they are reported
/// through the configured [`ErrorSink`](crate::ErrorSink) instead.
#[derive(Error, Debug)]
pub enum ShipError {
    /// Dialing the collector failed (refused, timed out, unresolvable, ...).
    #[error("error connecting to tcp://{endpoint}: {source}")]
    Connect {
        /// The collector that could not be reached.
        endpoint: Endpoint,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// An established connection failed mid-write (broken pipe, reset, ...).
    #[error("error sending message via tcp://{endpoint}: {source}")]
    Write {
        /// The collector the write was addressed to.
        endpoint: Endpoint,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// Closing a stale connection failed. Purely informational; the
    /// connection is replaced regardless.
    #[error("can't close stream: {0}")]
    Close(#[source] io::Error),
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, ShipError>;

impl ShipError {
    /// Check if this error is recovered by redialing on the next attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Write { .. })
    }
}

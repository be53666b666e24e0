//! Managed outbound connection with scheduled rotation.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, ShipError};
use crate::sink::ErrorSink;
use crate::transport::{Dialer, Endpoint, TcpDialer, WireStream};

use super::config::ConnectionConfig;
use super::state::{ConnectionState, Deadline, TransportStats};

/// Owner of the single outbound connection to the collector.
///
/// The manager guarantees that [`ensure_connection`](Self::ensure_connection)
/// yields a usable writable stream, redialing when the rotation deadline has
/// passed or a prior attempt failed, and that at most one live connection
/// exists at a time: the old stream is always closed before a new one
/// replaces it.
///
/// Not internally synchronized. Callers serialize access through one
/// exclusive lock; [`TcpSender`](crate::TcpSender) wraps the manager in a
/// `Mutex` for exactly that purpose.
pub struct ConnectionManager<D: Dialer = TcpDialer> {
    endpoint: Endpoint,
    config: ConnectionConfig,
    dialer: D,
    sink: Arc<dyn ErrorSink>,
    stream: Option<D::Stream>,
    deadline: Deadline,
    state: ConnectionState,
    stats: TransportStats,
}

impl<D: Dialer> ConnectionManager<D> {
    /// Create a manager in the disconnected state.
    ///
    /// No connection is opened until the first
    /// [`ensure_connection`](Self::ensure_connection) call.
    pub fn new(
        endpoint: Endpoint,
        config: ConnectionConfig,
        dialer: D,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            endpoint,
            config,
            dialer,
            sink,
            stream: None,
            deadline: Deadline::Immediate,
            state: ConnectionState::Disconnected,
            stats: TransportStats::default(),
        }
    }

    /// Get the collector endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Get the transport counters.
    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut TransportStats {
        &mut self.stats
    }

    /// Yield a usable writable stream, reconnecting when required.
    ///
    /// Reconnects when the rotation deadline has passed or no stream exists
    /// (initially, and after [`close`](Self::close)). On a dial failure the
    /// deadline is left expired so the next attempt redials immediately, and
    /// the error propagates as [`ShipError::Connect`].
    pub fn ensure_connection(&mut self, now: Instant) -> Result<&mut D::Stream> {
        if self.stream.is_none() || self.deadline.is_due(now) {
            self.close_stream();

            let stream = match self.dialer.dial(&self.endpoint, self.config.connect_timeout) {
                Ok(stream) => stream,
                Err(source) => {
                    self.deadline = Deadline::Immediate;
                    self.state = ConnectionState::Disconnected;
                    self.stats.record_failure(now);
                    return Err(ShipError::Connect {
                        endpoint: self.endpoint.clone(),
                        source,
                    });
                }
            };

            self.deadline = Deadline::after(now, self.config.reconnect_interval);
            self.state = ConnectionState::Connected;
            self.stats.record_connect(now);
            return Ok(self.stream.insert(stream));
        }

        // Invariant: a live stream exists whenever neither branch above
        // reconnected.
        Ok(self.stream.as_mut().expect("live connection"))
    }

    /// Expire the deadline so the next
    /// [`ensure_connection`](Self::ensure_connection) call reconnects
    /// regardless of the rotation schedule. Called after a write failure.
    pub fn force_reconnect(&mut self) {
        self.deadline = Deadline::Immediate;
        self.stats.record_forced_reconnect();
    }

    /// Close the current connection if one exists.
    ///
    /// Idempotent. Close failures are reported to the error sink and never
    /// returned; the manager can be reconnected afterwards by calling
    /// [`ensure_connection`](Self::ensure_connection) again.
    pub fn close(&mut self) {
        self.close_stream();
        self.state = ConnectionState::Disconnected;
    }

    fn close_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.close() {
                self.sink.report(&ShipError::Close(err));
            }
        }
    }
}

impl<D: Dialer> std::fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("deadline", &self.deadline)
            .finish()
    }
}

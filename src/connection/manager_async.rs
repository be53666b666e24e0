//! Async managed outbound connection with scheduled rotation.

use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::{Result, ShipError};
use crate::sink::ErrorSink;
use crate::transport::Endpoint;
use crate::transport_async;

use super::config::ConnectionConfig;
use super::state::{ConnectionState, Deadline, TransportStats};

/// Async counterpart of [`ConnectionManager`](super::ConnectionManager).
///
/// Same lifecycle semantics over a tokio stream. Not internally
/// synchronized; [`AsyncTcpSender`](crate::AsyncTcpSender) serializes access
/// through a `tokio::sync::Mutex`.
pub struct AsyncConnectionManager {
    endpoint: Endpoint,
    config: ConnectionConfig,
    sink: Arc<dyn ErrorSink>,
    stream: Option<TcpStream>,
    deadline: Deadline,
    state: ConnectionState,
    stats: TransportStats,
}

impl AsyncConnectionManager {
    /// Create a manager in the disconnected state.
    pub fn new(endpoint: Endpoint, config: ConnectionConfig, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            endpoint,
            config,
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
    pub async fn ensure_connection(&mut self, now: Instant) -> Result<&mut TcpStream> {
        if self.stream.is_none() || self.deadline.is_due(now) {
            self.close_stream().await;

            let stream =
                match transport_async::dial(&self.endpoint, self.config.connect_timeout).await {
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

        // Invariant: a live stream exists whenever the branch above did not
        // reconnect.
        Ok(self.stream.as_mut().expect("live connection"))
    }

    /// Expire the deadline so the next
    /// [`ensure_connection`](Self::ensure_connection) call reconnects
    /// regardless of the rotation schedule.
    pub fn force_reconnect(&mut self) {
        self.deadline = Deadline::Immediate;
        self.stats.record_forced_reconnect();
    }

    /// Close the current connection if one exists. Idempotent; close
    /// failures go to the error sink.
    pub async fn close(&mut self) {
        self.close_stream().await;
        self.state = ConnectionState::Disconnected;
    }

    async fn close_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.shutdown().await {
                self.sink.report(&ShipError::Close(err));
            }
        }
    }
}

//! Connection state tracking.

use std::time::{Duration, Instant};

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected.
    #[default]
    Disconnected,
    /// Connected and ready to write.
    Connected,
}

impl ConnectionState {
    /// Check if the connection is usable.
    pub fn is_connected(&self) -> bool {
        *self == ConnectionState::Connected
    }
}

/// The instant after which the next connection use must redial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Already expired; reconnect on the next use.
    Immediate,
    /// Reconnect once past the given instant.
    At(Instant),
    /// Never force a reconnect.
    Never,
}

impl Deadline {
    /// Compute the deadline following a successful connect at `now`.
    ///
    /// `None` means rotation is disabled. A zero interval produces a
    /// deadline that is already past on the next use, so every subsequent
    /// call reconnects.
    pub fn after(now: Instant, interval: Option<Duration>) -> Self {
        match interval {
            Some(interval) => Deadline::At(now + interval),
            None => Deadline::Never,
        }
    }

    /// Check whether the deadline has passed at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        match self {
            Deadline::Immediate => true,
            Deadline::At(at) => now > *at,
            Deadline::Never => false,
        }
    }
}

/// Delivery and connection counters.
#[derive(Debug, Clone, Default)]
pub struct TransportStats {
    /// Number of successful connections.
    pub connect_count: u64,
    /// Number of connection failures.
    pub failure_count: u64,
    /// Number of reconnects forced by a failed connect or write.
    pub forced_reconnects: u64,
    /// Number of messages written to the wire.
    pub messages_sent: u64,
    /// Total wire bytes written, terminators included.
    pub bytes_sent: u64,
    /// Number of messages given up on after exhausting retries.
    pub messages_dropped: u64,
    /// Time of the last successful connection.
    pub last_connected: Option<Instant>,
    /// Time of the last connect or write error.
    pub last_error: Option<Instant>,
}

impl TransportStats {
    /// Record a successful connection.
    pub fn record_connect(&mut self, now: Instant) {
        self.connect_count += 1;
        self.last_connected = Some(now);
    }

    /// Record a connect or write failure.
    pub fn record_failure(&mut self, now: Instant) {
        self.failure_count += 1;
        self.last_error = Some(now);
    }

    /// Record a reconnect forced by a delivery failure.
    pub fn record_forced_reconnect(&mut self) {
        self.forced_reconnects += 1;
    }

    /// Record a message written to the wire.
    pub fn record_send(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    /// Record a message dropped after retries were exhausted.
    pub fn record_drop(&mut self) {
        self.messages_dropped += 1;
    }
}

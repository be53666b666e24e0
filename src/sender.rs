//! The sender: per-message retry loop over one exclusive critical section.

use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::codec::frame_payload;
use crate::connection::{ConnectionManager, RetryPolicy, SenderConfig, TransportStats};
use crate::error::ShipError;
use crate::sink::{ErrorSink, LogSink};
use crate::transport::{Dialer, Endpoint, TcpDialer, WireStream};

/// Outcome of a [`TcpSender::send`] call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The wire frame was fully written to a live connection.
    Delivered,
    /// Every attempt failed or the retry loop was cut short; the message is
    /// lost.
    Dropped,
}

impl Delivery {
    /// Check if the message reached the wire.
    pub fn is_delivered(&self) -> bool {
        *self == Delivery::Delivered
    }
}

/// Externally-owned liveness flag consulted between retry attempts.
///
/// Handles are cheap clones of one shared flag. [`shut_down`](Self::shut_down)
/// clears the flag and wakes any sender currently waiting out a retry delay,
/// so in-flight retry loops stop promptly.
#[derive(Debug, Clone)]
pub struct Liveness {
    inner: Arc<LivenessInner>,
}

#[derive(Debug)]
struct LivenessInner {
    active: Mutex<bool>,
    wake: Condvar,
}

impl Liveness {
    /// Create a new flag in the active state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LivenessInner {
                active: Mutex::new(true),
                wake: Condvar::new(),
            }),
        }
    }

    /// Check whether the owning component is still active.
    pub fn is_active(&self) -> bool {
        *self
            .inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the flag and wake all waiters.
    pub fn shut_down(&self) {
        let mut active = self
            .inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *active = false;
        self.inner.wake.notify_all();
    }

    /// Wait for `delay`, waking early on shutdown.
    ///
    /// Returns `false` when the flag was cleared before or during the wait.
    pub fn wait_for(&self, delay: Duration) -> bool {
        let active = self
            .inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (active, _) = self
            .inner
            .wake
            .wait_timeout_while(active, delay, |active| *active)
            .unwrap_or_else(PoisonError::into_inner);
        *active
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Reliable sender delivering wire frames to a single collector.
///
/// All socket access (the reconnect decision, dialing, and the write) runs
/// inside one exclusive lock, so concurrent [`send`](Self::send) calls are
/// strictly serialized and frames never interleave on the wire.
pub struct TcpSender<D: Dialer = TcpDialer, C: Clock = SystemClock> {
    manager: Mutex<ConnectionManager<D>>,
    retry: RetryPolicy,
    clock: C,
    sink: Arc<dyn ErrorSink>,
    liveness: Liveness,
}

impl TcpSender {
    /// Create a sender with the production dialer, the system clock, a
    /// `log`-backed error sink, and a fresh liveness flag.
    pub fn new(endpoint: Endpoint, config: SenderConfig) -> Self {
        Self::with_parts(
            endpoint,
            config,
            TcpDialer,
            SystemClock,
            Arc::new(LogSink),
            Liveness::new(),
        )
    }
}

impl<D: Dialer, C: Clock> TcpSender<D, C> {
    /// Create a sender with explicit collaborators.
    ///
    /// Pass an existing [`Liveness`] handle when the owning component wants
    /// to control shutdown from outside.
    pub fn with_parts(
        endpoint: Endpoint,
        config: SenderConfig,
        dialer: D,
        clock: C,
        sink: Arc<dyn ErrorSink>,
        liveness: Liveness,
    ) -> Self {
        let manager = ConnectionManager::new(endpoint, config.connection, dialer, sink.clone());
        Self {
            manager: Mutex::new(manager),
            retry: config.retry,
            clock,
            sink,
            liveness,
        }
    }

    /// Deliver one payload, retrying transient failures up to the configured
    /// bound.
    ///
    /// The payload is framed with the trailing terminator byte and written
    /// to the collector in a single write call. With `max_retries = N` the
    /// frame is attempted up to `N + 1` times; the retry delay runs between
    /// attempts only and is skipped entirely when zero. A shutdown signalled
    /// through the liveness flag stops the loop promptly, including mid-delay.
    ///
    /// Never panics and never returns an error: failures degrade to
    /// [`Delivery::Dropped`] with the causes reported through the error
    /// sink. The write itself carries no timeout; delivery relies on the
    /// transport's own blocking semantics, so a hung peer can stall the
    /// sender until the operating system gives up.
    pub fn send(&self, payload: &[u8]) -> Delivery {
        let frame = frame_payload(payload);
        let mut attempts_left = self.retry.max_retries;

        loop {
            if self.try_send(&frame) {
                return Delivery::Delivered;
            }

            if self.retry.retry_delay > Duration::ZERO
                && attempts_left > 0
                && !self.clock.sleep(self.retry.retry_delay, &self.liveness)
            {
                // Shut down mid-delay: give up without further attempts.
                break;
            }

            if attempts_left == 0 || !self.liveness.is_active() {
                break;
            }
            attempts_left -= 1;
        }

        self.lock_manager().stats_mut().record_drop();
        Delivery::Dropped
    }

    /// One delivery attempt under the exclusive lock.
    fn try_send(&self, frame: &[u8]) -> bool {
        let mut manager = self.lock_manager();
        let now = self.clock.now();

        let write_result = match manager.ensure_connection(now) {
            Ok(stream) => write_frame(stream, frame),
            Err(err) => {
                self.sink.report(&err);
                manager.force_reconnect();
                return false;
            }
        };

        match write_result {
            Ok(()) => {
                manager.stats_mut().record_send(frame.len());
                true
            }
            Err(source) => {
                let err = ShipError::Write {
                    endpoint: manager.endpoint().clone(),
                    source,
                };
                self.sink.report(&err);
                manager.stats_mut().record_failure(now);
                manager.force_reconnect();
                false
            }
        }
    }

    /// Close the underlying connection.
    ///
    /// Acquires the exclusive lock, so an in-flight attempt completes first.
    /// Idempotent; a later [`send`](Self::send) reconnects.
    pub fn close(&self) {
        self.lock_manager().close();
    }

    /// Get a handle to the liveness flag.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Snapshot the transport counters.
    pub fn stats(&self) -> TransportStats {
        self.lock_manager().stats().clone()
    }

    fn lock_manager(&self) -> MutexGuard<'_, ConnectionManager<D>> {
        // A poisoned lock still guards a structurally sound manager; the
        // next attempt reconnects if the stream was left broken.
        self.manager.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Dialer, C: Clock> std::fmt::Debug for TcpSender<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let manager = self.lock_manager();
        f.debug_struct("TcpSender")
            .field("endpoint", manager.endpoint())
            .field("state", &manager.state())
            .field("retry", &self.retry)
            .finish()
    }
}

fn write_frame<S: WireStream>(stream: &mut S, frame: &[u8]) -> io::Result<()> {
    stream.write_all(frame)?;
    stream.flush()
}

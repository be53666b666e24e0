//! Shared test doubles for the transport seams.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::ShipError;
use crate::sender::Liveness;
use crate::sink::ErrorSink;
use crate::transport::{Dialer, Endpoint, WireStream};

/// Scripted outcome for one dial attempt.
pub(crate) struct DialOutcome {
    refused: bool,
    fail_writes: bool,
    fail_close: bool,
}

impl DialOutcome {
    /// Dial fails with `ConnectionRefused`.
    pub(crate) fn refused() -> Self {
        Self {
            refused: true,
            fail_writes: false,
            fail_close: false,
        }
    }

    /// Dial succeeds, but every write on the stream fails.
    pub(crate) fn broken_writes() -> Self {
        Self {
            refused: false,
            fail_writes: true,
            fail_close: false,
        }
    }

    /// Dial succeeds, but closing the stream fails.
    pub(crate) fn broken_close() -> Self {
        Self {
            refused: false,
            fail_writes: false,
            fail_close: true,
        }
    }
}

#[derive(Default)]
struct MockNetInner {
    script: VecDeque<DialOutcome>,
    dials: usize,
    writes: Vec<(usize, Vec<u8>)>,
    closed: Vec<usize>,
    next_id: usize,
}

/// Observable fake network: scripts dial outcomes and records what streams
/// saw. Dials beyond the script succeed with a healthy stream.
#[derive(Default)]
pub(crate) struct MockNet {
    inner: Mutex<MockNetInner>,
}

impl MockNet {
    pub(crate) fn new() -> Arc<Self> {
        Arc::default()
    }

    /// Queue the outcome for the next unscripted dial.
    pub(crate) fn push(&self, outcome: DialOutcome) {
        self.inner.lock().unwrap().script.push_back(outcome);
    }

    /// Number of dial attempts so far.
    pub(crate) fn dials(&self) -> usize {
        self.inner.lock().unwrap().dials
    }

    /// `(stream id, bytes)` per successful write call, in order.
    pub(crate) fn writes(&self) -> Vec<(usize, Vec<u8>)> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Stream ids closed so far, in order.
    pub(crate) fn closed(&self) -> Vec<usize> {
        self.inner.lock().unwrap().closed.clone()
    }

    pub(crate) fn dialer(self: &Arc<Self>) -> MockDialer {
        MockDialer { net: self.clone() }
    }
}

/// Dialer handing out [`MockStream`]s according to the script.
pub(crate) struct MockDialer {
    net: Arc<MockNet>,
}

impl Dialer for MockDialer {
    type Stream = MockStream;

    fn dial(&self, _endpoint: &Endpoint, _timeout: Option<Duration>) -> io::Result<MockStream> {
        let mut inner = self.net.inner.lock().unwrap();
        inner.dials += 1;
        let outcome = inner.script.pop_front().unwrap_or(DialOutcome {
            refused: false,
            fail_writes: false,
            fail_close: false,
        });
        if outcome.refused {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        Ok(MockStream {
            id,
            fail_writes: outcome.fail_writes,
            fail_close: outcome.fail_close,
            net: self.net.clone(),
        })
    }
}

pub(crate) struct MockStream {
    id: usize,
    fail_writes: bool,
    fail_close: bool,
    net: Arc<MockNet>,
}

impl std::fmt::Debug for MockStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStream")
            .field("id", &self.id)
            .field("fail_writes", &self.fail_writes)
            .field("fail_close", &self.fail_close)
            .finish()
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        self.net
            .inner
            .lock()
            .unwrap()
            .writes
            .push((self.id, buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WireStream for MockStream {
    fn close(&mut self) -> io::Result<()> {
        if self.fail_close {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "close failed",
            ));
        }
        self.net.inner.lock().unwrap().closed.push(self.id);
        Ok(())
    }
}

struct ManualClockInner {
    now: Instant,
    sleeps: Vec<Duration>,
    interrupt_at: Option<usize>,
}

/// Deterministic clock: time only moves via [`advance`](Self::advance) and
/// recorded sleeps, and chosen sleeps can be scripted to report interruption.
pub(crate) struct ManualClock {
    inner: Mutex<ManualClockInner>,
}

impl ManualClock {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(ManualClockInner {
                now: Instant::now(),
                sleeps: Vec::new(),
                interrupt_at: None,
            }),
        })
    }

    /// Move the clock forward.
    pub(crate) fn advance(&self, delta: Duration) {
        self.inner.lock().unwrap().now += delta;
    }

    /// Sleeps requested so far, in order.
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().sleeps.clone()
    }

    /// Report the sleep with the given index (0-based) as interrupted.
    pub(crate) fn interrupt_sleep(&self, index: usize) {
        self.inner.lock().unwrap().interrupt_at = Some(index);
    }
}

impl Clock for Arc<ManualClock> {
    fn now(&self) -> Instant {
        self.inner.lock().unwrap().now
    }

    fn sleep(&self, delay: Duration, liveness: &Liveness) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let index = inner.sleeps.len();
        inner.sleeps.push(delay);
        if inner.interrupt_at == Some(index) {
            return false;
        }
        inner.now += delay;
        liveness.is_active()
    }
}

/// Error sink capturing report strings for assertions.
#[derive(Default)]
pub(crate) struct CollectingSink {
    reports: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::default()
    }

    pub(crate) fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, error: &ShipError) {
        self.reports.lock().unwrap().push(error.to_string());
    }
}

//! Async sender (requires `tokio`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard, Notify};
use tokio::time::sleep;

use crate::codec::frame_payload;
use crate::connection::{AsyncConnectionManager, RetryPolicy, SenderConfig, TransportStats};
use crate::error::ShipError;
use crate::sender::Delivery;
use crate::sink::{ErrorSink, LogSink};
use crate::transport::Endpoint;

/// Shutdown flag for async senders.
///
/// Handles are cheap clones of one shared flag. [`shut_down`](Self::shut_down)
/// clears the flag and wakes senders currently waiting out a retry delay.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug)]
struct SignalInner {
    active: AtomicBool,
    wake: Notify,
}

impl ShutdownSignal {
    /// Create a new flag in the active state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                active: AtomicBool::new(true),
                wake: Notify::new(),
            }),
        }
    }

    /// Check whether the owning component is still active.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Clear the flag and wake all waiters.
    pub fn shut_down(&self) {
        self.inner.active.store(false, Ordering::Release);
        self.inner.wake.notify_waiters();
    }

    /// Wait for `delay`, waking early on shutdown.
    ///
    /// Returns `false` when the flag was cleared before or during the wait.
    pub async fn wait_for(&self, delay: Duration) -> bool {
        if !self.is_active() {
            return false;
        }
        tokio::select! {
            _ = sleep(delay) => self.is_active(),
            _ = self.inner.wake.notified() => false,
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Async counterpart of [`TcpSender`](crate::TcpSender).
///
/// The `tokio::sync::Mutex` around the manager is the single exclusive
/// critical section; concurrent [`send`](Self::send) calls are strictly
/// serialized and frames never interleave on the wire.
pub struct AsyncTcpSender {
    manager: Mutex<AsyncConnectionManager>,
    retry: RetryPolicy,
    sink: Arc<dyn ErrorSink>,
    shutdown: ShutdownSignal,
}

impl AsyncTcpSender {
    /// Create a sender with a `log`-backed error sink and a fresh shutdown
    /// signal.
    pub fn new(endpoint: Endpoint, config: SenderConfig) -> Self {
        Self::with_parts(endpoint, config, Arc::new(LogSink), ShutdownSignal::new())
    }

    /// Create a sender with explicit collaborators.
    pub fn with_parts(
        endpoint: Endpoint,
        config: SenderConfig,
        sink: Arc<dyn ErrorSink>,
        shutdown: ShutdownSignal,
    ) -> Self {
        let manager = AsyncConnectionManager::new(endpoint, config.connection, sink.clone());
        Self {
            manager: Mutex::new(manager),
            retry: config.retry,
            sink,
            shutdown,
        }
    }

    /// Deliver one payload, retrying transient failures up to the configured
    /// bound.
    ///
    /// Same contract as [`TcpSender::send`](crate::TcpSender::send): the
    /// frame is attempted up to `max_retries + 1` times, the delay runs
    /// between attempts only, shutdown stops the loop promptly (including
    /// mid-delay), and failures degrade to [`Delivery::Dropped`] with the
    /// causes reported through the error sink.
    pub async fn send(&self, payload: &[u8]) -> Delivery {
        let frame = frame_payload(payload);
        let mut attempts_left = self.retry.max_retries;

        loop {
            if self.try_send(&frame).await {
                return Delivery::Delivered;
            }

            if self.retry.retry_delay > Duration::ZERO
                && attempts_left > 0
                && !self.shutdown.wait_for(self.retry.retry_delay).await
            {
                break;
            }

            if attempts_left == 0 || !self.shutdown.is_active() {
                break;
            }
            attempts_left -= 1;
        }

        self.manager.lock().await.stats_mut().record_drop();
        Delivery::Dropped
    }

    async fn try_send(&self, frame: &[u8]) -> bool {
        let mut manager = self.lock_manager().await;
        let now = Instant::now();

        let write_result = match manager.ensure_connection(now).await {
            Ok(stream) => match stream.write_all(frame).await {
                Ok(()) => stream.flush().await,
                Err(err) => Err(err),
            },
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

    /// Close the underlying connection. Idempotent; a later
    /// [`send`](Self::send) reconnects.
    pub async fn close(&self) {
        self.lock_manager().await.close().await;
    }

    /// Get a handle to the shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Snapshot the transport counters.
    pub async fn stats(&self) -> TransportStats {
        self.lock_manager().await.stats().clone()
    }

    async fn lock_manager(&self) -> MutexGuard<'_, AsyncConnectionManager> {
        self.manager.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FrameDecoder;
    use crate::test_support::CollectingSink;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_ships_frames_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut bytes = Vec::new();
            stream.read_to_end(&mut bytes).await.unwrap();
            bytes
        });

        let sender = AsyncTcpSender::new(Endpoint::from(addr), SenderConfig::default());
        assert!(sender.send(b"first record").await.is_delivered());
        assert!(sender.send(b"second record").await.is_delivered());
        sender.close().await;

        let mut decoder = FrameDecoder::new();
        decoder.feed(&server.await.unwrap());
        let frames = decoder.parse_all();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref(), b"first record");
        assert_eq!(frames[1].as_ref(), b"second record");
    }

    #[tokio::test]
    async fn test_gives_up_after_retries_exhausted() {
        // Bind then drop to obtain a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = CollectingSink::shared();
        let sender = AsyncTcpSender::with_parts(
            Endpoint::from(addr),
            SenderConfig::default().with_retry(RetryPolicy::fixed(2, Duration::ZERO)),
            sink.clone(),
            ShutdownSignal::new(),
        );

        let outcome = sender.send(b"lost").await;

        assert_eq!(outcome, Delivery::Dropped);
        // One connect error reported per attempt.
        assert_eq!(sink.reports().len(), 3);
        assert_eq!(sender.stats().await.messages_dropped, 1);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_delay() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sender = Arc::new(AsyncTcpSender::with_parts(
            Endpoint::from(addr),
            SenderConfig::default().with_retry(RetryPolicy::fixed(5, Duration::from_secs(30))),
            CollectingSink::shared(),
            ShutdownSignal::new(),
        ));

        let signal = sender.shutdown_signal();
        let task = {
            let sender = sender.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let outcome = sender.send(b"x").await;
                (outcome, started.elapsed())
            })
        };

        sleep(Duration::from_millis(50)).await;
        signal.shut_down();

        let (outcome, elapsed) = task.await.unwrap();
        assert_eq!(outcome, Delivery::Dropped);
        assert!(elapsed < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_wait_for_completes_when_active() {
        let signal = ShutdownSignal::new();
        assert!(signal.wait_for(Duration::from_millis(5)).await);
        assert!(signal.is_active());
    }
}

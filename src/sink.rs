//! Best-effort error reporting.

use crate::error::ShipError;

/// Sink for delivery errors.
///
/// The transport never raises errors to the log-emitting caller; everything
/// it has to say goes through this collaborator. Implementations must not
/// panic and must not block the sender materially.
pub trait ErrorSink: Send + Sync {
    /// Report a delivery error.
    fn report(&self, error: &ShipError);
}

/// Default sink forwarding reports to the `log` crate at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: &ShipError) {
        log::warn!("{error}");
    }
}

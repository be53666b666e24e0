//! Transport configuration types.

use std::time::Duration;

/// Default bound on connection establishment.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);
/// Default interval after which an existing connection is closed and re-opened.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(300);
/// Default number of retries after a failed delivery attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default delay between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3_000);

/// Connection lifecycle configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum time to wait when establishing a connection. `None` disables
    /// the bound entirely.
    pub connect_timeout: Option<Duration>,
    /// Interval after which a healthy connection is closed and re-opened.
    /// `None` disables forced rotation; `Some(Duration::ZERO)` rotates on
    /// every send.
    pub reconnect_interval: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            reconnect_interval: Some(DEFAULT_RECONNECT_INTERVAL),
        }
    }
}

impl ConnectionConfig {
    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disable the connect timeout.
    pub fn without_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }

    /// Set the forced-rotation interval.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = Some(interval);
        self
    }

    /// Disable forced rotation; the connection is only replaced after a
    /// connect or write failure.
    pub fn without_rotation(mut self) -> Self {
        self.reconnect_interval = None;
        self
    }
}

/// Retry policy for delivery attempts.
///
/// `max_retries = N` allows up to `N + 1` total attempts per message.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt. A value of 0 disables
    /// retries.
    pub max_retries: u32,
    /// Delay between attempts. Ignored when zero.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
        }
    }

    /// Create a policy with fixed delay retries.
    pub fn fixed(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }
}

/// Aggregate configuration for a sender.
#[derive(Debug, Clone, Default)]
pub struct SenderConfig {
    /// Connection lifecycle settings.
    pub connection: ConnectionConfig,
    /// Per-message retry settings.
    pub retry: RetryPolicy,
}

impl SenderConfig {
    /// Set the connection configuration.
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(15_000)));
        assert_eq!(config.reconnect_interval, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.retry_delay, Duration::from_millis(3_000));
    }

    #[test]
    fn test_connection_config_builder() {
        let config = ConnectionConfig::default()
            .with_connect_timeout(Duration::from_secs(1))
            .without_rotation();

        assert_eq!(config.connect_timeout, Some(Duration::from_secs(1)));
        assert_eq!(config.reconnect_interval, None);

        let unbounded = ConnectionConfig::default().without_connect_timeout();
        assert_eq!(unbounded.connect_timeout, None);
    }

    #[test]
    fn test_retry_policy_constructors() {
        let none = RetryPolicy::no_retry();
        assert_eq!(none.max_retries, 0);
        assert_eq!(none.retry_delay, Duration::ZERO);

        let fixed = RetryPolicy::fixed(3, Duration::from_millis(100));
        assert_eq!(fixed.max_retries, 3);
        assert_eq!(fixed.retry_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_sender_config_builder() {
        let config = SenderConfig::default()
            .with_connection(ConnectionConfig::default().without_rotation())
            .with_retry(RetryPolicy::no_retry());

        assert_eq!(config.connection.reconnect_interval, None);
        assert_eq!(config.retry.max_retries, 0);
    }
}

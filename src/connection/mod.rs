//! Connection lifecycle management for the shipping transport.
//!
//! This module provides:
//! - The [`ConnectionManager`] owning the single outbound connection and its
//!   rotation deadline
//! - Configuration for connect timeouts, forced rotation, and retries
//! - Connection state and delivery counters
//!
//! # Example
//!
//! ```no_run
//! use logship_rs::connection::{ConnectionConfig, RetryPolicy, SenderConfig};
//! use logship_rs::{Endpoint, TcpSender};
//! use std::time::Duration;
//!
//! let config = SenderConfig::default()
//!     .with_connection(
//!         ConnectionConfig::default().with_reconnect_interval(Duration::from_secs(60)),
//!     )
//!     .with_retry(RetryPolicy::fixed(3, Duration::from_secs(1)));
//!
//! let sender = TcpSender::new(Endpoint::new("graylog.example.com", 12201), config);
//! let _ = sender.send(b"{\"short_message\":\"hello\"}");
//! ```

mod config;
mod manager;
mod state;

pub use config::{
    ConnectionConfig, RetryPolicy, SenderConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_RETRIES,
    DEFAULT_RECONNECT_INTERVAL, DEFAULT_RETRY_DELAY,
};
pub use manager::ConnectionManager;
pub use state::{ConnectionState, Deadline, TransportStats};

// Async variant (requires tokio feature)
#[cfg(feature = "tokio")]
mod manager_async;

#[cfg(feature = "tokio")]
pub use manager_async::AsyncConnectionManager;

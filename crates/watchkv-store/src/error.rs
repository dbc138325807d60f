//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key is empty or otherwise unusable.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
}

/// Failure reported by a fallible listener.
///
/// Listener failures never reach the caller of a mutating operation. They
/// are logged and counted in [`StoreStats::listener_failures`](crate::StoreStats).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("listener failed: {message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Create a listener error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

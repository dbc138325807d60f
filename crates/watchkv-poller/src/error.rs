use watchkv_store::StoreError;

/// Errors produced while polling.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The source could not be sampled.
    #[error("source error: {0}")]
    Source(String),

    /// Writing a sampled value into the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The configured interval is unusable.
    #[error("invalid poll interval: {0}ms")]
    InvalidInterval(u64),
}

/// Convenience alias used throughout the poller crate.
pub type PollResult<T> = std::result::Result<T, PollError>;

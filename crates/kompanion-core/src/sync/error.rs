//! # Kompanion Sync Errors
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Timestamp {0} is out of range.")]
    InvalidTimestamp(i64),

    #[error("Percentage {0} must be a finite value between 0 and 1.")]
    InvalidPercentage(f64),
}

/// Shorthand for results of sync operations
pub type SyncResult<T> = Result<T, SyncError>;

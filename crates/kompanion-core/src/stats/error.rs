//! # Kompanion Stats Errors
use thiserror::Error;

use crate::library::error::LibraryError;
use crate::sync::error::SyncError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Unknown activity period '{0}' (expected 'day', 'month' or 'year')")]
    InvalidPeriod(String),

    #[error("Progress lookup failed: {0}")]
    Sync(#[from] SyncError),

    #[error("Book lookup failed: {0}")]
    Library(#[from] LibraryError),
}

/// Shorthand for results of stats operations
pub type StatsResult<T> = Result<T, StatsError>;

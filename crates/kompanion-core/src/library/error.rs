//! # Kompanion Library Errors
use thiserror::Error;
use uuid::Uuid;

use crate::storage::error::StorageSystemError;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Book with ID '{0}' not found.")]
    BookNotFound(Uuid),

    #[error("Book with document ID '{0}' already exists.")]
    BookAlreadyExists(String),

    #[error("Failed to parse metadata of '{filename}': {reason}")]
    Metadata { filename: String, reason: String },

    #[error("Book storage error: {0}")]
    Storage(#[from] StorageSystemError),
}

/// Shorthand for results of library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

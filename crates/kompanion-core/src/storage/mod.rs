//! # Kompanion Book Storage
//!
//! Book files are kept behind the [`BookStorage`] trait so the library does
//! not care where bytes live. Two backends ship with the crate:
//!
//! - [`LocalBookStorage`]: files under a base directory, laid out as
//!   `<user_id>/<book_id>/<filename>`.
//! - [`InMemoryBookStorage`]: a process-local map, used for tests and
//!   ephemeral deployments.
//!
//! [`StorageManager`] wraps the configured backend as a kernel component.
pub mod error;
pub mod local;
pub mod manager;
pub mod memory;
pub mod provider;

pub use error::StorageSystemError;
pub use local::LocalBookStorage;
pub use manager::{StorageManager, open_book_storage};
pub use memory::InMemoryBookStorage;
pub use provider::{BookStorage, StorageResult};

/// Name used when sanitizing leaves nothing behind.
pub const UNTITLED_FILENAME: &str = "untitled";

/// Strip a client-supplied filename down to `[A-Za-z0-9._-]`.
///
/// Path separators and other special characters are dropped, so the result
/// is always a single path component.
pub fn sanitize_filename(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let safe = safe.trim();
    // "." and ".." would still resolve to a directory.
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        UNTITLED_FILENAME.to_string()
    } else {
        safe.to_string()
    }
}

#[cfg(test)]
mod tests;

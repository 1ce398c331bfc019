use std::fmt::Debug;

use uuid::Uuid;

use crate::storage::error::StorageSystemError;

/// Shorthand for results of storage operations
pub type StorageResult<T> = Result<T, StorageSystemError>;

/// Trait for backends that hold book files
pub trait BookStorage: Send + Sync + Debug {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Prepare the backend for use (create directories, check access).
    fn ensure_ready(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Store a book file and return the identifier to retrieve it with.
    ///
    /// `filename` is client-supplied and is sanitized before use.
    fn store_book_file(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        file_data: &[u8],
        filename: &str,
    ) -> StorageResult<String>;

    /// Read a book file back by the identifier `store_book_file` returned.
    fn retrieve_book_file(&self, stored_path: &str) -> StorageResult<Vec<u8>>;

    /// Delete a book file. Deleting a missing file succeeds.
    fn delete_book_file(&self, stored_path: &str) -> StorageResult<()>;

    /// URI-like identifier for a book file. Does not check existence.
    fn get_book_uri(&self, user_id: Uuid, book_id: Uuid, filename: &str) -> String;
}

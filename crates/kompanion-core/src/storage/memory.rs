use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::storage::error::StorageSystemError;
use crate::storage::provider::{BookStorage, StorageResult};
use crate::storage::sanitize_filename;

/// Book storage kept entirely in process memory.
///
/// The stored identifier is the `memory:///` URI of the file.
#[derive(Debug, Default)]
pub struct InMemoryBookStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBookStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently held
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BookStorage for InMemoryBookStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn store_book_file(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        file_data: &[u8],
        filename: &str,
    ) -> StorageResult<String> {
        let uri = self.get_book_uri(user_id, book_id, filename);
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.clone(), file_data.to_vec());
        Ok(uri)
    }

    fn retrieve_book_file(&self, stored_path: &str) -> StorageResult<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(stored_path)
            .cloned()
            .ok_or_else(|| StorageSystemError::FileNotFound(stored_path.to_string()))
    }

    fn delete_book_file(&self, stored_path: &str) -> StorageResult<()> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(stored_path);
        Ok(())
    }

    fn get_book_uri(&self, user_id: Uuid, book_id: Uuid, filename: &str) -> String {
        format!("memory:///{}/{}/{}", user_id, book_id, sanitize_filename(filename))
    }
}

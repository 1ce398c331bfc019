use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::storage::error::StorageSystemError;
use crate::storage::provider::{BookStorage, StorageResult};
use crate::storage::sanitize_filename;

/// Local filesystem book storage
#[derive(Clone)]
pub struct LocalBookStorage {
    base_path: PathBuf,
}

impl LocalBookStorage {
    /// Create a new local storage rooted at the given base path
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Relative identifier for a book file, always `/`-separated.
    fn relative_path(user_id: Uuid, book_id: Uuid, filename: &str) -> String {
        format!("{}/{}/{}", user_id, book_id, sanitize_filename(filename))
    }

    /// Resolve a stored identifier against the base path.
    ///
    /// Only plain relative components are accepted so an identifier can
    /// never point outside the base directory.
    fn resolve_stored_path(&self, stored_path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(stored_path);
        let mut components = relative.components().peekable();
        if components.peek().is_none() {
            return Err(StorageSystemError::InvalidPath {
                path: relative.to_path_buf(),
                reason: "empty stored path".to_string(),
            });
        }
        if components.any(|c| !matches!(c, Component::Normal(_))) {
            return Err(StorageSystemError::InvalidPath {
                path: relative.to_path_buf(),
                reason: "stored path must stay inside the storage directory".to_string(),
            });
        }
        Ok(self.base_path.join(relative))
    }

    fn is_empty_dir(dir: &Path) -> StorageResult<bool> {
        let mut entries = fs::read_dir(dir)
            .map_err(|e| StorageSystemError::io(e, "read_dir", dir.to_path_buf()))?;
        Ok(entries.next().is_none())
    }

    /// Remove `dir` if it is empty and is not the base directory itself.
    fn prune_dir(&self, dir: &Path) -> StorageResult<()> {
        if dir == self.base_path || !dir.is_dir() || !Self::is_empty_dir(dir)? {
            return Ok(());
        }
        fs::remove_dir(dir).map_err(|e| StorageSystemError::io(e, "remove_dir", dir.to_path_buf()))
    }
}

impl BookStorage for LocalBookStorage {
    fn name(&self) -> &str {
        "local"
    }

    fn ensure_ready(&self) -> StorageResult<()> {
        if self.base_path.exists() && !self.base_path.is_dir() {
            return Err(StorageSystemError::InvalidPath {
                path: self.base_path.clone(),
                reason: "exists but is not a directory".to_string(),
            });
        }
        fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageSystemError::io(e, "create_dir_all", self.base_path.clone()))
    }

    fn store_book_file(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        file_data: &[u8],
        filename: &str,
    ) -> StorageResult<String> {
        let relative = Self::relative_path(user_id, book_id, filename);
        let full_path = self.base_path.join(&relative);
        let parent = full_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_path.clone());

        fs::create_dir_all(&parent)
            .map_err(|e| StorageSystemError::io(e, "create_dir_all", parent.clone()))?;

        // Write to a temp file in the target directory, then swap it in.
        let mut temp_file = NamedTempFile::new_in(&parent)
            .map_err(|e| StorageSystemError::io(e, "create_temp_file", parent.clone()))?;
        temp_file
            .write_all(file_data)
            .map_err(|e| StorageSystemError::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(&full_path)
            .map_err(|e| StorageSystemError::io(e.error, "persist_temp_file", full_path.clone()))?;

        log::debug!("Stored book file {} ({} bytes)", full_path.display(), file_data.len());
        Ok(relative)
    }

    fn retrieve_book_file(&self, stored_path: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.resolve_stored_path(stored_path)?;
        if !full_path.is_file() {
            return Err(StorageSystemError::FileNotFound(full_path.display().to_string()));
        }
        fs::read(&full_path).map_err(|e| StorageSystemError::io(e, "read", full_path))
    }

    fn delete_book_file(&self, stored_path: &str) -> StorageResult<()> {
        let full_path = self.resolve_stored_path(stored_path)?;
        if !full_path.is_file() {
            return Ok(());
        }
        fs::remove_file(&full_path)
            .map_err(|e| StorageSystemError::io(e, "remove_file", full_path.clone()))?;

        // Clean up the book directory, then the user directory.
        if let Some(book_dir) = full_path.parent() {
            self.prune_dir(book_dir)?;
            if let Some(user_dir) = book_dir.parent() {
                self.prune_dir(user_dir)?;
            }
        }
        Ok(())
    }

    fn get_book_uri(&self, user_id: Uuid, book_id: Uuid, filename: &str) -> String {
        format!("filesystem:///{}", Self::relative_path(user_id, book_id, filename))
    }
}

impl fmt::Debug for LocalBookStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBookStorage")
            .field("base_path", &self.base_path)
            .finish()
    }
}

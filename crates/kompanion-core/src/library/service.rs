use std::path::Path;
use std::sync::Arc;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::library::error::{LibraryError, LibraryResult};
use crate::library::metadata::MetadataParser;
use crate::library::repository::BookRepository;
use crate::models::Book;
use crate::storage::error::StorageSystemError;
use crate::storage::provider::BookStorage;

/// Title given to books whose metadata has none.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Page size used when a caller passes one below 1.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Library operations over a book repository and a storage backend.
#[derive(Debug, Clone)]
pub struct LibraryService {
    repository: Arc<dyn BookRepository>,
    storage: Arc<dyn BookStorage>,
    metadata_parser: Arc<dyn MetadataParser>,
}

impl LibraryService {
    pub fn new(
        repository: Arc<dyn BookRepository>,
        storage: Arc<dyn BookStorage>,
        metadata_parser: Arc<dyn MetadataParser>,
    ) -> Self {
        Self {
            repository,
            storage,
            metadata_parser,
        }
    }

    /// Parse, store and register an uploaded book.
    ///
    /// The document id comes from the file's metadata when present and is
    /// otherwise the MD5 of the contents, so re-uploading the same file is
    /// rejected with `BookAlreadyExists`.
    pub async fn add_book(
        &self,
        file_data: &[u8],
        filename: &str,
        owner_user_id: Uuid,
    ) -> LibraryResult<Book> {
        let metadata = self.metadata_parser.parse(file_data, filename)?;

        let document_id = metadata
            .document_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("{:x}", Md5::digest(file_data)));
        if self.repository.get_book_by_document_id(&document_id).await?.is_some() {
            return Err(LibraryError::BookAlreadyExists(document_id));
        }

        let book_id = Uuid::new_v4();
        let stored_path = self
            .storage
            .store_book_file(owner_user_id, book_id, file_data, filename)?;

        let mut book = Book::new(
            metadata.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            document_id,
            stored_path.clone(),
        );
        book.id = book_id;
        book.author = metadata.author;
        book.format = Self::format_of(&book, filename);

        match self.repository.create_book(book).await {
            Ok(book) => {
                log::info!("Added book '{}' ({})", book.title, book.id);
                Ok(book)
            }
            Err(err) => {
                if let Err(cleanup) = self.storage.delete_book_file(&stored_path) {
                    log::warn!("Failed to remove orphaned book file '{}': {}", stored_path, cleanup);
                }
                Err(err)
            }
        }
    }

    pub async fn get_book_details(&self, book_id: Uuid) -> LibraryResult<Option<Book>> {
        self.repository.get_book_by_id(book_id).await
    }

    /// One page of the library, 1-based, plus the total count.
    pub async fn list_all_books(&self, page: i64, page_size: i64) -> LibraryResult<(Vec<Book>, usize)> {
        let page = page.max(1);
        let page_size = if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size };
        let offset = (page - 1).saturating_mul(page_size);
        self.repository.list_books(offset, page_size).await
    }

    /// File contents and the name to offer the client.
    pub async fn download_book_file(&self, book_id: Uuid) -> LibraryResult<(Vec<u8>, String)> {
        let book = self
            .repository
            .get_book_by_id(book_id)
            .await?
            .ok_or(LibraryError::BookNotFound(book_id))?;

        match self.storage.retrieve_book_file(&book.file_path) {
            Ok(data) => Ok((data, book.effective_filename())),
            Err(StorageSystemError::FileNotFound(path)) => {
                log::warn!("Book {} is registered but its file '{}' is missing", book_id, path);
                Err(LibraryError::BookNotFound(book_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a book record. A failure to delete the file is logged only.
    pub async fn delete_book(&self, book_id: Uuid) -> LibraryResult<()> {
        let book = self
            .repository
            .get_book_by_id(book_id)
            .await?
            .ok_or(LibraryError::BookNotFound(book_id))?;

        if let Err(err) = self.storage.delete_book_file(&book.file_path) {
            log::error!(
                "Error deleting file '{}' of book {} from storage: {}",
                book.file_path,
                book_id,
                err
            );
        }
        self.repository.delete_book(book_id).await?;
        log::info!("Deleted book '{}' ({})", book.title, book_id);
        Ok(())
    }

    /// Format from the stored extension, falling back to the upload's.
    fn format_of(book: &Book, filename: &str) -> Option<String> {
        let extension = book.extension();
        let format = extension.trim_start_matches('.');
        if !format.is_empty() {
            return Some(format.to_string());
        }
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
    }
}

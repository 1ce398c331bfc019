use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::library::error::{LibraryError, LibraryResult};
use crate::models::Book;

/// Page size used when a caller passes a non-positive limit.
const DEFAULT_LIMIT: usize = 20;

/// Persistence interface for book records
#[async_trait]
pub trait BookRepository: Send + Sync + Debug {
    /// Fails with `BookAlreadyExists` on a duplicate id or document id.
    async fn create_book(&self, book: Book) -> LibraryResult<Book>;
    async fn get_book_by_id(&self, book_id: Uuid) -> LibraryResult<Option<Book>>;
    async fn get_book_by_document_id(&self, document_id: &str) -> LibraryResult<Option<Book>>;
    /// One page in insertion order, plus the total number of books.
    async fn list_books(&self, offset: i64, limit: i64) -> LibraryResult<(Vec<Book>, usize)>;
    async fn update_book(&self, book: Book) -> LibraryResult<Book>;
    async fn delete_book(&self, book_id: Uuid) -> LibraryResult<()>;
}

#[derive(Debug, Default)]
struct BookStore {
    books: HashMap<Uuid, Book>,
    books_by_document_id: HashMap<String, Uuid>,
    order: Vec<Uuid>,
}

/// [`BookRepository`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    store: RwLock<BookStore>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All books in insertion order.
    pub async fn snapshot(&self) -> Vec<Book> {
        let store = self.store.read().await;
        store
            .order
            .iter()
            .filter_map(|id| store.books.get(id))
            .cloned()
            .collect()
    }

    /// Replace the contents, keeping the given order.
    pub async fn restore(&self, books: Vec<Book>) {
        let mut store = self.store.write().await;
        *store = BookStore::default();
        for book in books {
            store.books_by_document_id.insert(book.document_id.clone(), book.id);
            store.order.push(book.id);
            store.books.insert(book.id, book);
        }
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create_book(&self, book: Book) -> LibraryResult<Book> {
        let mut store = self.store.write().await;
        if store.books.contains_key(&book.id)
            || store.books_by_document_id.contains_key(&book.document_id)
        {
            return Err(LibraryError::BookAlreadyExists(book.document_id));
        }
        store.books_by_document_id.insert(book.document_id.clone(), book.id);
        store.order.push(book.id);
        store.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_book_by_id(&self, book_id: Uuid) -> LibraryResult<Option<Book>> {
        Ok(self.store.read().await.books.get(&book_id).cloned())
    }

    async fn get_book_by_document_id(&self, document_id: &str) -> LibraryResult<Option<Book>> {
        let store = self.store.read().await;
        Ok(store
            .books_by_document_id
            .get(document_id)
            .and_then(|id| store.books.get(id))
            .cloned())
    }

    async fn list_books(&self, offset: i64, limit: i64) -> LibraryResult<(Vec<Book>, usize)> {
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = match usize::try_from(limit) {
            Ok(0) | Err(_) => DEFAULT_LIMIT,
            Ok(limit) => limit,
        };

        let store = self.store.read().await;
        let page = store
            .order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| store.books.get(id))
            .cloned()
            .collect();
        Ok((page, store.order.len()))
    }

    async fn update_book(&self, mut book: Book) -> LibraryResult<Book> {
        let mut store = self.store.write().await;
        let previous_document_id = match store.books.get(&book.id) {
            Some(existing) => existing.document_id.clone(),
            None => return Err(LibraryError::BookNotFound(book.id)),
        };

        if previous_document_id != book.document_id {
            if let Some(owner) = store.books_by_document_id.get(&book.document_id) {
                if *owner != book.id {
                    return Err(LibraryError::BookAlreadyExists(book.document_id));
                }
            }
            store.books_by_document_id.remove(&previous_document_id);
            store.books_by_document_id.insert(book.document_id.clone(), book.id);
        }

        book.updated_at = Utc::now();
        store.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn delete_book(&self, book_id: Uuid) -> LibraryResult<()> {
        let mut store = self.store.write().await;
        let book = store
            .books
            .remove(&book_id)
            .ok_or(LibraryError::BookNotFound(book_id))?;
        store.books_by_document_id.remove(&book.document_id);
        store.order.retain(|id| *id != book_id);
        Ok(())
    }
}

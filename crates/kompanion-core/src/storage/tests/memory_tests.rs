use uuid::Uuid;

use crate::storage::error::StorageSystemError;
use crate::storage::memory::InMemoryBookStorage;
use crate::storage::provider::BookStorage;

#[test]
fn test_memory_store_uses_uri_as_identifier() {
    let storage = InMemoryBookStorage::new();
    let (user_id, book_id) = (Uuid::new_v4(), Uuid::new_v4());

    let stored = storage
        .store_book_file(user_id, book_id, b"data", "book.epub")
        .expect("store");
    assert_eq!(stored, storage.get_book_uri(user_id, book_id, "book.epub"));
    assert!(stored.starts_with("memory:///"));
    assert_eq!(storage.len(), 1);
    assert_eq!(storage.retrieve_book_file(&stored).expect("retrieve"), b"data");
}

#[test]
fn test_memory_delete_is_idempotent() {
    let storage = InMemoryBookStorage::new();
    let stored = storage
        .store_book_file(Uuid::new_v4(), Uuid::new_v4(), b"data", "book.epub")
        .expect("store");

    storage.delete_book_file(&stored).expect("delete");
    storage.delete_book_file(&stored).expect("delete again");
    assert!(storage.is_empty());
    assert!(matches!(
        storage.retrieve_book_file(&stored),
        Err(StorageSystemError::FileNotFound(_))
    ));
}

use std::fs;

use tempfile::tempdir;
use uuid::Uuid;

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalBookStorage;
use crate::storage::provider::BookStorage;

#[test]
fn test_store_and_retrieve() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalBookStorage::new(temp_dir.path());
    let (user_id, book_id) = (Uuid::new_v4(), Uuid::new_v4());

    let stored = storage.store_book_file(user_id, book_id, b"epub bytes", "My Book.epub")?;
    assert_eq!(stored, format!("{}/{}/MyBook.epub", user_id, book_id));
    assert!(temp_dir.path().join(&stored).is_file());

    let data = storage.retrieve_book_file(&stored)?;
    assert_eq!(data, b"epub bytes");
    Ok(())
}

#[test]
fn test_store_overwrites_existing_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalBookStorage::new(temp_dir.path());
    let (user_id, book_id) = (Uuid::new_v4(), Uuid::new_v4());

    storage.store_book_file(user_id, book_id, b"first", "a.txt")?;
    let stored = storage.store_book_file(user_id, book_id, b"second", "a.txt")?;
    assert_eq!(storage.retrieve_book_file(&stored)?, b"second");
    Ok(())
}

#[test]
fn test_retrieve_missing_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalBookStorage::new(temp_dir.path());
    let result = storage.retrieve_book_file("nobody/nothing/missing.epub");
    assert!(matches!(result, Err(StorageSystemError::FileNotFound(_))));
}

#[test]
fn test_rejects_escaping_paths() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalBookStorage::new(temp_dir.path().join("base"));

    for bad in ["../outside.txt", "/etc/passwd", "a/../../b", ""] {
        assert!(
            matches!(storage.retrieve_book_file(bad), Err(StorageSystemError::InvalidPath { .. })),
            "'{}' should be rejected",
            bad
        );
        assert!(matches!(storage.delete_book_file(bad), Err(StorageSystemError::InvalidPath { .. })));
    }
}

#[test]
fn test_delete_prunes_empty_directories() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalBookStorage::new(temp_dir.path());
    let user_id = Uuid::new_v4();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

    let first_path = storage.store_book_file(user_id, first, b"1", "one.epub")?;
    let second_path = storage.store_book_file(user_id, second, b"2", "two.epub")?;

    storage.delete_book_file(&first_path)?;
    let user_dir = temp_dir.path().join(user_id.to_string());
    assert!(!user_dir.join(first.to_string()).exists());
    assert!(user_dir.is_dir(), "user dir still holds another book");

    storage.delete_book_file(&second_path)?;
    assert!(!user_dir.exists());
    assert!(temp_dir.path().is_dir(), "base directory is never removed");

    // Deleting again is a no-op
    storage.delete_book_file(&second_path)?;
    Ok(())
}

#[test]
fn test_ensure_ready_creates_base() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let base = temp_dir.path().join("nested").join("books");
    let storage = LocalBookStorage::new(&base);
    storage.ensure_ready()?;
    assert!(base.is_dir());
    Ok(())
}

#[test]
fn test_ensure_ready_rejects_file_base() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let base = temp_dir.path().join("not-a-dir");
    fs::write(&base, b"x").expect("write file");
    let storage = LocalBookStorage::new(&base);
    assert!(matches!(storage.ensure_ready(), Err(StorageSystemError::InvalidPath { .. })));
}

#[test]
fn test_book_uri() {
    let storage = LocalBookStorage::new("/srv/books");
    let (user_id, book_id) = (Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(
        storage.get_book_uri(user_id, book_id, "a b.pdf"),
        format!("filesystem:///{}/{}/ab.pdf", user_id, book_id)
    );
}

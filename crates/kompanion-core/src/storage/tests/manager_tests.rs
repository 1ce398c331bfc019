use tempfile::tempdir;

use crate::config::{BookStorageSettings, StorageKind};
use crate::kernel::component::KernelComponent;
use crate::kernel::error::Error;
use crate::storage::error::StorageSystemError;
use crate::storage::manager::{StorageManager, open_book_storage};

#[test]
fn test_open_book_storage_selects_backend() {
    let local = BookStorageSettings {
        kind: StorageKind::Local,
        path: "./books".into(),
    };
    assert_eq!(open_book_storage(&local).name(), "local");

    let memory = BookStorageSettings {
        kind: StorageKind::Memory,
        ..Default::default()
    };
    assert_eq!(open_book_storage(&memory).name(), "memory");
}

#[tokio::test]
async fn test_initialize_prepares_local_backend() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let base = temp_dir.path().join("books");
    let manager = StorageManager::from_settings(&BookStorageSettings {
        kind: StorageKind::Local,
        path: base.clone(),
    });

    assert_eq!(manager.name(), "StorageManager");
    manager.initialize().await.expect("initialize");
    assert!(base.is_dir());
}

#[tokio::test]
async fn test_initialize_reports_bad_base() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let base = temp_dir.path().join("file");
    std::fs::write(&base, b"x").expect("write file");
    let manager = StorageManager::from_settings(&BookStorageSettings {
        kind: StorageKind::Local,
        path: base,
    });

    let err = manager.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        Error::StorageSystem(StorageSystemError::InvalidPath { .. })
    ));
}

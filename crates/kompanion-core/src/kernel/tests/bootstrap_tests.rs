use std::path::Path;

use tempfile::tempdir;
use uuid::Uuid;

use crate::config::{Settings, StorageKind};
use crate::kernel::bootstrap::Application;
use crate::kernel::constants::STATE_FILE_NAME;
use crate::kernel::error::{Error, KernelLifecyclePhase};

// Settings rooted in a temporary directory, with a cheap bcrypt cost
fn test_settings(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.app.data_path = root.join("data");
    settings.book_storage.path = root.join("books");
    settings.auth.bcrypt_cost = 4;
    settings
}

#[tokio::test]
async fn test_new_does_not_touch_disk() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let app = Application::new(test_settings(temp_dir.path())).expect("Application::new failed");

    assert!(!app.is_initialized());
    assert_eq!(app.book_storage().name(), "local");
    assert!(!temp_dir.path().join("books").exists());
    assert!(!temp_dir.path().join("data").exists());
}

#[tokio::test]
async fn test_new_rejects_invalid_settings() {
    let mut settings = Settings::default();
    settings.auth.session_expires_in = 0;
    assert!(matches!(Application::new(settings), Err(Error::Config(_))));
}

#[tokio::test]
async fn test_lifecycle_persists_state() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let settings = test_settings(temp_dir.path());

    let mut app = Application::new(settings.clone()).unwrap();
    app.start().await.expect("start");
    assert!(app.is_initialized());
    assert!(temp_dir.path().join("books").is_dir());

    let user = app.auth().register_user("alice", "secret").await.unwrap();
    let book = app.library().add_book(b"contents", "Dune.epub", user.id).await.unwrap();
    app.progress()
        .submit_progress(user.id, book.id, 0.5, None, "kobo", None, 1_700_000_000)
        .await
        .unwrap();
    app.shutdown().await.expect("shutdown");
    assert!(!app.is_initialized());
    assert!(temp_dir.path().join("data").join(STATE_FILE_NAME).is_file());

    // A fresh instance sees everything again
    let mut app = Application::new(settings).unwrap();
    app.start().await.unwrap();
    let session = app.auth().login("alice", "secret", None, None).await.unwrap();
    assert_eq!(session.user_id, user.id);
    let (data, _) = app.library().download_book_file(book.id).await.unwrap();
    assert_eq!(data, b"contents");
    let progress = app.progress().get_document_progress(user.id, book.id).await.unwrap();
    assert_eq!(progress.map(|p| p.percentage), Some(0.5));
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_start_twice_fails() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let mut app = Application::new(test_settings(temp_dir.path())).unwrap();
    app.start().await.unwrap();

    match app.start().await {
        Err(Error::KernelLifecycleError { phase, .. }) => {
            assert_eq!(phase, KernelLifecyclePhase::RunPreCheck)
        }
        other => panic!("expected a lifecycle error, got {:?}", other),
    }
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_initialize_failure_names_component() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let mut settings = test_settings(temp_dir.path());
    std::fs::write(&settings.book_storage.path, b"not a directory").unwrap();
    settings.book_storage.kind = StorageKind::Local;

    let mut app = Application::new(settings).unwrap();
    match app.start().await {
        Err(Error::KernelLifecycleError { phase, component_name, .. }) => {
            assert_eq!(phase, KernelLifecyclePhase::Initialize);
            assert_eq!(component_name.as_deref(), Some("StorageManager"));
        }
        other => panic!("expected a lifecycle error, got {:?}", other),
    }
    assert!(!app.is_initialized());
}

#[tokio::test]
async fn test_persist_without_stopping() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let mut settings = test_settings(temp_dir.path());
    settings.book_storage.kind = StorageKind::Memory;

    let mut app = Application::new(settings).unwrap();
    app.start().await.unwrap();
    app.auth().register_user("bob", "pw").await.unwrap();
    app.persist().await.unwrap();

    let snapshot = app.state_manager().snapshot().await;
    assert_eq!(snapshot.users.users.len(), 1);
    assert!(app.state_manager().path().is_file());
    assert!(app.is_initialized());
    assert!(app.stats().get_user_reading_summary(Uuid::new_v4()).await.is_ok());
}

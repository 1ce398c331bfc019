use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::repository::{InMemoryUserRepository, UserRepository};
use crate::models::{Device, User};

#[tokio::test]
async fn test_create_and_lookup_user() {
    let repo = InMemoryUserRepository::new();
    let user = repo.create_user(User::new("alice", "hash")).await.expect("created");

    let by_name = repo.get_user_by_username("alice").await.unwrap();
    assert_eq!(by_name.as_ref(), Some(&user));
    let by_id = repo.get_user_by_id(user.id).await.unwrap();
    assert_eq!(by_id, Some(user));
    assert_eq!(repo.get_user_by_username("bob").await.unwrap(), None);
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let repo = InMemoryUserRepository::new();
    repo.create_user(User::new("alice", "h1")).await.unwrap();
    let err = repo.create_user(User::new("alice", "h2")).await.unwrap_err();
    assert!(matches!(err, AuthError::UserAlreadyExists(name) if name == "alice"));
}

#[tokio::test]
async fn test_device_lifecycle() {
    let repo = InMemoryUserRepository::new();
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    repo.create_device(Device::new("kobo", "k", Some(owner))).await.unwrap();
    repo.create_device(Device::new("kindle", "k", Some(owner))).await.unwrap();
    repo.create_device(Device::new("phone", "k", Some(other))).await.unwrap();

    let err = repo.create_device(Device::new("kobo", "x", Some(other))).await.unwrap_err();
    assert!(matches!(err, AuthError::DeviceAlreadyExists(_)));

    let names: Vec<String> = repo
        .list_devices_by_user_id(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["kindle".to_string(), "kobo".to_string()]);

    repo.delete_device_by_name("kobo").await.unwrap();
    assert_eq!(repo.get_device_by_name("kobo").await.unwrap(), None);
    // Deleting again is a no-op
    repo.delete_device_by_name("kobo").await.unwrap();
    // The name can be reused after deletion
    repo.create_device(Device::new("kobo", "k", Some(other))).await.unwrap();
}

#[tokio::test]
async fn test_snapshot_restore_rebuilds_indexes() {
    let source = InMemoryUserRepository::new();
    let user = source.create_user(User::new("alice", "hash")).await.unwrap();
    source.create_device(Device::new("kobo", "k", Some(user.id))).await.unwrap();

    let snapshot = source.snapshot().await;
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.devices.len(), 1);

    let target = InMemoryUserRepository::new();
    target.restore(snapshot).await;
    assert_eq!(target.get_user_by_username("alice").await.unwrap(), Some(user.clone()));
    assert!(target.get_device_by_name("kobo").await.unwrap().is_some());
    assert!(matches!(
        target.create_user(User::new("alice", "x")).await,
        Err(AuthError::UserAlreadyExists(_))
    ));
}

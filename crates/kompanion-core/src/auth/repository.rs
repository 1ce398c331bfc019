use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::error::{AuthError, AuthResult};
use crate::models::{Device, Session, User};

/// Persistence interface for users, sessions and devices.
///
/// Implementations hand out copies; callers never share state with the store.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Fails with `UserAlreadyExists` when the username is taken.
    async fn create_user(&self, user: User) -> AuthResult<User>;
    async fn get_user_by_username(&self, username: &str) -> AuthResult<Option<User>>;
    async fn get_user_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>>;

    async fn store_session(&self, session: Session) -> AuthResult<Session>;
    async fn get_session_by_key(&self, session_key: &str) -> AuthResult<Option<Session>>;
    /// Deleting an unknown session succeeds.
    async fn delete_session_by_key(&self, session_key: &str) -> AuthResult<()>;

    /// Fails with `DeviceAlreadyExists` when the name is taken.
    async fn create_device(&self, device: Device) -> AuthResult<Device>;
    async fn get_device_by_name(&self, name: &str) -> AuthResult<Option<Device>>;
    /// Deleting an unknown device succeeds.
    async fn delete_device_by_name(&self, name: &str) -> AuthResult<()>;
    async fn list_devices_by_user_id(&self, user_id: Uuid) -> AuthResult<Vec<Device>>;
}

/// Serializable copy of everything an [`InMemoryUserRepository`] holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSnapshot {
    pub users: Vec<User>,
    pub sessions: Vec<Session>,
    pub devices: Vec<Device>,
}

#[derive(Debug, Default)]
struct UserStore {
    users: HashMap<Uuid, User>,
    users_by_username: HashMap<String, Uuid>,
    sessions: HashMap<String, Session>,
    devices: HashMap<Uuid, Device>,
    devices_by_name: HashMap<String, Uuid>,
}

/// [`UserRepository`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: RwLock<UserStore>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the full contents, sorted for stable output.
    pub async fn snapshot(&self) -> UserSnapshot {
        let store = self.store.read().await;
        let mut users: Vec<User> = store.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        let mut sessions: Vec<Session> = store.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.session_key.cmp(&b.session_key)));
        let mut devices: Vec<Device> = store.devices.values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        UserSnapshot { users, sessions, devices }
    }

    /// Drop every session expired at `now`. Returns how many were removed.
    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> usize {
        let mut store = self.store.write().await;
        let before = store.sessions.len();
        store.sessions.retain(|_, session| !session.is_expired_at(now));
        before - store.sessions.len()
    }

    /// Replace the contents with a snapshot, rebuilding the indexes.
    pub async fn restore(&self, snapshot: UserSnapshot) {
        let mut store = self.store.write().await;
        *store = UserStore::default();
        for user in snapshot.users {
            store.users_by_username.insert(user.username.clone(), user.id);
            store.users.insert(user.id, user);
        }
        for session in snapshot.sessions {
            store.sessions.insert(session.session_key.clone(), session);
        }
        for device in snapshot.devices {
            store.devices_by_name.insert(device.name.clone(), device.id);
            store.devices.insert(device.id, device);
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: User) -> AuthResult<User> {
        let mut store = self.store.write().await;
        if store.users_by_username.contains_key(&user.username) {
            return Err(AuthError::UserAlreadyExists(user.username));
        }
        store.users_by_username.insert(user.username.clone(), user.id);
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users_by_username
            .get(username)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.store.read().await.users.get(&user_id).cloned())
    }

    async fn store_session(&self, session: Session) -> AuthResult<Session> {
        let mut store = self.store.write().await;
        store.sessions.insert(session.session_key.clone(), session.clone());
        Ok(session)
    }

    async fn get_session_by_key(&self, session_key: &str) -> AuthResult<Option<Session>> {
        Ok(self.store.read().await.sessions.get(session_key).cloned())
    }

    async fn delete_session_by_key(&self, session_key: &str) -> AuthResult<()> {
        self.store.write().await.sessions.remove(session_key);
        Ok(())
    }

    async fn create_device(&self, device: Device) -> AuthResult<Device> {
        let mut store = self.store.write().await;
        if store.devices_by_name.contains_key(&device.name) {
            return Err(AuthError::DeviceAlreadyExists(device.name));
        }
        store.devices_by_name.insert(device.name.clone(), device.id);
        store.devices.insert(device.id, device.clone());
        Ok(device)
    }

    async fn get_device_by_name(&self, name: &str) -> AuthResult<Option<Device>> {
        let store = self.store.read().await;
        Ok(store
            .devices_by_name
            .get(name)
            .and_then(|id| store.devices.get(id))
            .cloned())
    }

    async fn delete_device_by_name(&self, name: &str) -> AuthResult<()> {
        let mut store = self.store.write().await;
        if let Some(device_id) = store.devices_by_name.remove(name) {
            store.devices.remove(&device_id);
        }
        Ok(())
    }

    async fn list_devices_by_user_id(&self, user_id: Uuid) -> AuthResult<Vec<Device>> {
        let store = self.store.read().await;
        let mut devices: Vec<Device> = store
            .devices
            .values()
            .filter(|device| device.user_id == Some(user_id))
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }
}

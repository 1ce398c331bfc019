use std::sync::Arc;

use chrono::{Duration, Utc};
use md5::{Digest, Md5};
use uuid::Uuid;

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::repository::UserRepository;
use crate::config::AuthSettings;
use crate::models::{Device, Session, User};

/// Upper bound on session lifetime (about a century).
const MAX_SESSION_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Account, session and device operations.
#[derive(Debug, Clone)]
pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository>, settings: AuthSettings) -> Self {
        Self { repository, settings }
    }

    /// bcrypt-hash an account password with the configured cost.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        bcrypt::hash(password, self.settings.bcrypt_cost)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Check a password against a bcrypt hash. Malformed hashes never match.
    pub fn verify_password(plain_password: &str, hashed_password: &str) -> bool {
        bcrypt::verify(plain_password, hashed_password).unwrap_or(false)
    }

    /// Lowercase hex MD5, the key format KOReader uses for sync auth.
    pub fn hash_koreader_sync_password(password: &str) -> String {
        format!("{:x}", Md5::digest(password.as_bytes()))
    }

    pub async fn register_user(&self, username: &str, password: &str) -> AuthResult<User> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidInput("username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty".to_string()));
        }
        if self.repository.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UserAlreadyExists(username.to_string()));
        }

        let user = User::new(username, self.hash_password(password)?);
        let user = self.repository.create_user(user).await?;
        log::info!("Registered user '{}'", user.username);
        Ok(user)
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        user_agent: Option<&str>,
        client_ip: Option<&str>,
    ) -> AuthResult<Session> {
        let user = match self.repository.get_user_by_username(username).await? {
            Some(user) if Self::verify_password(password, &user.hashed_password) => user,
            _ => {
                log::warn!("Failed login attempt for '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        let lifetime = self.settings.session_expires_in.min(MAX_SESSION_SECONDS);
        let expires_at = now + Duration::seconds(lifetime as i64);
        let session = Session {
            id: Uuid::new_v4(),
            session_key: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            user_agent: user_agent.map(str::to_string),
            client_ip: client_ip.map(str::to_string),
            created_at: now,
            expires_at,
        };
        self.repository.store_session(session).await
    }

    pub async fn logout(&self, session_key: &str) -> AuthResult<()> {
        self.repository.delete_session_by_key(session_key).await
    }

    /// Resolve a session key to its user. Expired sessions are removed.
    pub async fn get_user_from_session(&self, session_key: &str) -> AuthResult<User> {
        let session = self
            .repository
            .get_session_by_key(session_key)
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        if session.is_expired_at(Utc::now()) {
            self.repository.delete_session_by_key(session_key).await?;
            return Err(AuthError::SessionNotFound);
        }
        self.repository
            .get_user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)
    }

    pub async fn add_user_device(
        &self,
        user_id: Uuid,
        device_name: &str,
        device_password: &str,
    ) -> AuthResult<Device> {
        if self.repository.get_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::UserNotFound(user_id));
        }
        if device_name.trim().is_empty() {
            return Err(AuthError::InvalidInput("device name must not be empty".to_string()));
        }
        if self.repository.get_device_by_name(device_name).await?.is_some() {
            return Err(AuthError::DeviceAlreadyExists(device_name.to_string()));
        }

        let device = Device::new(
            device_name,
            Self::hash_koreader_sync_password(device_password),
            Some(user_id),
        );
        self.repository.create_device(device).await
    }

    /// Remove a device owned by `user_id`. Another user's device is reported as missing.
    pub async fn deactivate_user_device(&self, device_name: &str, user_id: Uuid) -> AuthResult<()> {
        match self.repository.get_device_by_name(device_name).await? {
            Some(device) if device.user_id == Some(user_id) => {
                self.repository.delete_device_by_name(device_name).await
            }
            _ => Err(AuthError::DeviceNotFound(device_name.to_string())),
        }
    }

    /// Check a device credential. With `is_hash` the password is already the MD5 key.
    pub async fn verify_device_password(
        &self,
        device_name: &str,
        password: &str,
        is_hash: bool,
    ) -> AuthResult<bool> {
        let device = self
            .repository
            .get_device_by_name(device_name)
            .await?
            .ok_or_else(|| AuthError::DeviceNotFound(device_name.to_string()))?;
        if is_hash {
            Ok(device.hashed_password == password)
        } else {
            Ok(device.hashed_password == Self::hash_koreader_sync_password(password))
        }
    }

    pub async fn list_user_devices(&self, user_id: Uuid) -> AuthResult<Vec<Device>> {
        self.repository.list_devices_by_user_id(user_id).await
    }
}

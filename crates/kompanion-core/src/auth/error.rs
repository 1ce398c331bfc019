//! # Kompanion Auth Errors
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User '{0}' already exists.")]
    UserAlreadyExists(String),

    #[error("User '{0}' not found.")]
    UserNotFound(Uuid),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Session not found or invalid.")]
    SessionNotFound,

    #[error("Device '{0}' not found.")]
    DeviceNotFound(String),

    #[error("Device '{0}' already exists.")]
    DeviceAlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Shorthand for results of auth operations
pub type AuthResult<T> = Result<T, AuthError>;

//! # Kompanion Auth
//!
//! Accounts, login sessions and KOReader device credentials.
//!
//! Account passwords are bcrypt-hashed. Device passwords are stored as the
//! lowercase hex MD5 digest because that is what the KOReader sync plugin
//! sends in its `x-auth-key` header.
pub mod error;
pub mod repository;
pub mod service;

pub use error::{AuthError, AuthResult};
pub use repository::{InMemoryUserRepository, UserRepository, UserSnapshot};
pub use service::AuthService;

#[cfg(test)]
mod tests;

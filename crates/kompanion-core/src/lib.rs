//! # Kompanion Core
//!
//! Domain logic for Kompanion, a companion server for the KOReader e-book
//! reader: user accounts and device credentials, a book library backed by
//! pluggable file storage, reading-progress sync and reading statistics.
//!
//! The [`kernel::Application`] assembles everything from a [`config::Settings`]
//! value and drives the component lifecycle.
pub mod auth;
pub mod config;
pub mod kernel;
pub mod library;
pub mod models;
pub mod stats;
pub mod storage;
pub mod sync;

pub use kernel::Application;
pub use kernel::error::{Error, Result};
pub use config::Settings;
pub use models::{Book, Device, Progress, Session, User};
pub use storage::BookStorage;

//! # Kompanion Kernel Errors
//!
//! Defines the crate-wide [`Error`] type. Every subsystem error converts into
//! it through `#[from]`, so services and the binary can propagate failures
//! with `?` while keeping the typed cause available for matching.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::auth::error::AuthError;
use crate::config::error::ConfigError;
use crate::library::error::LibraryError;
use crate::stats::error::StatsError;
use crate::storage::error::StorageSystemError;
use crate::sync::error::SyncError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Stats error: {0}")]
    Stats(#[from] StatsError),

    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The persisted repository snapshot could not be read or written.
    #[error("State snapshot error for '{path}': {message}")]
    StateSnapshot { path: PathBuf, message: String },

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("{0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Initialize")]
    Initialize,
    #[error("Start")]
    Start,
    #[error("RunPreCheck")]
    RunPreCheck,
    #[error("Shutdown")]
    Shutdown,
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// I/O failure on `path`, reported as a storage error.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }
}

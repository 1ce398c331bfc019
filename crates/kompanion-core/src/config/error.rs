//! # Kompanion Configuration Errors
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format for path: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Serialization to '{format}' failed: {message}")]
    Serialization { format: &'static str, message: String },

    #[error("Deserialization from '{format}' failed: {message}")]
    Deserialization { format: &'static str, message: String },

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported book storage type '{0}' (expected 'local' or 'memory')")]
    UnsupportedStorage(String),
}

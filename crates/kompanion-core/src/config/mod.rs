//! # Kompanion Configuration
//!
//! Settings are layered: built-in defaults, then an optional configuration
//! file (JSON, YAML or TOML, picked by extension), then `KOMPANION_*`
//! environment variables. [`Settings::load`] runs all three layers and
//! validates the result.
pub mod error;
pub mod format;
pub mod settings;

pub use error::ConfigError;
pub use format::{ConfigData, ConfigFormat};
pub use settings::{
    AppSettings, AuthSettings, BookStorageSettings, LogFormat, LogLevel, LogSettings, Settings,
    StorageKind,
};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::format::{ConfigData, ConfigFormat};

pub const ENV_APP_NAME: &str = "KOMPANION_APP_NAME";
pub const ENV_APP_ENV: &str = "KOMPANION_APP_ENV";
pub const ENV_APP_DATA_PATH: &str = "KOMPANION_APP_DATA_PATH";
pub const ENV_AUTH_SESSION_EXPIRES_IN: &str = "KOMPANION_AUTH_SESSION_EXPIRES_IN";
pub const ENV_AUTH_BCRYPT_COST: &str = "KOMPANION_AUTH_BCRYPT_COST";
pub const ENV_LOG_LEVEL: &str = "KOMPANION_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "KOMPANION_LOG_FORMAT";
pub const ENV_BOOK_STORAGE_TYPE: &str = "KOMPANION_BOOK_STORAGE_TYPE";
pub const ENV_BOOK_STORAGE_PATH: &str = "KOMPANION_BOOK_STORAGE_PATH";

/// bcrypt accepts costs in this range.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Complete application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: AppSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
    pub book_storage: BookStorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    /// Deployment environment label, e.g. "development" or "production".
    pub env: String,
    /// Directory holding the persisted repository state.
    pub data_path: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "Kompanion".to_string(),
            env: "development".to_string(),
            data_path: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Session lifetime in seconds.
    pub session_expires_in: u64,
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_expires_in: 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookStorageSettings {
    #[serde(rename = "type")]
    pub kind: StorageKind,
    /// Base directory for the `local` backend.
    pub path: PathBuf,
}

impl Default for BookStorageSettings {
    fn default() -> Self {
        Self {
            kind: StorageKind::Local,
            path: PathBuf::from("./books"),
        }
    }
}

/// Generates a string-backed settings enum with `FromStr`, `Display` and
/// serde support through its string form.
macro_rules! string_enum {
    ($name:ident, $err:expr, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err($err(other)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, ConfigError> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Which backend holds book files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageKind {
    #[default]
    Local,
    Memory,
}

string_enum!(StorageKind, |other: &str| ConfigError::UnsupportedStorage(other.to_string()), {
    Local => "local",
    Memory => "memory",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

string_enum!(LogLevel, |other: &str| invalid("log.level", other, "expected trace, debug, info, warn or error"), {
    Trace => "trace",
    Debug => "debug",
    Info => "info",
    Warn => "warn",
    Error => "error",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

string_enum!(LogFormat, |other: &str| invalid("log.format", other, "expected text or json"), {
    Text => "text",
    Json => "json",
});

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, &e.to_string()))
}

impl Settings {
    /// Load settings from defaults, an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ConfigData::deserialize(&content, format)?.into_typed()
    }

    /// Override fields from environment variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_APP_NAME) {
            self.app.name = value;
        }
        if let Some(value) = lookup(ENV_APP_ENV) {
            self.app.env = value;
        }
        if let Some(value) = lookup(ENV_APP_DATA_PATH) {
            self.app.data_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_AUTH_SESSION_EXPIRES_IN) {
            self.auth.session_expires_in = parse_number(ENV_AUTH_SESSION_EXPIRES_IN, &value)?;
        }
        if let Some(value) = lookup(ENV_AUTH_BCRYPT_COST) {
            self.auth.bcrypt_cost = parse_number(ENV_AUTH_BCRYPT_COST, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log.level = value.parse()?;
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log.format = value.parse()?;
        }
        if let Some(value) = lookup(ENV_BOOK_STORAGE_TYPE) {
            self.book_storage.kind = value.parse()?;
        }
        if let Some(value) = lookup(ENV_BOOK_STORAGE_PATH) {
            self.book_storage.path = PathBuf::from(value);
        }
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(invalid("app.name", &self.app.name, "must not be empty"));
        }
        if self.auth.session_expires_in == 0 {
            return Err(invalid("auth.session_expires_in", "0", "must be greater than zero"));
        }
        if !BCRYPT_COST_RANGE.contains(&self.auth.bcrypt_cost) {
            return Err(invalid(
                "auth.bcrypt_cost",
                &self.auth.bcrypt_cost.to_string(),
                "must be between 4 and 31",
            ));
        }
        if self.book_storage.kind == StorageKind::Local
            && self.book_storage.path.as_os_str().is_empty()
        {
            return Err(invalid("book_storage.path", "", "local storage needs a path"));
        }
        Ok(())
    }

    /// Render the settings in the given format.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        ConfigData::from_serializable(self)?.serialize(format)
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::error::ConfigError;

/// File formats a settings document can be read from or rendered to.
///
/// YAML and TOML sit behind the `yaml-config` and `toml-config` features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    #[cfg(feature = "yaml-config")]
    Yaml,
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Short name, also used as the canonical file extension.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.name()
    }

    /// Pick a format from a file's extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Parse a format name such as `json` or `yml`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// A settings document as a format-neutral tree of top-level keys.
///
/// Keys are kept sorted so rendered output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData {
    values: Map<String, Value>,
}

impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a serializable value. It must serialize to a map.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, ConfigError> {
        let as_json = |message: String| ConfigError::Serialization {
            format: "json",
            message,
        };
        match serde_json::to_value(value).map_err(|e| as_json(e.to_string()))? {
            Value::Object(values) => Ok(Self { values }),
            other => Err(as_json(format!("expected a map, found {}", other))),
        }
    }

    /// Convert into a typed value. Missing keys fall back to serde defaults.
    pub fn into_typed<T: for<'de> Deserialize<'de>>(self) -> Result<T, ConfigError> {
        serde_json::from_value(Value::Object(self.values)).map_err(|e| {
            ConfigError::Deserialization {
                format: "json",
                message: e.to_string(),
            }
        })
    }

    /// Look up a top-level key, if present and of type `T`.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let rendered = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self.values).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self.values).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self.values).map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| ConfigError::Serialization {
            format: format.name(),
            message,
        })
    }

    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed: Result<Map<String, Value>, String> = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| e.to_string()),
        };
        parsed
            .map(|values| Self { values })
            .map_err(|message| ConfigError::Deserialization {
                format: format.name(),
                message,
            })
    }
}

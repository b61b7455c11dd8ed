//! Tidings Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with defaults suitable for local runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Record normalization options
    pub normalizer: NormalizerConfig,

    /// Target search index
    pub index: IndexConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Normalizer
        if let Ok(value) = std::env::var("TIDINGS_DECODE_HTML") {
            self.normalizer.decode_html = parse_bool("TIDINGS_DECODE_HTML", &value)?;
        }
        if let Ok(value) = std::env::var("TIDINGS_INCLUDE_DERIVED") {
            self.normalizer.include_derived = parse_bool("TIDINGS_INCLUDE_DERIVED", &value)?;
        }

        // Index
        if let Ok(name) = std::env::var("TIDINGS_INDEX_NAME") {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "TIDINGS_INDEX_NAME".to_string(),
                    value: name,
                });
            }
            self.index.name = name;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(value) = std::env::var("LOG_JSON") {
            self.logging.json_format = parse_bool("LOG_JSON", &value)?;
        }

        Ok(())
    }
}

/// Record normalization options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Decode HTML entities in message text before extraction
    pub decode_html: bool,

    /// Write derived entity fields into documents
    pub include_derived: bool,
}

/// Search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Index name
    pub name: String,

    /// Document type the mapping is registered under
    pub doc_type: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: "messages".to_string(),
            doc_type: "message".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

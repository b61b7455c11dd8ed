//! Tidings Core - Domain enumerations, error types, and shared traits
//!
//! This crate defines the vocabulary shared by the normalizer crates:
//! - Common error types
//! - Message origin (`SourceType`) and producer (`ProviderType`) enumerations
//! - The user capability consumed by the document serializer
//! - Timestamp parsing and formatting

pub mod time;

pub use time::{format_timestamp, parse_date_optional_time};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for normalizer operations
#[derive(Error, Debug)]
pub enum TidingsError {
    #[error("Invalid record field '{field}' ({value}): {reason}")]
    InvalidRecord {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid message id: {0}")]
    InvalidId(String),

    #[error("Unknown {kind} name: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TidingsError>;

// ============================================================================
// Message Origin
// ============================================================================

/// Where a message came from
///
/// Names are matched exactly (upper case) when parsing raw records; an
/// unknown or missing name falls back to [`SourceType::DEFAULT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceType {
    /// Written by a user of this system
    #[default]
    User,
    /// Fetched from the Twitter API or its web front end
    Twitter,
    /// Bulk imported from a dump
    Import,
}

impl SourceType {
    /// Fallback member for absent or unrecognized names
    pub const DEFAULT: Self = Self::User;

    /// All members in declaration order
    pub const ALL: [Self; 3] = [Self::User, Self::Twitter, Self::Import];

    /// Get the member name as it appears in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Twitter => "TWITTER",
            Self::Import => "IMPORT",
        }
    }

    /// Parse a member name, falling back to [`SourceType::DEFAULT`]
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using {}", e, Self::DEFAULT);
            Self::DEFAULT
        })
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = TidingsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|member| member.as_str() == s)
            .ok_or_else(|| TidingsError::UnknownVariant {
                kind: "source type",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Message Producer
// ============================================================================

/// Which system produced a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderType {
    /// No specific producer known
    #[default]
    Generic,
    /// Scraped from a public web page
    Scraped,
    /// Pushed by a remote peer
    Remote,
    /// Loaded from an import file
    Import,
}

impl ProviderType {
    /// Fallback member for absent or unrecognized names
    pub const DEFAULT: Self = Self::Generic;

    /// All members in declaration order
    pub const ALL: [Self; 4] = [Self::Generic, Self::Scraped, Self::Remote, Self::Import];

    /// Get the member name as it appears in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::Scraped => "SCRAPED",
            Self::Remote => "REMOTE",
            Self::Import => "IMPORT",
        }
    }

    /// Parse a member name, falling back to [`ProviderType::DEFAULT`]
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using {}", e, Self::DEFAULT);
            Self::DEFAULT
        })
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = TidingsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|member| member.as_str() == s)
            .ok_or_else(|| TidingsError::UnknownVariant {
                kind: "provider type",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A user entity that can render itself as a nested document
///
/// The normalizer does not define the user schema; it only embeds whatever
/// object the capability produces under the `user` key.
pub trait UserDocument: Send + Sync {
    /// Render the user as a JSON value
    fn to_document(&self) -> Result<serde_json::Value>;
}

impl<T> UserDocument for T
where
    T: Serialize + Send + Sync,
{
    fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

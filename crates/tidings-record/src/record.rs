//! The canonical message record

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

use tidings_core::{ProviderType, Result, SourceType, TidingsError};
use tidings_extractor::{EntityExtractor, Enrichment};

use crate::builder::RecordBuilder;

/// A normalized message
///
/// Records are built once from a raw map and then only read. The derived
/// entity fields are computed from `text` during construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) source_type: SourceType,
    pub(crate) provider_type: ProviderType,
    pub(crate) provider_hash: Option<String>,
    pub(crate) screen_name: String,
    pub(crate) id_str: String,
    pub(crate) text: String,
    /// `link` as given, written back unchanged
    pub(crate) link: Option<String>,
    pub(crate) status_url: Option<Url>,
    pub(crate) retweet_count: u64,
    pub(crate) favourites_count: u64,
    pub(crate) images: Vec<String>,
    pub(crate) enrichment: Enrichment,
}

impl Record {
    /// Build a record from a raw map with the default builder
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        RecordBuilder::new().build(map)
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    pub fn provider_hash(&self) -> Option<&str> {
        self.provider_hash.as_deref()
    }

    pub fn screen_name(&self) -> &str {
        &self.screen_name
    }

    pub fn id_str(&self) -> &str {
        &self.id_str
    }

    /// Parse the message id as a 64-bit integer
    pub fn id(&self) -> Result<i64> {
        self.id_str
            .parse()
            .map_err(|_| TidingsError::InvalidId(self.id_str.clone()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The link exactly as supplied
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Status URL, absent only on a placeholder record
    pub fn status_url(&self) -> Option<&Url> {
        self.status_url.as_ref()
    }

    pub fn retweet_count(&self) -> u64 {
        self.retweet_count
    }

    pub fn favourites_count(&self) -> u64 {
        self.favourites_count
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// All fields derived from the text
    pub fn enrichment(&self) -> &Enrichment {
        &self.enrichment
    }

    pub fn links(&self) -> &[String] {
        &self.enrichment.links
    }

    pub fn hosts(&self) -> &[String] {
        &self.enrichment.hosts
    }

    pub fn mentions(&self) -> &[String] {
        &self.enrichment.mentions
    }

    pub fn hashtags(&self) -> &[String] {
        &self.enrichment.hashtags
    }
}

impl Default for Record {
    /// Placeholder record: current time, default enum members, empty
    /// strings and no status URL
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            source_type: SourceType::DEFAULT,
            provider_type: ProviderType::DEFAULT,
            provider_hash: None,
            screen_name: String::new(),
            id_str: String::new(),
            text: String::new(),
            link: None,
            status_url: None,
            retweet_count: 0,
            favourites_count: 0,
            images: Vec::new(),
            enrichment: EntityExtractor::shared().extract(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_record() {
        let record = Record::default();

        assert_eq!(record.source_type(), SourceType::User);
        assert_eq!(record.provider_type(), ProviderType::Generic);
        assert!(record.status_url().is_none());
        assert!(record.link().is_none());
        assert!(record.text().is_empty());
        assert!(record.images().is_empty());
        assert_eq!(record.enrichment(), &EntityExtractor::shared().extract(""));
        assert_eq!(record.enrichment(), &Enrichment::default());
    }

    #[test]
    fn test_id_parsing() {
        let record = Record {
            id_str: "569446296389763072".to_string(),
            ..Default::default()
        };
        assert_eq!(record.id().unwrap(), 569446296389763072);

        let record = Record {
            id_str: "abc".to_string(),
            ..Default::default()
        };
        assert!(matches!(record.id(), Err(TidingsError::InvalidId(id)) if id == "abc"));
    }
}

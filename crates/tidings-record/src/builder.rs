//! Raw map → Record construction
//!
//! Only the `link` field is load-bearing: a present but unparseable link
//! rejects the record. Every other field degrades to a default.

use chrono::Utc;
use serde_json::{Map, Value};
use url::Url;

use tidings_core::{parse_date_optional_time, ProviderType, Result, SourceType, TidingsError};
use tidings_extractor::{decode_html, EntityExtractor, TextEnricher};

use crate::record::Record;

/// Builds records from raw key/value maps
pub struct RecordBuilder<'a> {
    enricher: &'a dyn TextEnricher,
    decode_html: bool,
}

impl RecordBuilder<'static> {
    /// Create a builder using the shared entity extractor
    pub fn new() -> Self {
        Self {
            enricher: EntityExtractor::shared(),
            decode_html: false,
        }
    }
}

impl Default for RecordBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordBuilder<'_> {
    /// Use a different enricher for the derived fields
    pub fn with_enricher<'b>(self, enricher: &'b dyn TextEnricher) -> RecordBuilder<'b> {
        RecordBuilder {
            enricher,
            decode_html: self.decode_html,
        }
    }

    /// Decode HTML entities in the text before enrichment
    pub fn with_html_decoding(mut self, enabled: bool) -> Self {
        self.decode_html = enabled;
        self
    }

    /// Build a record from a raw map
    pub fn build(&self, map: &Map<String, Value>) -> Result<Record> {
        let created_at = match string_field(map, "created_at") {
            Some(raw) if !raw.is_empty() => parse_date_optional_time(&raw).unwrap_or_else(|| {
                tracing::warn!("Unparseable created_at '{}', using current time", raw);
                Utc::now()
            }),
            _ => Utc::now(),
        };

        let source_type = string_field(map, "source_type")
            .map(|name| SourceType::parse_or_default(&name))
            .unwrap_or_default();
        let provider_type = string_field(map, "provider_type")
            .map(|name| ProviderType::parse_or_default(&name))
            .unwrap_or_default();

        let (link, status_url) = match map.get("link") {
            None | Some(Value::Null) => (None, None),
            Some(value) => {
                let (raw, url) = parse_link(value)?;
                (Some(raw), Some(url))
            }
        };

        let mut text = string_field(map, "text").unwrap_or_default();
        if self.decode_html {
            text = decode_html(&text);
        }
        let enrichment = self.enricher.enrich(&text);

        let record = Record {
            created_at,
            source_type,
            provider_type,
            provider_hash: string_field(map, "provider_hash"),
            screen_name: string_field(map, "screen_name").unwrap_or_default(),
            id_str: string_field(map, "id_str").unwrap_or_default(),
            text,
            link,
            status_url,
            retweet_count: count_field(map, "retweet_count"),
            favourites_count: count_field(map, "favourites_count"),
            images: images_field(map),
            enrichment,
        };

        tracing::debug!(
            "Built record id_str={} source={} provider={}",
            record.id_str,
            record.source_type,
            record.provider_type
        );

        Ok(record)
    }
}

// ============================================================================
// Field coercion
// ============================================================================

fn parse_link(value: &Value) -> Result<(String, Url)> {
    let Some(raw) = value.as_str() else {
        return Err(TidingsError::InvalidRecord {
            field: "link",
            value: value.to_string(),
            reason: "expected a URL string".to_string(),
        });
    };

    let url = Url::parse(raw).map_err(|e| TidingsError::InvalidRecord {
        field: "link",
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok((raw.to_string(), url))
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        scalar @ (Value::Number(_) | Value::Bool(_)) => {
            tracing::debug!("Coercing {} value {} to a string", key, scalar);
            Some(scalar.to_string())
        }
        other => {
            tracing::warn!("Ignoring non-scalar {} value: {}", key, other);
            None
        }
    }
}

fn count_field(map: &Map<String, Value>, key: &str) -> u64 {
    match map.get(key) {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or_else(|| {
                tracing::debug!("Clamping {} value {} to 0", key, n);
                0
            }),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
            tracing::debug!("Unparseable {} value '{}', using 0", key, s);
            0
        }),
        Some(other) => {
            tracing::warn!("Ignoring non-numeric {} value: {}", key, other);
            0
        }
    }
}

fn images_field(map: &Map<String, Value>) -> Vec<String> {
    match map.get("images") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    tracing::debug!("Dropping non-string image entry: {}", item);
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracing::warn!("Ignoring non-array images value: {}", other);
            Vec::new()
        }
    }
}

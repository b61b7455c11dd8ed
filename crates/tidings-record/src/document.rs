//! Record → index document serialization
//!
//! Field order and presence are fixed; documents written here must match
//! what the search index already holds.

use serde_json::{json, Map, Value};

use tidings_core::{format_timestamp, Result, UserDocument};

use crate::record::Record;

impl Record {
    /// Render the record as an index document
    ///
    /// Derived entity fields are only written with `include_derived`. A
    /// supplied user is embedded under `user`; a user that fails to render
    /// is the only error path.
    pub fn to_document(
        &self,
        user: Option<&dyn UserDocument>,
        include_derived: bool,
    ) -> Result<Map<String, Value>> {
        let mut doc = Map::new();

        doc.insert(
            "created_at".to_string(),
            json!(format_timestamp(&self.created_at)),
        );
        doc.insert("screen_name".to_string(), json!(self.screen_name));
        doc.insert("text".to_string(), json!(self.text));
        doc.insert("link".to_string(), json!(self.link));
        doc.insert("id_str".to_string(), json!(self.id_str));
        doc.insert("source_type".to_string(), json!(self.source_type.as_str()));
        doc.insert(
            "provider_type".to_string(),
            json!(self.provider_type.as_str()),
        );
        if let Some(hash) = self.provider_hash.as_deref().filter(|h| !h.is_empty()) {
            doc.insert("provider_hash".to_string(), json!(hash));
        }
        doc.insert("retweet_count".to_string(), json!(self.retweet_count));
        // plural spelling follows the Twitter API
        doc.insert("favourites_count".to_string(), json!(self.favourites_count));
        doc.insert("images".to_string(), json!(self.images));
        doc.insert("images_count".to_string(), json!(self.images.len()));

        if include_derived {
            let e = &self.enrichment;
            doc.insert("hosts".to_string(), json!(e.hosts));
            doc.insert("hosts_count".to_string(), json!(e.hosts.len()));
            doc.insert("links".to_string(), json!(e.links));
            doc.insert("links_count".to_string(), json!(e.links.len()));
            doc.insert("mentions".to_string(), json!(e.mentions));
            doc.insert("mentions_count".to_string(), json!(e.mentions.len()));
            doc.insert("hashtags".to_string(), json!(e.hashtags));
            doc.insert("hashtags_count".to_string(), json!(e.hashtags.len()));
            doc.insert("without_l_len".to_string(), json!(e.without_l_len));
            doc.insert("without_lu_len".to_string(), json!(e.without_lu_len));
            doc.insert("without_luh_len".to_string(), json!(e.without_luh_len));
        }

        if let Some(user) = user {
            doc.insert("user".to_string(), user.to_document()?);
        }

        Ok(doc)
    }

    /// Compact one-line JSON for log output, without derived fields or user
    ///
    /// Returns `None` if the record cannot be rendered.
    pub fn to_log_line(&self) -> Option<String> {
        let rendered = self
            .to_document(None, false)
            .and_then(|doc| Ok(serde_json::to_string(&doc)?));

        match rendered {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::warn!("Failed to render record {}: {}", self.id_str, e);
                None
            }
        }
    }
}

//! Tidings Extractor - Entity extraction pipeline for message text
//!
//! Pulls links, user mentions and hashtags out of a message body in three
//! ordered passes, each pass working on the text left over by the previous
//! one, and measures how much text remains after every pass.

use serde::{Deserialize, Serialize};

/// Entity classes recognized in message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Link,
    Mention,
    Hashtag,
}

impl EntityClass {
    /// Leading marker removed from stored matches
    pub fn sigil(&self) -> Option<char> {
        match self {
            Self::Link => None,
            Self::Mention => Some('@'),
            Self::Hashtag => Some('#'),
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Mention => "mention",
            Self::Hashtag => "hashtag",
        }
    }
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of a single scrub stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    /// Matches in order of appearance, sigil stripped
    pub matches: Vec<String>,
    /// Text with the matches removed and spaces collapsed
    pub text: String,
    /// Length of `text` in UTF-16 code units
    pub residual_len: usize,
}

/// Everything derived from a message text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Links in order of appearance, duplicates kept
    pub links: Vec<String>,
    /// Hosts of the parseable links, first appearance wins
    pub hosts: Vec<String>,
    /// Mentioned screen names without `@`
    pub mentions: Vec<String>,
    /// Hashtags without `#`
    pub hashtags: Vec<String>,
    /// Text length after removing links
    pub without_l_len: usize,
    /// Text length after removing links and mentions
    pub without_lu_len: usize,
    /// Text length after removing links, mentions and hashtags
    pub without_luh_len: usize,
}

/// Trait for text enrichers
pub trait TextEnricher: Send + Sync {
    fn enrich(&self, text: &str) -> Enrichment;
}

pub mod entities;
pub mod html;

pub use entities::{extract_hosts, EntityExtractor, ScrubStage};
pub use html::decode_html;

//! Destructive scrub stages
//!
//! Each stage matches one entity class, removes every match from the working
//! text and reports the remaining length. Stages run in a fixed order (links,
//! mentions, hashtags), so a `#` inside a URL is never reported as a hashtag.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::{EntityClass, Enrichment, StageOutput, TextEnricher};

// Entity text never crosses a line terminator (\n, \r, U+0085, U+2028, U+2029),
// and the end anchor also holds before one final terminator.
//
// Right boundary must be a space or ')' since other punctuation is legal in URLs
const LINK_PATTERN: &str = r"(?:\b|^)(https?://[^\n\r\x{85}\x{2028}\x{2029}]*?)(?:[) ]|(?:\r\n|[\n\r\x{85}\x{2028}\x{2029}])?$)";
// Left boundary must be a space or '(' since the sigil is itself a boundary
const MENTION_PATTERN: &str = r"(?:[ (]|^)(@[^\n\r\x{85}\x{2028}\x{2029}][^\n\r\x{85}\x{2028}\x{2029}]*?)(?:\b|(?:\r\n|[\n\r\x{85}\x{2028}\x{2029}])?$)";
const HASHTAG_PATTERN: &str = r"(?:[ (]|^)(#[^\n\r\x{85}\x{2028}\x{2029}][^\n\r\x{85}\x{2028}\x{2029}]*?)(?:\b|(?:\r\n|[\n\r\x{85}\x{2028}\x{2029}])?$)";

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new("  +").expect("valid space run regex"));

static SHARED: Lazy<EntityExtractor> = Lazy::new(EntityExtractor::new);

// ============================================================================
// Scrub Stage
// ============================================================================

/// One (pattern, entity class) pass over the working text
#[derive(Debug, Clone)]
pub struct ScrubStage {
    class: EntityClass,
    pattern: Regex,
}

impl ScrubStage {
    /// Create the stage for an entity class with its built-in pattern
    pub fn new(class: EntityClass) -> Self {
        let pattern = match class {
            EntityClass::Link => LINK_PATTERN,
            EntityClass::Mention => MENTION_PATTERN,
            EntityClass::Hashtag => HASHTAG_PATTERN,
        };

        Self {
            class,
            pattern: Regex::new(pattern).expect("valid built-in entity pattern"),
        }
    }

    /// Create a stage with a custom pattern
    ///
    /// Capture group 1 must hold the entity text including its sigil.
    pub fn with_pattern(class: EntityClass, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            class,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn class(&self) -> EntityClass {
        self.class
    }

    /// Run the stage over `text`
    pub fn apply(&self, text: &str) -> StageOutput {
        let found: Vec<&str> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();

        // Each match removes the first occurrence of its text
        let mut remaining = text.to_string();
        for m in &found {
            if let Some(start) = remaining.find(m) {
                remaining.replace_range(start..start + m.len(), "");
            }
        }

        let reduced = collapse_spaces(&remaining);
        let residual_len = utf16_len(&reduced);

        let matches = found
            .into_iter()
            .map(|m| match self.class.sigil() {
                Some(sigil) => m.strip_prefix(sigil).unwrap_or(m).to_string(),
                None => m.to_string(),
            })
            .collect();

        StageOutput {
            matches,
            text: reduced,
            residual_len,
        }
    }
}

// ============================================================================
// Entity Extractor
// ============================================================================

/// The link → mention → hashtag pipeline
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    links: ScrubStage,
    mentions: ScrubStage,
    hashtags: ScrubStage,
}

impl EntityExtractor {
    /// Create an extractor with the built-in patterns
    pub fn new() -> Self {
        Self {
            links: ScrubStage::new(EntityClass::Link),
            mentions: ScrubStage::new(EntityClass::Mention),
            hashtags: ScrubStage::new(EntityClass::Hashtag),
        }
    }

    /// Process-wide extractor with compiled built-in patterns
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Run all three stages and derive the hosts of the extracted links
    pub fn extract(&self, text: &str) -> Enrichment {
        let links = self.links.apply(text);
        let mentions = self.mentions.apply(&links.text);
        let hashtags = self.hashtags.apply(&mentions.text);
        let hosts = extract_hosts(&links.matches);

        tracing::debug!(
            "Extracted {} links, {} hosts, {} mentions, {} hashtags",
            links.matches.len(),
            hosts.len(),
            mentions.matches.len(),
            hashtags.matches.len()
        );

        Enrichment {
            links: links.matches,
            hosts,
            mentions: mentions.matches,
            hashtags: hashtags.matches,
            without_l_len: links.residual_len,
            without_lu_len: mentions.residual_len,
            without_luh_len: hashtags.residual_len,
        }
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEnricher for EntityExtractor {
    fn enrich(&self, text: &str) -> Enrichment {
        self.extract(text)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Hosts of all parseable links, deduplicated in order of first appearance
pub fn extract_hosts(links: &[String]) -> Vec<String> {
    let mut hosts = IndexSet::new();

    for link in links {
        match Url::parse(link) {
            Ok(url) => {
                if let Some(parsed) = url.host_str() {
                    // keep the host as written; the parser lower-cases it
                    let host = match authority_host(link) {
                        Some(raw) if raw.eq_ignore_ascii_case(parsed) => raw,
                        _ => parsed,
                    };
                    hosts.insert(host.to_string());
                }
            }
            Err(e) => tracing::trace!("Skipping host of {}: {}", link, e),
        }
    }

    hosts.into_iter().collect()
}

/// Host part of a link's authority, exactly as it appears in the link
fn authority_host(link: &str) -> Option<&str> {
    let (_, rest) = link.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    if host_port.starts_with('[') {
        return host_port.find(']').map(|end| &host_port[..=end]);
    }
    host_port.split(':').next()
}

/// Replace runs of two or more spaces with one and trim control characters
/// and spaces at both ends
fn collapse_spaces(text: &str) -> String {
    SPACES
        .replace_all(text, " ")
        .trim_matches(|c: char| c <= ' ')
        .to_string()
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_link_extraction() {
        let result = EntityExtractor::shared().extract("check https://example.com/a now");

        assert_eq!(result.links, vec!["https://example.com/a"]);
        assert_eq!(result.hosts, vec!["example.com"]);
        assert_eq!(result.without_l_len, "check now".len());
    }

    #[test]
    fn test_mention_extraction_order() {
        let result = EntityExtractor::shared().extract("hi @alice and @bob");

        assert_eq!(result.mentions, vec!["alice", "bob"]);
        assert_eq!(result.without_l_len, 18);
        assert_eq!(result.without_lu_len, "hi and".len());
    }

    #[test]
    fn test_hashtag_extraction() {
        let result = EntityExtractor::shared().extract("trending #foo #bar today");

        assert_eq!(result.hashtags, vec!["foo", "bar"]);
        assert_eq!(result.without_luh_len, "trending today".len());
    }

    #[test]
    fn test_plain_text_has_no_entities() {
        let result = EntityExtractor::shared().extract("  just   some words  ");

        assert!(result.links.is_empty());
        assert!(result.mentions.is_empty());
        assert!(result.hashtags.is_empty());
        assert!(result.hosts.is_empty());
        assert_eq!(result.without_l_len, "just some words".len());
        assert_eq!(result.without_lu_len, result.without_l_len);
        assert_eq!(result.without_luh_len, result.without_l_len);
    }

    #[test]
    fn test_hashtag_inside_url_not_reported() {
        let result =
            EntityExtractor::shared().extract("read https://example.com/page#section #real");

        assert_eq!(result.links, vec!["https://example.com/page#section"]);
        assert_eq!(result.hashtags, vec!["real"]);
    }

    #[test]
    fn test_link_closed_by_parenthesis() {
        let result = EntityExtractor::shared().extract("(see http://a.org/x) ok");

        assert_eq!(result.links, vec!["http://a.org/x"]);
        assert_eq!(result.hosts, vec!["a.org"]);
    }

    #[test]
    fn test_duplicate_links_kept_hosts_deduplicated() {
        let result = EntityExtractor::shared()
            .extract("http://a.org/1 http://b.org http://a.org/2 http://a.org/1");

        assert_eq!(
            result.links,
            vec!["http://a.org/1", "http://b.org", "http://a.org/2", "http://a.org/1"]
        );
        assert_eq!(result.hosts, vec!["a.org", "b.org"]);
        assert_eq!(result.without_l_len, 0);
    }

    #[test]
    fn test_mention_requires_left_boundary() {
        let result = EntityExtractor::shared().extract("mail bob@example.com (@carol)");

        assert_eq!(result.mentions, vec!["carol"]);
    }

    #[test]
    fn test_mention_at_start() {
        let result = EntityExtractor::shared().extract("@alice: thanks");

        assert_eq!(result.mentions, vec!["alice"]);
        assert_eq!(result.without_lu_len, ": thanks".len());
    }

    #[test]
    fn test_unparseable_link_has_no_host() {
        let hosts = extract_hosts(&["http://".to_string(), "https://ok.net/x".to_string()]);
        assert_eq!(hosts, vec!["ok.net"]);
    }

    #[test]
    fn test_stage_is_independent() {
        let stage = ScrubStage::new(EntityClass::Hashtag);
        let output = stage.apply("#one two #three");

        assert_eq!(stage.class(), EntityClass::Hashtag);
        assert_eq!(output.matches, vec!["one", "three"]);
        assert_eq!(output.text, "two");
        assert_eq!(output.residual_len, 3);
    }

    #[test]
    fn test_custom_stage_pattern() {
        let stage = ScrubStage::with_pattern(EntityClass::Mention, r"(?:^| )(@\w+)").unwrap();
        let output = stage.apply("hey @dave!");

        assert_eq!(output.matches, vec!["dave"]);
        assert_eq!(output.text, "hey !");
        assert!(ScrubStage::with_pattern(EntityClass::Mention, "(").is_err());
    }

    #[test]
    fn test_lengths_count_utf16_units() {
        let result = EntityExtractor::shared().extract("ok \u{1F600}");

        assert_eq!(result.without_l_len, 5);
    }

    #[test]
    fn test_link_before_final_newline() {
        let result = EntityExtractor::shared().extract("see http://x.org/a\n");

        assert_eq!(result.links, vec!["http://x.org/a"]);
        assert_eq!(result.hosts, vec!["x.org"]);
        assert_eq!(result.without_l_len, "see".len());

        let result = EntityExtractor::shared().extract("see http://x.org/a\r\n");
        assert_eq!(result.links, vec!["http://x.org/a"]);
    }

    #[test]
    fn test_link_does_not_cross_line_terminators() {
        let result = EntityExtractor::shared().extract("see http://x.org/a\rmore");
        assert!(result.links.is_empty());

        let result = EntityExtractor::shared().extract("see http://x.org/a\nmore text");
        assert!(result.links.is_empty());

        let result = EntityExtractor::shared().extract("see http://x.org/a\u{2028}");
        assert_eq!(result.links, vec!["http://x.org/a"]);
    }

    #[test]
    fn test_mention_and_hashtag_on_later_lines() {
        let output = ScrubStage::new(EntityClass::Mention).apply("hi @!!\n");
        assert_eq!(output.matches, vec!["!!"]);
        assert_eq!(output.text, "hi");

        let result = EntityExtractor::shared().extract("note\n#tag ok @bob\n");
        assert_eq!(result.mentions, vec!["bob"]);
        assert!(result.hashtags.is_empty());
    }

    #[test]
    fn test_non_ascii_entities() {
        let result = EntityExtractor::shared().extract("héllo @zoë! #café ok");

        assert_eq!(result.mentions, vec!["zoë"]);
        assert_eq!(result.hashtags, vec!["café"]);
        assert_eq!(result.without_luh_len, "héllo ! ok".encode_utf16().count());
    }

    #[test]
    fn test_hosts_keep_their_case() {
        let result = EntityExtractor::shared()
            .extract("http://Example.COM/x https://user@Twitter.com:8443 http://[::1]/y");

        assert_eq!(
            result.links,
            vec!["http://Example.COM/x", "https://user@Twitter.com:8443", "http://[::1]/y"]
        );
        assert_eq!(result.hosts, vec!["Example.COM", "Twitter.com", "[::1]"]);
    }

    #[test]
    fn test_enricher_trait_matches_extract() {
        let extractor = EntityExtractor::new();
        let enricher: &dyn TextEnricher = &extractor;
        let text = "#a @b http://c.de";

        assert_eq!(enricher.enrich(text), extractor.extract(text));
    }

    proptest! {
        #[test]
        fn prop_residual_lengths_never_grow(text in "[ a-z@#():/.h]{0,60}") {
            let result = EntityExtractor::shared().extract(&text);

            prop_assert!(result.without_l_len <= text.encode_utf16().count());
            prop_assert!(result.without_lu_len <= result.without_l_len);
            prop_assert!(result.without_luh_len <= result.without_lu_len);
        }

        #[test]
        fn prop_residual_lengths_never_grow_multiline(text in "[\\PC\n\r]{0,80}") {
            let result = EntityExtractor::shared().extract(&text);

            prop_assert!(result.without_l_len <= text.encode_utf16().count());
            prop_assert!(result.without_lu_len <= result.without_l_len);
            prop_assert!(result.without_luh_len <= result.without_lu_len);
        }

        #[test]
        fn prop_extraction_is_deterministic(text in "\\PC{0,80}") {
            let extractor = EntityExtractor::shared();
            prop_assert_eq!(extractor.extract(&text), extractor.extract(&text));
        }
    }
}

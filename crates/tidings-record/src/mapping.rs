//! Search index field mapping
//!
//! Declares type and index behavior for every field a record document can
//! carry. The index bootstrap creates the index from [`SchemaMapping::to_json`];
//! the declaration must cover every field written by `Record::to_document`
//! except the opaque `user` object.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Map, Value};

static MAPPING: Lazy<SchemaMapping> = Lazy::new(SchemaMapping::build);

/// Index field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    String,
    Long,
}

/// How a string field is indexed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// Tokenized for full-text search
    #[default]
    Analyzed,
    /// Indexed as a single exact term
    NotAnalyzed,
}

/// Mapping of a single document field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Date format name, dates only
    pub format: Option<&'static str>,
    pub index: IndexMode,
    /// Whether the field feeds the `_all` full-text aggregate
    pub include_in_all: bool,
    /// Whether column-oriented values are stored for sorting and aggregation
    pub doc_values: bool,
}

impl FieldMapping {
    fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            format: None,
            index: IndexMode::Analyzed,
            include_in_all: true,
            doc_values: false,
        }
    }

    /// Date field in the index's date-optional-time format
    pub fn date(name: &'static str) -> Self {
        let mut field = Self::new(name, FieldType::Date);
        field.format = Some("dateOptionalTime");
        field
    }

    /// Analyzed string field
    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Exact-match string field with doc values
    pub fn keyword(name: &'static str) -> Self {
        Self::string(name).not_analyzed().with_doc_values()
    }

    /// Integer field with doc values
    pub fn long(name: &'static str) -> Self {
        Self::new(name, FieldType::Long).with_doc_values()
    }

    pub fn not_analyzed(mut self) -> Self {
        self.index = IndexMode::NotAnalyzed;
        self
    }

    pub fn excluded_from_all(mut self) -> Self {
        self.include_in_all = false;
        self
    }

    pub fn with_doc_values(mut self) -> Self {
        self.doc_values = true;
        self
    }

    /// Render the field's mapping properties
    ///
    /// Attributes equal to the index defaults are left out, and
    /// `include_in_all` is written as the string `"false"`.
    pub fn to_json(&self) -> Value {
        let mut props = Map::new();
        props.insert("type".to_string(), json!(self.field_type));
        if let Some(format) = self.format {
            props.insert("format".to_string(), json!(format));
        }
        if self.index == IndexMode::NotAnalyzed {
            props.insert("index".to_string(), json!(self.index));
        }
        if !self.include_in_all {
            props.insert("include_in_all".to_string(), json!("false"));
        }
        if self.doc_values {
            props.insert("doc_values".to_string(), json!(true));
        }
        Value::Object(props)
    }
}

/// The full document mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMapping {
    fields: Vec<FieldMapping>,
}

impl SchemaMapping {
    /// Process-wide mapping, built on first access
    pub fn global() -> &'static Self {
        &MAPPING
    }

    fn build() -> Self {
        let fields = vec![
            FieldMapping::date("created_at")
                .excluded_from_all()
                .with_doc_values(),
            FieldMapping::date("on").excluded_from_all().with_doc_values(),
            FieldMapping::keyword("screen_name"),
            FieldMapping::string("text"),
            // not part of the content
            FieldMapping::keyword("link").excluded_from_all(),
            FieldMapping::keyword("id_str").excluded_from_all(),
            FieldMapping::keyword("source_type").excluded_from_all(),
            FieldMapping::keyword("provider_type").excluded_from_all(),
            FieldMapping::keyword("provider_hash").excluded_from_all(),
            FieldMapping::long("retweet_count").excluded_from_all(),
            FieldMapping::long("favourites_count").excluded_from_all(),
            FieldMapping::keyword("images").excluded_from_all(),
            FieldMapping::long("images_count").excluded_from_all(),
            // Extracted from 'text', which is already in _all
            FieldMapping::keyword("hosts").excluded_from_all(),
            FieldMapping::long("hosts_count").excluded_from_all(),
            FieldMapping::keyword("links").excluded_from_all(),
            FieldMapping::long("links_count").excluded_from_all(),
            FieldMapping::keyword("mentions").excluded_from_all(),
            FieldMapping::long("mentions_count").excluded_from_all(),
            FieldMapping::keyword("hashtags").excluded_from_all(),
            FieldMapping::long("hashtags_count").excluded_from_all(),
            // ranking features
            FieldMapping::long("without_l_len").excluded_from_all(),
            FieldMapping::long("without_lu_len").excluded_from_all(),
            FieldMapping::long("without_luh_len").excluded_from_all(),
        ];

        Self { fields }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Render the index mapping document
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.to_json()))
            .collect();

        json!({ "properties": properties })
    }
}

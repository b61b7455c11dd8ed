//! Tidings Record - Canonical message records for the search index
//!
//! A raw key/value record from a messaging API is turned into a [`Record`]
//! by the [`RecordBuilder`], which applies field defaults and runs the
//! entity extractor over the message text. Records render to index
//! documents whose fields are declared by the [`SchemaMapping`].

pub mod builder;
pub mod document;
pub mod mapping;
pub mod record;

pub use builder::RecordBuilder;
pub use mapping::{FieldMapping, FieldType, IndexMode, SchemaMapping};
pub use record::Record;

pub use tidings_core::{ProviderType, Result, SourceType, TidingsError, UserDocument};
pub use tidings_extractor::Enrichment;

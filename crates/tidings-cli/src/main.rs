//! Tidings CLI - Command-line interface
//!
//! Usage:
//!   tidings normalize [--input <file>] [--derived] [--decode-html]
//!   tidings extract <text>
//!   tidings decode <text>
//!   tidings mapping

mod config;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use config::{AppConfig, LoggingConfig};
use tidings_core::UserDocument;
use tidings_extractor::{decode_html, EntityExtractor};
use tidings_record::{RecordBuilder, SchemaMapping};

#[derive(Parser)]
#[command(name = "tidings")]
#[command(about = "Normalize raw messages into search index documents")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn JSON-lines raw messages into index documents
    Normalize {
        /// Input file (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Include derived entity fields
        #[arg(long)]
        derived: bool,
        /// Decode HTML entities in message text
        #[arg(long)]
        decode_html: bool,
    },
    /// Show the entities found in a text
    Extract {
        /// Message text
        text: String,
    },
    /// Decode HTML entities and escapes in a text
    Decode {
        /// Scraped text
        text: String,
    },
    /// Print the index creation body with the field mapping
    Mapping,
}

/// Options for a normalize run
#[derive(Debug, Clone, Copy, Default)]
struct NormalizeOptions {
    include_derived: bool,
    decode_html: bool,
}

/// Outcome of a normalize run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NormalizeStats {
    written: usize,
    rejected: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Normalize {
            input,
            derived,
            decode_html,
        } => {
            let options = NormalizeOptions {
                include_derived: derived || config.normalizer.include_derived,
                decode_html: decode_html || config.normalizer.decode_html,
            };
            let reader: Box<dyn BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(
                    File::open(path).with_context(|| format!("opening {}", path.display()))?,
                )),
                None => Box::new(io::stdin().lock()),
            };
            let mut writer = BufWriter::new(io::stdout().lock());

            let stats = normalize_stream(reader, &mut writer, options)?;
            writer.flush()?;
            tracing::info!(
                "Normalized {} records, rejected {}",
                stats.written,
                stats.rejected
            );
        }
        Commands::Extract { text } => {
            let enrichment = EntityExtractor::shared().extract(&text);
            println!("{}", serde_json::to_string_pretty(&enrichment)?);
        }
        Commands::Decode { text } => {
            println!("{}", decode_html(&text));
        }
        Commands::Mapping => {
            tracing::info!("Mapping for index {}", config.index.name);
            let body = index_body(&config.index.name, &config.index.doc_type);
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    // stdout carries documents, logs go to stderr
    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

/// Normalize one raw message per line into one document per line
///
/// Lines that are not JSON objects or that fail record construction are
/// logged and counted, not fatal. A `user` object on the raw message is
/// embedded into the document.
fn normalize_stream<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    options: NormalizeOptions,
) -> anyhow::Result<NormalizeStats> {
    let builder = RecordBuilder::new().with_html_decoding(options.decode_html);
    let mut stats = NormalizeStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;

        let raw: Map<String, Value> = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Line {}: not a JSON object: {}", line_no, e);
                stats.rejected += 1;
                continue;
            }
        };

        let record = match builder.build(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Line {}: {}", line_no, e);
                stats.rejected += 1;
                continue;
            }
        };

        let user = raw.get("user").filter(|u| u.is_object());
        let doc = record.to_document(
            user.map(|u| u as &dyn UserDocument),
            options.include_derived,
        )?;
        serde_json::to_writer(&mut *writer, &doc)?;
        writer.write_all(b"\n")?;
        stats.written += 1;
    }

    Ok(stats)
}

/// Mapping of one index, keyed by index name then document type
fn index_body(index_name: &str, doc_type: &str) -> Value {
    let mut mappings = Map::new();
    mappings.insert(doc_type.to_string(), SchemaMapping::global().to_json());

    let mut body = Map::new();
    body.insert(index_name.to_string(), json!({ "mappings": mappings }));
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, options: NormalizeOptions) -> (NormalizeStats, Vec<Value>) {
        let mut out = Vec::new();
        let stats = normalize_stream(input.as_bytes(), &mut out, options).unwrap();
        let docs = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (stats, docs)
    }

    #[test]
    fn test_normalize_stream_counts() {
        let input = concat!(
            "{\"text\":\"hi @bob\",\"link\":\"http://example.com/1\"}\n",
            "\n",
            "not json\n",
            "{\"link\":\"bad link\"}\n",
            "{\"text\":\"#x\",\"link\":\"http://example.com/2\"}\n",
        );

        let (stats, docs) = run(input, NormalizeOptions::default());
        assert_eq!(
            stats,
            NormalizeStats {
                written: 2,
                rejected: 2
            }
        );
        assert_eq!(docs.len(), 2);
        assert!(docs[0].get("mentions").is_none());
    }

    #[test]
    fn test_normalize_stream_derived_and_user() {
        let input = "{\"text\":\"hi @bob\",\"user\":{\"screen_name\":\"alice\"}}\n";
        let options = NormalizeOptions {
            include_derived: true,
            decode_html: false,
        };

        let (_, docs) = run(input, options);
        assert_eq!(docs[0]["mentions"], json!(["bob"]));
        assert_eq!(docs[0]["user"]["screen_name"], "alice");
    }

    #[test]
    fn test_normalize_stream_decodes_html() {
        let input = "{\"text\":\"a &amp; b\"}\n";
        let options = NormalizeOptions {
            include_derived: false,
            decode_html: true,
        };

        let (_, docs) = run(input, options);
        assert_eq!(docs[0]["text"], "a & b");
    }

    #[test]
    fn test_index_body() {
        let body = index_body("tweets", "message");
        let properties = &body["tweets"]["mappings"]["message"]["properties"];

        assert!(properties["created_at"].is_object());
        assert_eq!(body.as_object().map(|b| b.len()), Some(1));
        assert!(body.get("mappings").is_none());
    }
}

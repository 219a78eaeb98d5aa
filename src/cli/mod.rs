//! Command-line interface for casflat.
//!
//! Provides commands for flattening annotations from serialized documents,
//! reading single feature values, listing document metadata and inspecting
//! type systems and configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

use crate::cas::{Cas, FsId, RangeKind};
use crate::config::{self, ResolvedConfig};
use crate::core::{extract_meta_fields, MetaFieldSource, SchemaBinding};
use crate::domain::FlatRecord;

/// casflat - flatten typed annotations into serializable records
#[derive(Parser, Debug)]
#[command(name = "casflat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (skips config file discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten all annotations of a type
    Extract {
        /// Document files (JSON) or glob patterns
        #[arg(required = true)]
        documents: Vec<String>,

        /// Fully-qualified annotation type name
        #[arg(short = 't', long)]
        type_name: String,

        /// Feature to copy (repeatable)
        #[arg(short, long = "feature")]
        features: Vec<String>,

        /// Copy every feature the type declares or inherits
        #[arg(short, long, conflicts_with = "features")]
        all_features: bool,

        /// Fail if the type or a requested feature is missing
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the display value of one feature of one annotation
    Feature {
        /// Document file (JSON)
        document: PathBuf,

        /// Feature structure id
        #[arg(long)]
        id: usize,

        /// Feature short name
        #[arg(short, long)]
        feature: String,
    },

    /// List document metadata pairs
    Meta {
        /// Document files (JSON) or glob patterns
        #[arg(required = true)]
        documents: Vec<String>,

        /// Metadata source
        #[arg(short, long, value_enum, default_value = "crawler")]
        source: SourceArg,
    },

    /// Show the type system of a document
    Types {
        /// Document file (JSON)
        document: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Output format for extracted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array of documents with their records
    Json,
    /// One JSON object per record
    Jsonl,
}

/// Metadata source for CLI (maps to MetaFieldSource)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    /// Crawler-supplied metadata
    Crawler,

    /// Content classification metadata
    Classification,
}

impl From<SourceArg> for MetaFieldSource {
    fn from(s: SourceArg) -> Self {
        match s {
            SourceArg::Crawler => MetaFieldSource::Crawler,
            SourceArg::Classification => MetaFieldSource::Classification,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::config()?.clone(),
        };

        match self.command {
            Commands::Extract {
                documents,
                type_name,
                features,
                all_features,
                strict,
                format,
            } => extract(
                &config,
                &documents,
                &type_name,
                &features,
                all_features,
                strict,
                format,
            ),
            Commands::Feature {
                document,
                id,
                feature,
            } => show_feature(&config, &document, id, &feature),
            Commands::Meta { documents, source } => show_meta(&config, &documents, source.into()),
            Commands::Types { document } => show_types(&document),
            Commands::Config => show_config(&config),
        }
    }
}

/// Records extracted from one document
#[derive(Debug, Serialize)]
struct DocumentRecords {
    document: String,
    records: Vec<FlatRecord>,
}

fn extract(
    config: &ResolvedConfig,
    documents: &[String],
    type_name: &str,
    features: &[String],
    all_features: bool,
    strict: bool,
    format: OutputFormat,
) -> Result<()> {
    let extractor = config.extractor();
    let mut results = Vec::new();

    for path in expand_documents(documents)? {
        let cas = load_document(&path)?;

        let records = if strict {
            let binding = if all_features {
                SchemaBinding::bind_all(cas.type_system(), "casflat extract", type_name)
            } else {
                SchemaBinding::bind(cas.type_system(), "casflat extract", type_name, features)
            }
            .with_context(|| format!("Schema check failed for {}", path.display()))?;
            extractor.extract_bound(&cas, &binding)
        } else if all_features {
            extractor.extract_all_selecting(&cas, type_name, true)
        } else {
            extractor.extract_all_with_features(&cas, type_name, features)
        };

        tracing::debug!(document = %path.display(), count = records.len(), "Extracted");
        results.push(DocumentRecords {
            document: path.display().to_string(),
            records,
        });
    }

    match format {
        OutputFormat::Json => print_json(&results, config.output.pretty),
        OutputFormat::Jsonl => {
            for result in &results {
                for record in &result.records {
                    let line = json!({ "document": result.document, "record": record });
                    println!("{}", serde_json::to_string(&line)?);
                }
            }
            Ok(())
        }
    }
}

fn show_feature(config: &ResolvedConfig, document: &Path, id: usize, feature: &str) -> Result<()> {
    let cas = load_document(document)?;
    let annotation = cas
        .fs(FsId(id))
        .with_context(|| format!("No feature structure {} in {}", id, document.display()))?;

    match config.extractor().extract_feature_as_string(annotation, feature) {
        Some(value) => println!("{}", value),
        None => eprintln!("No value for feature '{}' on {} ({})", feature, FsId(id), annotation.type_name()),
    }
    Ok(())
}

fn show_meta(config: &ResolvedConfig, documents: &[String], source: MetaFieldSource) -> Result<()> {
    let type_name = config.meta_field_type(source);

    for path in expand_documents(documents)? {
        let cas = load_document(&path)?;
        let fields = extract_meta_fields(&cas, type_name);

        println!("{} ({} {} fields)", path.display(), fields.len(), source);
        for (name, value) in fields.iter() {
            println!("  {}: {}", name, value);
        }
    }
    Ok(())
}

fn show_types(document: &Path) -> Result<()> {
    let cas = load_document(document)?;
    let type_system = cas.type_system();

    for type_def in type_system.types() {
        match &type_def.parent {
            Some(parent) => println!("{} < {}", type_def.name, parent),
            None => println!("{}", type_def.name),
        }
        for feature in type_system.features_of(&type_def.name) {
            let kind = match feature.range_kind() {
                RangeKind::Primitive(_) => "primitive",
                RangeKind::Array => "array",
                RangeKind::PrimitiveArray => "primitive array",
                RangeKind::Reference => "reference",
            };
            println!("  {}: {} ({})", feature.name, feature.range, kind);
        }
    }
    Ok(())
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("casflat configuration");
    println!("=====================");
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!();
    println!("Reference rules:");
    for (type_name, rule) in config.reference_rules.iter() {
        println!("  {}: {}", type_name, rule);
    }
    println!();
    println!("Metadata types:");
    println!("  crawler: {}", config.meta_field_types.crawler);
    println!("  classification: {}", config.meta_field_types.classification);
    println!();
    println!("Pretty output: {}", config.output.pretty);
    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

/// Expand glob patterns; plain paths pass through unchanged
fn expand_documents(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Skipping unreadable path: {}", e);
                    None
                }
            })
            .collect();
        if matched.is_empty() {
            bail!("No documents match pattern: {}", pattern);
        }
        matched.sort();
        paths.extend(matched);
    }

    Ok(paths)
}

/// Load a serialized document
pub fn load_document(path: &Path) -> Result<Cas> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document: {}", path.display()))
}

//! casflat - flatten typed annotations into serializable records
//!
//! Reads annotations out of an in-memory annotation store (a document text
//! plus typed feature structures) and turns them into plain string-keyed
//! records suitable for JSON output, search indexing and downstream
//! consumers.
//!
//! # Architecture
//!
//! Extraction is best-effort:
//! - An unknown type yields an empty result, never an error
//! - A store fault mid-batch returns the records collected so far
//! - Reference-valued features are displayed through configurable rules
//!
//! # Modules
//!
//! - `cas`: Annotation store model (TypeSystem, Cas, FeatureValue)
//! - `core`: Extraction logic (Extractor, SchemaBinding, set_feature, metadata)
//! - `domain`: Output data structures (FlatRecord, MetaFields)
//! - `config`: YAML configuration (reference rules, metadata types)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Flatten all tokens with their part-of-speech and lemma
//! casflat extract doc.json -t uima.tt.TokenAnnotation -f posTag -f lemma
//!
//! # Every feature of every sentence across a directory of documents
//! casflat extract 'docs/*.json' -t uima.tt.SentenceAnnotation --all-features
//!
//! # Crawler metadata
//! casflat meta doc.json --source crawler
//! ```

pub mod cas;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use cas::{Cas, CasError, FeatureValue, FsId, FsRef, StoreFault, TypeDef, TypeSystem};
pub use core::{
    extract_meta_fields, extract_source_meta_fields, set_feature, Extractor, MetaFieldSource,
    PrimitiveValue, ReferenceRule, ReferenceRules, SchemaBinding,
};
pub use domain::{FlatRecord, MetaFields};

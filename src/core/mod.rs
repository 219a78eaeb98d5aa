//! Extraction logic.
//!
//! This module contains:
//! - Resolver: type/feature lookup and schema binding for setup
//! - Rules: display rules for reference-valued features
//! - Extractor: annotation filtering and flattening
//! - Writer: typed in-place feature updates
//! - Metadata: document-level name/value metadata

pub mod extractor;
pub mod metadata;
pub mod resolver;
pub mod rules;
pub mod writer;

// Re-export commonly used types
pub use extractor::Extractor;
pub use metadata::{extract_meta_fields, extract_source_meta_fields, MetaFieldSource};
pub use resolver::{init_feature, init_type, SchemaBinding};
pub use rules::{ReferenceRule, ReferenceRules};
pub use writer::{set_feature, PrimitiveValue};

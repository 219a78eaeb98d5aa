//! Output types produced by extraction.
//!
//! - FlatRecord: span, covered text, type and string-valued features of one annotation
//! - MetaFields: document-level name/value metadata

pub mod meta_fields;
pub mod record;

pub use meta_fields::MetaFields;
pub use record::{FlatRecord, BEGIN_KEY, END_KEY};

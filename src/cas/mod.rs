//! In-memory annotation store.
//!
//! This module models the document representation the extractor reads:
//! - Types: the type system (types, features, declared ranges)
//! - Store: document text, feature structures and the annotation index
//! - Value: feature values as stored on feature structures

pub mod error;
pub mod store;
pub mod types;
pub mod value;

pub use error::{CasError, StoreFault};
pub use store::{AnnotationIndex, Cas, FeatureStructure, FsId, FsRef};
pub use types::{FeatureDef, PrimitiveKind, RangeKind, TypeDef, TypeSystem};
pub use value::FeatureValue;

//! Errors raised by the annotation store and its type system.

use thiserror::Error;

use super::store::FsId;

/// Schema and store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CasError {
    #[error("{caller}: type not found: {name}")]
    TypeNotFound { caller: String, name: String },

    #[error("{caller}: feature not found: {name}")]
    FeatureNotFound { caller: String, name: String },

    #[error("Type already defined: {0}")]
    DuplicateType(String),

    #[error("Feature {feature} already declared on {type_name}")]
    DuplicateFeature { type_name: String, feature: String },

    #[error("Unknown parent type {parent} for {type_name}")]
    UnknownParent { type_name: String, parent: String },

    #[error("Type {0} is not an annotation type")]
    NotAnnotationType(String),

    #[error(transparent)]
    Store(#[from] StoreFault),
}

impl CasError {
    /// True for faults raised while reading or writing values, as opposed to schema errors
    pub fn is_store_fault(&self) -> bool {
        matches!(self, CasError::Store(_))
    }
}

/// Runtime faults raised while accessing feature structures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreFault {
    #[error("Feature structure {0} does not exist")]
    DanglingReference(FsId),

    #[error("Feature {feature} is null")]
    NullValue { feature: String },

    #[error("Feature {feature} has range {range}, cannot access it as {accessor}")]
    WrongAccessor {
        feature: String,
        range: String,
        accessor: &'static str,
    },

    #[error("Feature {feature} is not declared on type {type_name}")]
    FeatureNotOnType { feature: String, type_name: String },

    #[error("Index {index} out of bounds for array of length {len}")]
    ArrayIndexOutOfBounds { index: usize, len: usize },

    #[error("Span [{begin}, {end}) out of bounds for document of length {len}")]
    SpanOutOfBounds { begin: i64, end: i64, len: usize },

    #[error("Annotation {0} has no readable span")]
    MissingSpan(FsId),
}

//! Annotation extraction and flattening.
//!
//! Extraction is best-effort: an unknown type yields an empty result, a store
//! fault ends the batch with whatever was already collected, and a fault on a
//! single feature records that feature as the empty string.
//!
//! # Value inference
//!
//! A requested feature is resolved on the matched annotation's concrete type
//! and turned into a string by its declared range:
//! - primitive: the value's string form
//! - array: the first element's covered text if it is an annotation,
//!   otherwise the empty string; a null first element records nothing.
//!   Primitive arrays cannot be read this way and fault
//! - reference: the [`ReferenceRules`] entry for the referent's type; no
//!   rule records nothing

use tracing::{debug, info, warn};

use super::resolver::{init_feature, SchemaBinding};
use super::rules::{ReferenceRule, ReferenceRules};
use crate::cas::{Cas, CasError, FsRef, RangeKind, StoreFault};
use crate::domain::{FlatRecord, BEGIN_KEY};

const CALLER: &str = "casflat::Extractor";

/// Extracts annotations of one type and flattens them into [`FlatRecord`]s
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    rules: ReferenceRules,
}

impl Extractor {
    pub fn new(rules: ReferenceRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ReferenceRules {
        &self.rules
    }

    /// All annotations whose concrete type is exactly `type_name`, in index order
    pub fn extract_all<'a>(&self, cas: &'a Cas, type_name: &str) -> Vec<FsRef<'a>> {
        let mut annotations = Vec::new();
        if !cas.type_system().contains(type_name) {
            info!(type_name, "Type not found in type system");
            return annotations;
        }

        for annotation in cas.annotation_index() {
            if annotation.type_name() != type_name {
                continue;
            }
            if let Err(e) = annotation.span() {
                warn!(type_name, id = %annotation.id(), error = %e, "Store fault during extraction");
                break;
            }
            annotations.push(annotation);
        }

        annotations
    }

    /// Flatten every annotation of `type_name`, copying the named features
    pub fn extract_all_with_features<S: AsRef<str>>(
        &self,
        cas: &Cas,
        type_name: &str,
        feature_names: &[S],
    ) -> Vec<FlatRecord> {
        let mut records = Vec::new();
        if !cas.type_system().contains(type_name) {
            info!(type_name, "Type not found in type system");
            return records;
        }

        for annotation in cas.annotation_index() {
            if annotation.type_name() != type_name {
                continue;
            }
            match self.flatten(annotation, type_name, feature_names) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(type_name, id = %annotation.id(), error = %e, "Store fault during extraction");
                    break;
                }
            }
        }

        debug!(type_name, count = records.len(), "Extracted records");
        records
    }

    /// Flatten every annotation of `type_name`, copying either every feature
    /// the type declares or inherits, or none beyond span, text and type
    pub fn extract_all_selecting(
        &self,
        cas: &Cas,
        type_name: &str,
        include_all_features: bool,
    ) -> Vec<FlatRecord> {
        if !cas.type_system().contains(type_name) {
            info!(type_name, "Type not found in type system");
            return Vec::new();
        }

        let feature_names: Vec<String> = if include_all_features {
            cas.type_system()
                .features_of(type_name)
                .into_iter()
                .map(|f| f.name.clone())
                .collect()
        } else {
            Vec::new()
        };

        self.extract_all_with_features(cas, type_name, feature_names.as_slice())
    }

    /// Flatten against a binding validated at setup
    pub fn extract_bound(&self, cas: &Cas, binding: &SchemaBinding) -> Vec<FlatRecord> {
        self.extract_all_with_features(cas, binding.type_name(), binding.feature_names().as_slice())
    }

    /// Display string for one feature of one annotation.
    ///
    /// Returns `None` when the feature is missing, no value can be inferred,
    /// or the store faults.
    pub fn extract_feature_as_string(&self, annotation: FsRef<'_>, feature_name: &str) -> Option<String> {
        match self.infer_value(annotation, feature_name) {
            Ok(value) => value,
            Err(e) => {
                info!(
                    feature = feature_name,
                    id = %annotation.id(),
                    error = %e,
                    "Failed to get feature value"
                );
                None
            }
        }
    }

    fn flatten<S: AsRef<str>>(
        &self,
        annotation: FsRef<'_>,
        type_name: &str,
        feature_names: &[S],
    ) -> Result<FlatRecord, CasError> {
        let (begin, end) = annotation.span()?;
        let mut record = FlatRecord::new(type_name, begin, end, annotation.covered_text()?);

        for name in feature_names {
            let name = name.as_ref();
            match self.infer_value(annotation, name) {
                Ok(Some(value)) => {
                    record.insert_feature(name, value);
                }
                Ok(None) => {}
                Err(e) => {
                    info!(feature = name, id = %annotation.id(), error = %e, "Feature recorded as empty");
                    record.insert_feature(name, "");
                }
            }
        }

        Ok(record)
    }

    fn infer_value(&self, annotation: FsRef<'_>, feature_name: &str) -> Result<Option<String>, CasError> {
        let cas = annotation.cas();
        let id = annotation.id();
        let feature = init_feature(cas.type_system(), CALLER, annotation.type_name(), feature_name)?;

        match feature.range_kind() {
            RangeKind::Primitive(_) => Ok(Some(
                cas.feature_value_as_string(id, feature)?.unwrap_or_default(),
            )),
            RangeKind::Array => {
                let elements = cas
                    .array_value(id, feature)?
                    .ok_or_else(|| null_value(feature_name))?;
                let first = elements.first().ok_or(StoreFault::ArrayIndexOutOfBounds {
                    index: 0,
                    len: 0,
                })?;
                let Some(element) = first else {
                    return Ok(None);
                };

                let element = cas.fs(*element)?;
                if element.feature(BEGIN_KEY).is_some() {
                    Ok(Some(element.covered_text()?.to_string()))
                } else {
                    Ok(Some(String::new()))
                }
            }
            RangeKind::PrimitiveArray => Err(StoreFault::WrongAccessor {
                feature: feature.name.clone(),
                range: feature.range.clone(),
                accessor: "array",
            }
            .into()),
            RangeKind::Reference => {
                let target = cas
                    .ref_value(id, feature)?
                    .ok_or_else(|| null_value(feature_name))?;
                let target = cas.fs(target)?;

                match self.rules.get(target.type_name()) {
                    Some(ReferenceRule::CoveredText) => Ok(Some(target.covered_text()?.to_string())),
                    Some(ReferenceRule::StringFeature(key)) => match target.feature(key) {
                        Some(key_feature) => Ok(Some(
                            cas.string_value(target.id(), key_feature)?.unwrap_or_default(),
                        )),
                        None => Ok(None),
                    },
                    None => Ok(None),
                }
            }
        }
    }
}

fn null_value(feature_name: &str) -> StoreFault {
    StoreFault::NullValue {
        feature: feature_name.to_string(),
    }
}

//! Document metadata carried as name/value feature structures.
//!
//! Crawlers and content classifiers attach metadata to a document as
//! instances of a dedicated type with `name` and `value` String features.
//! Metadata is only read when the type system declares a document id
//! (`uima.tcas.DocumentAnnotation:id`), i.e. the document came through a
//! crawler pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cas::types::{DOCUMENT_ANNOTATION, FEATURE_SEPARATOR};
use crate::cas::{Cas, CasError, FeatureDef, FsId};
use crate::domain::MetaFields;

pub const CRAWLER_META_FIELD_TYPE: &str = "com.ibm.es.oze.MetaField";
pub const CLASSIFICATION_META_FIELD_TYPE: &str = "com.ibm.es.oze.ICMMetaField";

const NAME_FEATURE: &str = "name";
const VALUE_FEATURE: &str = "value";

/// Where metadata pairs come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaFieldSource {
    /// Pairs added by crawlers and crawler plugins
    Crawler,
    /// Pairs added by content classification
    Classification,
}

impl MetaFieldSource {
    /// Default type name holding this source's pairs
    pub fn default_type_name(&self) -> &'static str {
        match self {
            MetaFieldSource::Crawler => CRAWLER_META_FIELD_TYPE,
            MetaFieldSource::Classification => CLASSIFICATION_META_FIELD_TYPE,
        }
    }
}

impl std::fmt::Display for MetaFieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaFieldSource::Crawler => write!(f, "crawler"),
            MetaFieldSource::Classification => write!(f, "classification"),
        }
    }
}

/// Collect non-empty name/value pairs from every instance of `type_name`.
///
/// Later pairs overwrite earlier ones with the same name. A store fault stops
/// collection and returns the pairs gathered so far.
pub fn extract_meta_fields(cas: &Cas, type_name: &str) -> MetaFields {
    let mut fields = BTreeMap::new();
    let type_system = cas.type_system();

    let document_id = format!("{}{}id", DOCUMENT_ANNOTATION, FEATURE_SEPARATOR);
    if type_system.feature_by_full_name(&document_id).is_none() {
        debug!("Type system declares no document id, skipping metadata");
        return MetaFields::default();
    }
    if !type_system.contains(type_name) {
        debug!(type_name, "Metadata type not found in type system");
        return MetaFields::default();
    }
    let (Some(name_feature), Some(value_feature)) = (
        type_system.feature(type_name, NAME_FEATURE),
        type_system.feature(type_name, VALUE_FEATURE),
    ) else {
        debug!(type_name, "Metadata type lacks name/value features");
        return MetaFields::default();
    };

    for fs in cas.all_of_type(type_name) {
        match read_pair(cas, fs.id(), name_feature, value_feature) {
            Ok((Some(name), Some(value))) if !name.is_empty() && !value.is_empty() => {
                fields.insert(name, value);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(type_name, id = %fs.id(), error = %e, "Store fault while reading metadata");
                break;
            }
        }
    }

    fields.into_iter().collect()
}

fn read_pair(
    cas: &Cas,
    id: FsId,
    name_feature: &FeatureDef,
    value_feature: &FeatureDef,
) -> Result<(Option<String>, Option<String>), CasError> {
    let name = cas.feature_value_as_string(id, name_feature)?;
    let value = cas.feature_value_as_string(id, value_feature)?;
    Ok((name, value))
}

/// Metadata from one of the two well-known sources
pub fn extract_source_meta_fields(cas: &Cas, source: MetaFieldSource) -> MetaFields {
    extract_meta_fields(cas, source.default_type_name())
}

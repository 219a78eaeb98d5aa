//! In-place updates of primitive features.

use tracing::info;

use super::resolver::init_feature;
use crate::cas::types::{BOOLEAN, INTEGER, STRING};
use crate::cas::{Cas, CasError, FeatureValue, FsId};

const CALLER: &str = "casflat::writer";

/// A value accepted by [`set_feature`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveValue {
    String(String),
    Integer(i32),
    Boolean(bool),
}

impl PrimitiveValue {
    /// Range type name a feature must declare to accept this value
    pub fn range(&self) -> &'static str {
        match self {
            PrimitiveValue::String(_) => STRING,
            PrimitiveValue::Integer(_) => INTEGER,
            PrimitiveValue::Boolean(_) => BOOLEAN,
        }
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::String(value.to_string())
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::String(value)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(value: i32) -> Self {
        PrimitiveValue::Integer(value)
    }
}

impl From<bool> for PrimitiveValue {
    fn from(value: bool) -> Self {
        PrimitiveValue::Boolean(value)
    }
}

impl From<PrimitiveValue> for FeatureValue {
    fn from(value: PrimitiveValue) -> Self {
        match value {
            PrimitiveValue::String(s) => FeatureValue::String(s),
            PrimitiveValue::Integer(v) => FeatureValue::Integer(v),
            PrimitiveValue::Boolean(v) => FeatureValue::Boolean(v),
        }
    }
}

/// Set a primitive feature on a feature structure.
///
/// Succeeds only when the feature's declared range is exactly the value's
/// kind. On a mismatch or any fault the structure is left unchanged and
/// false is returned.
pub fn set_feature(cas: &mut Cas, id: FsId, feature_name: &str, value: impl Into<PrimitiveValue>) -> bool {
    let value = value.into();
    match try_set_feature(cas, id, feature_name, value) {
        Ok(applied) => applied,
        Err(e) => {
            info!(feature = feature_name, %id, error = %e, "Failed to set feature value");
            false
        }
    }
}

fn try_set_feature(
    cas: &mut Cas,
    id: FsId,
    feature_name: &str,
    value: PrimitiveValue,
) -> Result<bool, CasError> {
    let type_name = cas.get(id)?.type_name.clone();
    let feature = init_feature(cas.type_system(), CALLER, &type_name, feature_name)?;
    if feature.range != value.range() {
        return Ok(false);
    }

    cas.set_value(id, feature_name, value)?;
    Ok(true)
}

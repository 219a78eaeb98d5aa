//! Feature values stored on feature structures.

use serde::{Deserialize, Serialize};

use super::store::FsId;
use super::types::{FeatureDef, PrimitiveKind, RangeKind};

/// A single feature value. A feature with no stored value is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureValue {
    String(String),
    Integer(i32),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Long(i64),
    /// Reference to another feature structure
    Ref(FsId),
    /// Feature-structure array; elements may be null
    Array(Vec<Option<FsId>>),
}

impl FeatureValue {
    /// Primitive kind of this value, if it is a scalar
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            FeatureValue::String(_) => Some(PrimitiveKind::String),
            FeatureValue::Integer(_) => Some(PrimitiveKind::Integer),
            FeatureValue::Boolean(_) => Some(PrimitiveKind::Boolean),
            FeatureValue::Float(_) => Some(PrimitiveKind::Float),
            FeatureValue::Double(_) => Some(PrimitiveKind::Double),
            FeatureValue::Long(_) => Some(PrimitiveKind::Long),
            FeatureValue::Ref(_) | FeatureValue::Array(_) => None,
        }
    }

    /// True if this value can be stored under the given feature's range.
    /// Reference targets are checked separately against the type system.
    /// Primitive-array ranges accept no value.
    pub fn fits(&self, feature: &FeatureDef) -> bool {
        match (feature.range_kind(), self) {
            (RangeKind::Primitive(kind), value) => value.primitive_kind() == Some(kind),
            (RangeKind::Array, FeatureValue::Array(_)) => true,
            (RangeKind::Reference, FeatureValue::Ref(_)) => true,
            _ => false,
        }
    }

    /// String form of a primitive value
    pub fn primitive_string(&self) -> Option<String> {
        match self {
            FeatureValue::String(s) => Some(s.clone()),
            FeatureValue::Integer(v) => Some(v.to_string()),
            FeatureValue::Boolean(v) => Some(v.to_string()),
            FeatureValue::Float(v) => Some(decimal_string(v, v.is_finite())),
            FeatureValue::Double(v) => Some(decimal_string(v, v.is_finite())),
            FeatureValue::Long(v) => Some(v.to_string()),
            FeatureValue::Ref(_) | FeatureValue::Array(_) => None,
        }
    }
}

/// String form of an unset primitive feature. Numeric and boolean features
/// read as their zero value; strings are null.
pub(crate) fn default_primitive_string(kind: PrimitiveKind) -> Option<String> {
    match kind {
        PrimitiveKind::String => None,
        PrimitiveKind::Integer | PrimitiveKind::Long => Some("0".to_string()),
        PrimitiveKind::Float | PrimitiveKind::Double => Some(decimal_string(0.0, true)),
        PrimitiveKind::Boolean => Some("false".to_string()),
    }
}

/// Floating-point display that always keeps a fractional part, so `0.0`
/// reads the same whether stored or defaulted
fn decimal_string(value: impl std::fmt::Display, finite: bool) -> String {
    let repr = value.to_string();
    if finite && !repr.contains('.') {
        format!("{}.0", repr)
    } else {
        repr
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::String(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::String(value)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Integer(value)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Boolean(value)
    }
}

impl From<FsId> for FeatureValue {
    fn from(value: FsId) -> Self {
        FeatureValue::Ref(value)
    }
}

//! Type and feature resolution against a loaded type system.
//!
//! These lookups are meant for setup: a missing type or feature is a schema
//! error and is returned to the caller rather than logged.

use crate::cas::{CasError, FeatureDef, TypeDef, TypeSystem};

/// Resolve a type by fully-qualified name
pub fn init_type<'a>(
    type_system: &'a TypeSystem,
    caller: &str,
    type_name: &str,
) -> Result<&'a TypeDef, CasError> {
    type_system
        .get_type(type_name)
        .ok_or_else(|| CasError::TypeNotFound {
            caller: caller.to_string(),
            name: type_name.to_string(),
        })
}

/// Resolve a feature by short name on a type, including inherited features
pub fn init_feature<'a>(
    type_system: &'a TypeSystem,
    caller: &str,
    type_name: &str,
    feature_name: &str,
) -> Result<&'a FeatureDef, CasError> {
    init_type(type_system, caller, type_name)?;
    type_system
        .feature(type_name, feature_name)
        .ok_or_else(|| CasError::FeatureNotFound {
            caller: caller.to_string(),
            name: feature_name.to_string(),
        })
}

/// A type and a set of its features, validated once before processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBinding {
    type_name: String,
    features: Vec<FeatureDef>,
}

impl SchemaBinding {
    /// Bind a type and features; the first missing name aborts the binding
    pub fn bind<S: AsRef<str>>(
        type_system: &TypeSystem,
        caller: &str,
        type_name: &str,
        feature_names: &[S],
    ) -> Result<Self, CasError> {
        init_type(type_system, caller, type_name)?;
        let features = feature_names
            .iter()
            .map(|name| init_feature(type_system, caller, type_name, name.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            type_name: type_name.to_string(),
            features,
        })
    }

    /// Bind a type with every feature it declares or inherits
    pub fn bind_all(
        type_system: &TypeSystem,
        caller: &str,
        type_name: &str,
    ) -> Result<Self, CasError> {
        init_type(type_system, caller, type_name)?;
        Ok(Self {
            type_name: type_name.to_string(),
            features: type_system
                .features_of(type_name)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn features(&self) -> &[FeatureDef] {
        &self.features
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }
}

//! Type system: named types, their features and feature ranges.
//!
//! Types form a single-inheritance tree rooted at `uima.cas.TOP`. Features
//! are inherited, so the feature list of a type is its parent's list followed
//! by its own declarations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::CasError;

pub const TOP: &str = "uima.cas.TOP";
pub const STRING: &str = "uima.cas.String";
pub const INTEGER: &str = "uima.cas.Integer";
pub const BOOLEAN: &str = "uima.cas.Boolean";
pub const FLOAT: &str = "uima.cas.Float";
pub const DOUBLE: &str = "uima.cas.Double";
pub const LONG: &str = "uima.cas.Long";
pub const FS_ARRAY: &str = "uima.cas.FSArray";
pub const ANNOTATION: &str = "uima.tcas.Annotation";
pub const DOCUMENT_ANNOTATION: &str = "uima.tcas.DocumentAnnotation";

/// Separator between type name and feature short name in a full feature name
pub const FEATURE_SEPARATOR: char = ':';

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Integer,
    Boolean,
    Float,
    Double,
    Long,
}

impl PrimitiveKind {
    /// Map a built-in primitive type name to its kind
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            STRING => Some(PrimitiveKind::String),
            INTEGER => Some(PrimitiveKind::Integer),
            BOOLEAN => Some(PrimitiveKind::Boolean),
            FLOAT => Some(PrimitiveKind::Float),
            DOUBLE => Some(PrimitiveKind::Double),
            LONG => Some(PrimitiveKind::Long),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => STRING,
            PrimitiveKind::Integer => INTEGER,
            PrimitiveKind::Boolean => BOOLEAN,
            PrimitiveKind::Float => FLOAT,
            PrimitiveKind::Double => DOUBLE,
            PrimitiveKind::Long => LONG,
        }
    }
}

/// Classification of a feature's declared range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// A primitive scalar
    Primitive(PrimitiveKind),
    /// A feature-structure array
    Array,
    /// A built-in primitive array such as `uima.cas.StringArray`; not
    /// readable as feature-structure references
    PrimitiveArray,
    /// A single reference to another feature structure
    Reference,
}

/// A named feature and the type name of its range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDef {
    /// Short (base) name of the feature
    pub name: String,
    /// Fully-qualified name of the range type
    pub range: String,
}

impl FeatureDef {
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
        }
    }

    /// Classify the declared range
    pub fn range_kind(&self) -> RangeKind {
        if let Some(kind) = PrimitiveKind::from_type_name(&self.range) {
            return RangeKind::Primitive(kind);
        }
        if self.range == FS_ARRAY {
            return RangeKind::Array;
        }
        if self.range.starts_with("uima.cas.") && self.range.ends_with("Array") {
            return RangeKind::PrimitiveArray;
        }
        RangeKind::Reference
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.range_kind(), RangeKind::Primitive(_))
    }
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Fully-qualified type name
    pub name: String,
    /// Parent type (defaults to TOP when added to a type system)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Features declared on this type (not inherited ones)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<FeatureDef>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
            features: Vec::new(),
        }
    }

    /// Declare a feature on this type
    pub fn with_feature(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.features.push(FeatureDef::new(name, range));
        self
    }

    fn root(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            features: Vec::new(),
        }
    }
}

/// Serialized form of a type system: user-declared types, plus features
/// added to built-in types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSystemSpec {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    /// Features added to built-in types; `parent` is ignored
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<TypeDef>,
}

/// A loaded type system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TypeSystemSpec", into = "TypeSystemSpec")]
pub struct TypeSystem {
    types: BTreeMap<String, TypeDef>,
    /// User types in declaration order, for serialization
    declared: Vec<String>,
    /// Features added to built-in types
    extended: BTreeMap<String, Vec<FeatureDef>>,
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem {
    /// Create a type system holding only the built-in types
    pub fn new() -> Self {
        let mut builtins = vec![TypeDef::root(TOP)];
        for primitive in [STRING, INTEGER, BOOLEAN, FLOAT, DOUBLE, LONG, FS_ARRAY] {
            builtins.push(TypeDef::new(primitive, TOP));
        }
        builtins.push(
            TypeDef::new(ANNOTATION, TOP)
                .with_feature("begin", INTEGER)
                .with_feature("end", INTEGER),
        );
        builtins.push(TypeDef::new(DOCUMENT_ANNOTATION, ANNOTATION).with_feature("language", STRING));

        Self {
            types: builtins.into_iter().map(|t| (t.name.clone(), t)).collect(),
            declared: Vec::new(),
            extended: BTreeMap::new(),
        }
    }

    /// Add a type. The parent must already exist; ranges are checked lazily.
    pub fn add_type(&mut self, mut type_def: TypeDef) -> Result<(), CasError> {
        if self.types.contains_key(&type_def.name) {
            return Err(CasError::DuplicateType(type_def.name));
        }
        let parent = type_def.parent.get_or_insert_with(|| TOP.to_string());
        if !self.types.contains_key(parent.as_str()) {
            return Err(CasError::UnknownParent {
                type_name: type_def.name.clone(),
                parent: parent.clone(),
            });
        }

        self.declared.push(type_def.name.clone());
        self.types.insert(type_def.name.clone(), type_def);
        Ok(())
    }

    /// Declare an additional feature on an existing type, built-ins included
    pub fn add_feature(&mut self, type_name: &str, feature: FeatureDef) -> Result<(), CasError> {
        let Some(type_def) = self.types.get_mut(type_name) else {
            return Err(CasError::TypeNotFound {
                caller: "TypeSystem::add_feature".to_string(),
                name: type_name.to_string(),
            });
        };
        if type_def.features.iter().any(|f| f.name == feature.name) {
            return Err(CasError::DuplicateFeature {
                type_name: type_name.to_string(),
                feature: feature.name,
            });
        }

        type_def.features.push(feature.clone());
        if !self.declared.iter().any(|name| name == type_name) {
            self.extended
                .entry(type_name.to_string())
                .or_default()
                .push(feature);
        }
        Ok(())
    }

    /// Builder-style variant of [`TypeSystem::add_type`]
    pub fn with_type(mut self, type_def: TypeDef) -> Result<Self, CasError> {
        self.add_type(type_def)?;
        Ok(self)
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterate over all types, built-ins included
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Chain of type definitions from `name` up to TOP
    fn ancestry<'a>(&'a self, name: &str) -> Vec<&'a TypeDef> {
        let mut chain = Vec::new();
        let mut current = self.types.get(name);
        while let Some(type_def) = current {
            chain.push(type_def);
            current = type_def.parent.as_deref().and_then(|p| self.types.get(p));
        }
        chain
    }

    /// All features of a type, inherited ones first. Empty for unknown types.
    pub fn features_of(&self, name: &str) -> Vec<&FeatureDef> {
        self.ancestry(name)
            .into_iter()
            .rev()
            .flat_map(|t| t.features.iter())
            .collect()
    }

    /// Look up a feature by short name, searching inherited declarations
    pub fn feature(&self, type_name: &str, short_name: &str) -> Option<&FeatureDef> {
        self.ancestry(type_name)
            .into_iter()
            .flat_map(|t| t.features.iter())
            .find(|f| f.name == short_name)
    }

    /// Look up a feature by its full name, e.g. `uima.tcas.DocumentAnnotation:id`
    pub fn feature_by_full_name(&self, full_name: &str) -> Option<&FeatureDef> {
        let (type_name, short_name) = full_name.rsplit_once(FEATURE_SEPARATOR)?;
        self.feature(type_name, short_name)
    }

    /// True if `sub` is `sup` or one of its descendants
    pub fn subsumes(&self, sup: &str, sub: &str) -> bool {
        self.ancestry(sub).iter().any(|t| t.name == sup)
    }

    pub fn is_annotation_type(&self, name: &str) -> bool {
        self.subsumes(ANNOTATION, name)
    }
}

impl TryFrom<TypeSystemSpec> for TypeSystem {
    type Error = CasError;

    fn try_from(wire: TypeSystemSpec) -> Result<Self, Self::Error> {
        let mut type_system = TypeSystem::new();
        for type_def in wire.types {
            type_system.add_type(type_def)?;
        }
        for extension in wire.extensions {
            for feature in extension.features {
                type_system.add_feature(&extension.name, feature)?;
            }
        }
        Ok(type_system)
    }
}

impl From<TypeSystem> for TypeSystemSpec {
    fn from(mut type_system: TypeSystem) -> Self {
        let types = type_system
            .declared
            .iter()
            .filter_map(|name| type_system.types.remove(name))
            .collect();
        let extensions = std::mem::take(&mut type_system.extended)
            .into_iter()
            .map(|(name, features)| TypeDef {
                name,
                parent: None,
                features,
            })
            .collect();
        TypeSystemSpec { types, extensions }
    }
}

//! Document text plus an arena of feature structures.
//!
//! Feature structures are addressed by [`FsId`], their position in the arena.
//! Annotation spans are the `begin`/`end` Integer features declared on
//! `uima.tcas.Annotation`, measured in characters of the document text.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::error::{CasError, StoreFault};
use super::types::{FeatureDef, RangeKind, TypeSystem, STRING};
use super::value::{default_primitive_string, FeatureValue};

/// Identifier of a feature structure within one [`Cas`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FsId(pub usize);

impl std::fmt::Display for FsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed node with named feature values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStructure {
    /// Concrete type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Stored values; absent features are null
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, FeatureValue>,
}

/// A document with its type system and feature structures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cas {
    type_system: TypeSystem,
    #[serde(default)]
    text: String,
    #[serde(default, rename = "feature_structures")]
    structures: Vec<FeatureStructure>,
    #[serde(skip)]
    char_len: OnceLock<usize>,
}

impl Cas {
    pub fn new(type_system: TypeSystem, text: impl Into<String>) -> Self {
        Self {
            type_system,
            text: text.into(),
            structures: Vec::new(),
            char_len: OnceLock::new(),
        }
    }

    pub fn type_system(&self) -> &TypeSystem {
        &self.type_system
    }

    /// Full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of feature structures
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    fn text_len(&self) -> usize {
        *self.char_len.get_or_init(|| self.text.chars().count())
    }

    /// Create a feature structure of the given type with no values set
    pub fn create_fs(&mut self, type_name: &str) -> Result<FsId, CasError> {
        if !self.type_system.contains(type_name) {
            return Err(CasError::TypeNotFound {
                caller: "Cas::create_fs".to_string(),
                name: type_name.to_string(),
            });
        }

        let id = FsId(self.structures.len());
        self.structures.push(FeatureStructure {
            type_name: type_name.to_string(),
            features: BTreeMap::new(),
        });
        Ok(id)
    }

    /// Create an annotation covering characters `[begin, end)` of the text
    pub fn create_annotation(
        &mut self,
        type_name: &str,
        begin: usize,
        end: usize,
    ) -> Result<FsId, CasError> {
        if self.type_system.contains(type_name) && !self.type_system.is_annotation_type(type_name) {
            return Err(CasError::NotAnnotationType(type_name.to_string()));
        }

        let out_of_bounds = StoreFault::SpanOutOfBounds {
            begin: begin as i64,
            end: end as i64,
            len: self.text_len(),
        };
        if begin > end || end > self.text_len() {
            return Err(out_of_bounds.into());
        }
        let (Ok(begin), Ok(end)) = (i32::try_from(begin), i32::try_from(end)) else {
            return Err(out_of_bounds.into());
        };

        let id = self.create_fs(type_name)?;
        self.set_value(id, "begin", begin)?;
        self.set_value(id, "end", end)?;
        Ok(id)
    }

    pub fn get(&self, id: FsId) -> Result<&FeatureStructure, StoreFault> {
        self.structures
            .get(id.0)
            .ok_or(StoreFault::DanglingReference(id))
    }

    /// Borrowed handle to a feature structure
    pub fn fs(&self, id: FsId) -> Result<FsRef<'_>, StoreFault> {
        let fs = self.get(id)?;
        Ok(FsRef { cas: self, id, fs })
    }

    /// Set a feature by short name. The value must fit the declared range and
    /// references must point at existing structures of a compatible type.
    pub fn set_value(
        &mut self,
        id: FsId,
        feature_name: &str,
        value: impl Into<FeatureValue>,
    ) -> Result<(), CasError> {
        let value = value.into();
        let type_name = &self.get(id)?.type_name;
        let feature = self
            .type_system
            .feature(type_name, feature_name)
            .ok_or_else(|| StoreFault::FeatureNotOnType {
                feature: feature_name.to_string(),
                type_name: type_name.clone(),
            })?;

        if !value.fits(feature) {
            return Err(wrong_accessor(feature, value_kind(&value)).into());
        }
        match &value {
            FeatureValue::Ref(target) => {
                let target_type = &self.get(*target)?.type_name;
                if !self.type_system.subsumes(&feature.range, target_type) {
                    return Err(wrong_accessor(feature, "reference").into());
                }
            }
            FeatureValue::Array(elements) => {
                for element in elements.iter().flatten() {
                    self.get(*element)?;
                }
            }
            _ => {}
        }

        self.structures[id.0]
            .features
            .insert(feature_name.to_string(), value);
        Ok(())
    }

    /// Reset a feature to null
    pub fn clear_value(&mut self, id: FsId, feature_name: &str) -> Result<(), CasError> {
        self.get(id)?;
        self.structures[id.0].features.remove(feature_name);
        Ok(())
    }

    /// Stored value of a feature, checking it is declared on the structure's type
    fn raw_value(&self, id: FsId, feature: &FeatureDef) -> Result<Option<&FeatureValue>, CasError> {
        let fs = self.get(id)?;
        if self.type_system.feature(&fs.type_name, &feature.name).is_none() {
            return Err(StoreFault::FeatureNotOnType {
                feature: feature.name.clone(),
                type_name: fs.type_name.clone(),
            }
            .into());
        }
        Ok(fs.features.get(&feature.name))
    }

    /// String form of a primitive feature. Null strings read as `None`.
    pub fn feature_value_as_string(
        &self,
        id: FsId,
        feature: &FeatureDef,
    ) -> Result<Option<String>, CasError> {
        let RangeKind::Primitive(kind) = feature.range_kind() else {
            return Err(wrong_accessor(feature, "primitive").into());
        };
        match self.raw_value(id, feature)? {
            None => Ok(default_primitive_string(kind)),
            Some(value) if value.primitive_kind() == Some(kind) => Ok(value.primitive_string()),
            Some(value) => Err(wrong_accessor(feature, value_kind(value)).into()),
        }
    }

    /// Value of a String-ranged feature
    pub fn string_value(&self, id: FsId, feature: &FeatureDef) -> Result<Option<String>, CasError> {
        if feature.range != STRING {
            return Err(wrong_accessor(feature, "string").into());
        }
        match self.raw_value(id, feature)? {
            None => Ok(None),
            Some(FeatureValue::String(s)) => Ok(Some(s.clone())),
            Some(value) => Err(wrong_accessor(feature, value_kind(value)).into()),
        }
    }

    /// Target of a reference-ranged feature; `None` when null
    pub fn ref_value(&self, id: FsId, feature: &FeatureDef) -> Result<Option<FsId>, CasError> {
        if feature.range_kind() != RangeKind::Reference {
            return Err(wrong_accessor(feature, "reference").into());
        }
        match self.raw_value(id, feature)? {
            None => Ok(None),
            Some(FeatureValue::Ref(target)) => {
                self.get(*target)?;
                Ok(Some(*target))
            }
            Some(value) => Err(wrong_accessor(feature, value_kind(value)).into()),
        }
    }

    /// Elements of an array-ranged feature; `None` when null
    pub fn array_value(
        &self,
        id: FsId,
        feature: &FeatureDef,
    ) -> Result<Option<&[Option<FsId>]>, CasError> {
        if feature.range_kind() != RangeKind::Array {
            return Err(wrong_accessor(feature, "array").into());
        }
        match self.raw_value(id, feature)? {
            None => Ok(None),
            Some(FeatureValue::Array(elements)) => Ok(Some(elements.as_slice())),
            Some(value) => Err(wrong_accessor(feature, value_kind(value)).into()),
        }
    }

    /// Character span `[begin, end)` of an annotation
    pub fn span(&self, id: FsId) -> Result<(usize, usize), CasError> {
        let fs = self.get(id)?;
        if !self.type_system.is_annotation_type(&fs.type_name) {
            return Err(StoreFault::MissingSpan(id).into());
        }
        let offset = |name: &str| match fs.features.get(name) {
            Some(FeatureValue::Integer(v)) => Ok(*v),
            _ => Err(StoreFault::MissingSpan(id)),
        };
        let (begin, end) = (offset("begin")?, offset("end")?);

        let len = self.text_len();
        if begin < 0 || end < begin || end as usize > len {
            return Err(StoreFault::SpanOutOfBounds {
                begin: begin as i64,
                end: end as i64,
                len,
            }
            .into());
        }
        Ok((begin as usize, end as usize))
    }

    /// Text delimited by an annotation's span
    pub fn covered_text(&self, id: FsId) -> Result<&str, CasError> {
        let (begin, end) = self.span(id)?;
        let start = byte_offset(&self.text, begin);
        let stop = start + byte_offset(&self.text[start..], end - begin);
        Ok(&self.text[start..stop])
    }

    /// All annotations ordered by begin ascending, end descending, then
    /// creation order. Annotations whose span cannot be read come last.
    pub fn annotation_index(&self) -> AnnotationIndex<'_> {
        let mut keyed: Vec<_> = self
            .structures
            .iter()
            .enumerate()
            .filter(|(_, fs)| self.type_system.is_annotation_type(&fs.type_name))
            .map(|(i, _)| {
                let id = FsId(i);
                let key = match self.span(id) {
                    Ok((begin, end)) => (false, begin, Reverse(end)),
                    Err(_) => (true, 0, Reverse(0)),
                };
                (key, id)
            })
            .collect();
        keyed.sort();

        AnnotationIndex {
            cas: self,
            order: keyed.into_iter().map(|(_, id)| id).collect::<Vec<_>>().into_iter(),
        }
    }

    /// Every feature structure of exactly this type, in creation order
    pub fn all_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = FsRef<'a>> + 'a {
        self.structures
            .iter()
            .enumerate()
            .filter(move |(_, fs)| fs.type_name == type_name)
            .map(move |(i, fs)| FsRef {
                cas: self,
                id: FsId(i),
                fs,
            })
    }
}

fn wrong_accessor(feature: &FeatureDef, accessor: &'static str) -> StoreFault {
    StoreFault::WrongAccessor {
        feature: feature.name.clone(),
        range: feature.range.clone(),
        accessor,
    }
}

fn value_kind(value: &FeatureValue) -> &'static str {
    match value {
        FeatureValue::String(_) => "string",
        FeatureValue::Integer(_) => "integer",
        FeatureValue::Boolean(_) => "boolean",
        FeatureValue::Float(_) => "float",
        FeatureValue::Double(_) => "double",
        FeatureValue::Long(_) => "long",
        FeatureValue::Ref(_) => "reference",
        FeatureValue::Array(_) => "array",
    }
}

/// Byte offset of the `chars`-th character, clamped to the end of the text
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Iterator over the annotation index
pub struct AnnotationIndex<'a> {
    cas: &'a Cas,
    order: std::vec::IntoIter<FsId>,
}

impl<'a> Iterator for AnnotationIndex<'a> {
    type Item = FsRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        self.cas.fs(id).ok()
    }
}

/// Borrowed handle to one feature structure
#[derive(Debug, Clone, Copy)]
pub struct FsRef<'a> {
    cas: &'a Cas,
    id: FsId,
    fs: &'a FeatureStructure,
}

impl<'a> FsRef<'a> {
    pub fn id(&self) -> FsId {
        self.id
    }

    pub fn cas(&self) -> &'a Cas {
        self.cas
    }

    /// Concrete type name
    pub fn type_name(&self) -> &'a str {
        &self.fs.type_name
    }

    pub fn structure(&self) -> &'a FeatureStructure {
        self.fs
    }

    /// Feature declared (or inherited) by this structure's type
    pub fn feature(&self, short_name: &str) -> Option<&'a FeatureDef> {
        self.cas.type_system().feature(&self.fs.type_name, short_name)
    }

    pub fn span(&self) -> Result<(usize, usize), CasError> {
        self.cas.span(self.id)
    }

    pub fn begin(&self) -> Result<usize, CasError> {
        Ok(self.span()?.0)
    }

    pub fn end(&self) -> Result<usize, CasError> {
        Ok(self.span()?.1)
    }

    pub fn covered_text(&self) -> Result<&'a str, CasError> {
        self.cas.covered_text(self.id)
    }
}

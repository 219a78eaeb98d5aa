//! Flat, serialization-friendly projection of an annotation.

use std::collections::BTreeMap;

use serde::Serialize;

/// Reserved mapping key mirroring [`FlatRecord::begin`]
pub const BEGIN_KEY: &str = "begin";
/// Reserved mapping key mirroring [`FlatRecord::end`]
pub const END_KEY: &str = "end";

/// Span, covered text, type name and string-valued features of one annotation.
///
/// The feature mapping mirrors the offsets under `"begin"` and `"end"`. Each
/// setter writes only its own key, so both keys exist once both offsets have
/// been set. Those keys cannot be written through [`FlatRecord::insert_feature`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    #[serde(rename = "type")]
    type_name: String,
    begin: usize,
    end: usize,
    covered_text: String,
    features: BTreeMap<String, String>,
}

impl FlatRecord {
    /// Create a record with both offsets set
    pub fn new(
        type_name: impl Into<String>,
        begin: usize,
        end: usize,
        covered_text: impl Into<String>,
    ) -> Self {
        let mut record = Self {
            type_name: type_name.into(),
            covered_text: covered_text.into(),
            ..Default::default()
        };
        record.set_begin(begin);
        record.set_end(end);
        record
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn set_begin(&mut self, begin: usize) {
        self.begin = begin;
        self.features.insert(BEGIN_KEY.to_string(), begin.to_string());
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn set_end(&mut self, end: usize) {
        self.end = end;
        self.features.insert(END_KEY.to_string(), end.to_string());
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }

    pub fn covered_text(&self) -> &str {
        &self.covered_text
    }

    pub fn set_covered_text(&mut self, covered_text: impl Into<String>) {
        self.covered_text = covered_text.into();
    }

    pub fn features(&self) -> &BTreeMap<String, String> {
        &self.features
    }

    /// Record a feature value. Returns false for the reserved offset keys,
    /// which only the offset setters may write.
    pub fn insert_feature(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if name == BEGIN_KEY || name == END_KEY {
            return false;
        }
        self.features.insert(name, value.into());
        true
    }

    pub fn feature_value(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }
}

//! Display rules for reference-valued features.
//!
//! When a feature points at another feature structure, the referenced
//! structure's concrete type decides how a display string is derived. Types
//! without a rule produce no value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const SENTENCE_TYPE: &str = "uima.tt.SentenceAnnotation";
pub const PARAGRAPH_TYPE: &str = "uima.tt.ParagraphAnnotation";
pub const LEMMA_TYPE: &str = "uima.tt.Lemma";
pub const LEMMA_KEY: &str = "key";

/// How to derive a string from a referenced feature structure.
///
/// Written in configuration as `covered_text` or `feature:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReferenceRule {
    /// The referent's covered text
    CoveredText,
    /// The referent's value for a String feature
    StringFeature(String),
}

impl TryFrom<String> for ReferenceRule {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "covered_text" => Ok(ReferenceRule::CoveredText),
            other => match other.strip_prefix("feature:").map(str::trim) {
                Some(name) if !name.is_empty() => Ok(ReferenceRule::StringFeature(name.to_string())),
                _ => Err(format!(
                    "invalid reference rule '{}': expected 'covered_text' or 'feature:<name>'",
                    value
                )),
            },
        }
    }
}

impl From<ReferenceRule> for String {
    fn from(rule: ReferenceRule) -> Self {
        rule.to_string()
    }
}

impl std::fmt::Display for ReferenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceRule::CoveredText => write!(f, "covered_text"),
            ReferenceRule::StringFeature(name) => write!(f, "feature:{}", name),
        }
    }
}

/// Registry of rules keyed by referenced type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRules {
    rules: HashMap<String, ReferenceRule>,
}

impl Default for ReferenceRules {
    /// Sentences and paragraphs display their text, lemmas their key
    fn default() -> Self {
        Self::empty()
            .with_rule(SENTENCE_TYPE, ReferenceRule::CoveredText)
            .with_rule(PARAGRAPH_TYPE, ReferenceRule::CoveredText)
            .with_rule(LEMMA_TYPE, ReferenceRule::StringFeature(LEMMA_KEY.to_string()))
    }
}

impl ReferenceRules {
    /// A registry with no rules
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, type_name: impl Into<String>, rule: ReferenceRule) -> Self {
        self.insert(type_name, rule);
        self
    }

    /// Add or replace the rule for a type
    pub fn insert(&mut self, type_name: impl Into<String>, rule: ReferenceRule) {
        self.rules.insert(type_name.into(), rule);
    }

    pub fn get(&self, type_name: &str) -> Option<&ReferenceRule> {
        self.rules.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules sorted by type name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceRule)> {
        let mut entries: Vec<_> = self.rules.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

impl Extend<(String, ReferenceRule)> for ReferenceRules {
    fn extend<I: IntoIterator<Item = (String, ReferenceRule)>>(&mut self, iter: I) {
        self.rules.extend(iter);
    }
}

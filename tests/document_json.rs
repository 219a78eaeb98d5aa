//! Document Format Integration Tests
//!
//! Tests for loading serialized documents and the JSON shape of records.

use casflat::cli::load_document;
use casflat::core::rules::LEMMA_TYPE;
use casflat::{Cas, Extractor};
use tempfile::TempDir;

const DOCUMENT: &str = r#"{
  "type_system": {
    "types": [
      { "name": "uima.tt.Lemma", "features": [{ "name": "key", "range": "uima.cas.String" }] },
      {
        "name": "uima.tt.TokenAnnotation",
        "parent": "uima.tcas.Annotation",
        "features": [
          { "name": "posTag", "range": "uima.cas.String" },
          { "name": "lemma", "range": "uima.tt.Lemma" }
        ]
      }
    ],
    "extensions": [
      { "name": "uima.tcas.DocumentAnnotation", "features": [{ "name": "id", "range": "uima.cas.String" }] }
    ]
  },
  "text": "She runs",
  "feature_structures": [
    { "type": "uima.tt.Lemma", "features": { "key": { "string": "run" } } },
    {
      "type": "uima.tt.TokenAnnotation",
      "features": {
        "begin": { "integer": 4 },
        "end": { "integer": 8 },
        "posTag": { "string": "VBZ" },
        "lemma": { "ref": 0 }
      }
    },
    {
      "type": "uima.tt.TokenAnnotation",
      "features": { "begin": { "integer": 0 }, "end": { "integer": 3 }, "posTag": { "string": "PRP" } }
    }
  ]
}"#;

#[test]
fn test_parse_and_extract_document() {
    let cas: Cas = serde_json::from_str(DOCUMENT).unwrap();
    assert_eq!(cas.len(), 3);
    assert!(cas.type_system().contains(LEMMA_TYPE));
    assert!(cas
        .type_system()
        .feature_by_full_name("uima.tcas.DocumentAnnotation:id")
        .is_some());

    let records = Extractor::default().extract_all_with_features(
        &cas,
        "uima.tt.TokenAnnotation",
        &["posTag", "lemma"],
    );
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].covered_text(), "She");
    assert_eq!(records[0].feature_value("lemma"), Some(""));
    assert_eq!(records[1].covered_text(), "runs");
    assert_eq!(records[1].feature_value("lemma"), Some("run"));
}

#[test]
fn test_record_json_shape() {
    let cas: Cas = serde_json::from_str(DOCUMENT).unwrap();
    let records = Extractor::default().extract_all_with_features(
        &cas,
        "uima.tt.TokenAnnotation",
        &["posTag"],
    );

    let value = serde_json::to_value(&records[1]).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "uima.tt.TokenAnnotation",
            "begin": 4,
            "end": 8,
            "covered_text": "runs",
            "features": { "begin": "4", "end": "8", "posTag": "VBZ" }
        })
    );
}

#[test]
fn test_document_round_trips_through_file() {
    let cas: Cas = serde_json::from_str(DOCUMENT).unwrap();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.json");
    std::fs::write(&path, serde_json::to_string_pretty(&cas).unwrap()).unwrap();

    let loaded = load_document(&path).unwrap();
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        serde_json::to_value(&cas).unwrap()
    );
    assert_eq!(loaded.text(), "She runs");
}

#[test]
fn test_dangling_reference_is_rejected_lazily() {
    let document = DOCUMENT.replace(r#""lemma": { "ref": 0 }"#, r#""lemma": { "ref": 9 }"#);
    let cas: Cas = serde_json::from_str(&document).unwrap();

    // the dangling reference faults only that feature
    let records =
        Extractor::default().extract_all_with_features(&cas, "uima.tt.TokenAnnotation", &["lemma"]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].feature_value("lemma"), Some(""));
}

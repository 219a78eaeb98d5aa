//! Extraction Integration Tests
//!
//! Tests for type filtering, index order, record mirroring and value inference.

use casflat::cas::types::{ANNOTATION, FS_ARRAY, INTEGER, STRING, TOP};
use casflat::core::rules::{LEMMA_TYPE, PARAGRAPH_TYPE, SENTENCE_TYPE};
use casflat::domain::{BEGIN_KEY, END_KEY};
use casflat::{Cas, Extractor, FeatureValue, FsId, SchemaBinding, TypeDef, TypeSystem};

const TOKEN_TYPE: &str = "uima.tt.TokenAnnotation";
const COMPOUND_TYPE: &str = "test.CompoundToken";

fn type_system() -> TypeSystem {
    TypeSystem::new()
        .with_type(TypeDef::new(SENTENCE_TYPE, ANNOTATION))
        .unwrap()
        .with_type(TypeDef::new(PARAGRAPH_TYPE, ANNOTATION))
        .unwrap()
        .with_type(TypeDef::new(LEMMA_TYPE, TOP).with_feature("key", STRING))
        .unwrap()
        .with_type(
            TypeDef::new(TOKEN_TYPE, ANNOTATION)
                .with_feature("posTag", STRING)
                .with_feature("frequency", INTEGER)
                .with_feature("lemma", LEMMA_TYPE)
                .with_feature("sentence", SENTENCE_TYPE)
                .with_feature("paragraph", PARAGRAPH_TYPE)
                .with_feature("parts", FS_ARRAY),
        )
        .unwrap()
        .with_type(TypeDef::new(COMPOUND_TYPE, TOKEN_TYPE))
        .unwrap()
}

/// "Dogs run. Cats sleep." with sentences, tokens and one compound token
fn document() -> Cas {
    let mut cas = Cas::new(type_system(), "Dogs run. Cats sleep.");
    cas.create_annotation(SENTENCE_TYPE, 10, 21).unwrap();
    let first = cas.create_annotation(SENTENCE_TYPE, 0, 9).unwrap();
    let paragraph = cas.create_annotation(PARAGRAPH_TYPE, 0, 21).unwrap();

    for (begin, end, tag) in [(15, 20, "VBZ"), (0, 4, "NNS"), (5, 8, "VBP"), (10, 14, "NNS")] {
        let token = cas.create_annotation(TOKEN_TYPE, begin, end).unwrap();
        cas.set_value(token, "posTag", tag).unwrap();
    }
    cas.create_annotation(COMPOUND_TYPE, 0, 8).unwrap();

    let run = cas.create_fs(LEMMA_TYPE).unwrap();
    cas.set_value(run, "key", "run").unwrap();
    let token = token_at(&cas, 5);
    cas.set_value(token, "lemma", run).unwrap();
    cas.set_value(token, "sentence", first).unwrap();
    cas.set_value(token, "paragraph", paragraph).unwrap();
    cas
}

fn token_at(cas: &Cas, begin: usize) -> FsId {
    cas.all_of_type(TOKEN_TYPE)
        .find(|t| t.begin().unwrap() == begin)
        .map(|t| t.id())
        .unwrap()
}

#[test]
fn test_extract_all_exact_type_in_index_order() {
    let cas = document();
    let extractor = Extractor::default();

    let tokens = extractor.extract_all(&cas, TOKEN_TYPE);
    let spans: Vec<_> = tokens.iter().map(|t| t.span().unwrap()).collect();
    assert_eq!(spans, vec![(0, 4), (5, 8), (10, 14), (15, 20)]);
    assert!(tokens.iter().all(|t| t.type_name() == TOKEN_TYPE));

    // subtype instances are not returned for the parent type
    let compounds = extractor.extract_all(&cas, COMPOUND_TYPE);
    assert_eq!(compounds.len(), 1);
    assert_eq!(compounds[0].covered_text().unwrap(), "Dogs run");

    let sentences = extractor.extract_all(&cas, SENTENCE_TYPE);
    let texts: Vec<_> = sentences.iter().map(|s| s.covered_text().unwrap()).collect();
    assert_eq!(texts, vec!["Dogs run.", "Cats sleep."]);
}

#[test]
fn test_unknown_type_yields_empty() {
    let cas = document();
    let extractor = Extractor::default();

    assert!(extractor.extract_all(&cas, "no.Such.Type").is_empty());
    assert!(extractor
        .extract_all_with_features(&cas, "no.Such.Type", &["posTag"])
        .is_empty());
    assert!(extractor
        .extract_all_selecting(&cas, "no.Such.Type", true)
        .is_empty());

    // declared but never instantiated
    assert!(extractor.extract_all(&cas, LEMMA_TYPE).is_empty());
}

#[test]
fn test_begin_end_always_mirrored() {
    let cas = document();
    let extractor = Extractor::default();

    let records = extractor.extract_all_with_features(&cas, TOKEN_TYPE, &["posTag", "begin", "end"]);
    assert_eq!(records.len(), 4);
    for record in &records {
        assert_eq!(record.feature_value(BEGIN_KEY), Some(record.begin().to_string().as_str()));
        assert_eq!(record.feature_value(END_KEY), Some(record.end().to_string().as_str()));
    }

    // mirrored even when not requested
    let records = extractor.extract_all_with_features::<&str>(&cas, TOKEN_TYPE, &[]);
    assert_eq!(records[1].feature_value(BEGIN_KEY), Some("5"));
    assert_eq!(records[1].feature_value(END_KEY), Some("8"));
    assert_eq!(records[1].features().len(), 2);
}

#[test]
fn test_single_sentence_record() {
    let ts = TypeSystem::new()
        .with_type(TypeDef::new(SENTENCE_TYPE, ANNOTATION))
        .unwrap();
    // "Hello world." is 12 characters, so the sentence ends at offset 12
    let mut cas = Cas::new(ts, "Hello world.");
    cas.create_annotation(SENTENCE_TYPE, 0, 12).unwrap();

    let records =
        Extractor::default().extract_all_with_features(&cas, SENTENCE_TYPE, &["begin", "end"]);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.begin(), 0);
    assert_eq!(record.end(), 12);
    assert_eq!(record.covered_text(), "Hello world.");
    assert_eq!(record.type_name(), SENTENCE_TYPE);
    assert_eq!(record.features().len(), 2);
    assert_eq!(record.feature_value("begin"), Some("0"));
    assert_eq!(record.feature_value("end"), Some("12"));
}

#[test]
fn test_missing_feature_recorded_as_empty() {
    let cas = document();
    let records =
        Extractor::default().extract_all_with_features(&cas, TOKEN_TYPE, &["posTag", "chunk"]);

    for record in &records {
        assert_eq!(record.feature_value("chunk"), Some(""));
    }
    assert_eq!(records[0].feature_value("posTag"), Some("NNS"));
}

#[test]
fn test_value_inference_by_range() {
    let cas = document();
    let records = Extractor::default().extract_all_with_features(
        &cas,
        TOKEN_TYPE,
        &["lemma", "sentence", "paragraph", "frequency", "parts"],
    );

    // token "run"
    let run = &records[1];
    assert_eq!(run.feature_value("lemma"), Some("run"));
    assert_eq!(run.feature_value("sentence"), Some("Dogs run."));
    assert_eq!(run.feature_value("paragraph"), Some("Dogs run. Cats sleep."));
    assert_eq!(run.feature_value("frequency"), Some("0"));
    // null array is a fault, recorded as empty
    assert_eq!(run.feature_value("parts"), Some(""));

    // null references are faults too
    let dogs = &records[0];
    assert_eq!(dogs.feature_value("lemma"), Some(""));
    assert_eq!(dogs.feature_value("sentence"), Some(""));
}

#[test]
fn test_array_feature_uses_first_element() {
    let mut cas = document();
    let run = token_at(&cas, 5);
    let dogs = token_at(&cas, 0);
    let cats = token_at(&cas, 10);
    let lemma = cas.all_of_type(LEMMA_TYPE).next().unwrap().id();

    cas.set_value(run, "parts", FeatureValue::Array(vec![Some(dogs), Some(cats)])).unwrap();
    cas.set_value(cats, "parts", FeatureValue::Array(vec![None, Some(dogs)])).unwrap();
    cas.set_value(dogs, "parts", FeatureValue::Array(vec![Some(lemma)])).unwrap();

    let extractor = Extractor::default();
    let records = extractor.extract_all_with_features(&cas, TOKEN_TYPE, &["parts"]);

    // remaining elements are ignored
    assert_eq!(records[1].feature_value("parts"), Some("Dogs"));
    // first element is not an annotation
    assert_eq!(records[0].feature_value("parts"), Some(""));
    // null first element records nothing
    assert_eq!(records[2].feature_value("parts"), None);

    cas.set_value(run, "parts", FeatureValue::Array(Vec::new())).unwrap();
    let records = extractor.extract_all_with_features(&cas, TOKEN_TYPE, &["parts"]);
    assert_eq!(records[1].feature_value("parts"), Some(""));
    let token = cas.fs(run).unwrap();
    assert_eq!(extractor.extract_feature_as_string(token, "parts"), None);
}

#[test]
fn test_include_all_features() {
    let cas = document();
    let extractor = Extractor::default();

    let records = extractor.extract_all_selecting(&cas, TOKEN_TYPE, true);
    let keys: Vec<_> = records[1].features().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["begin", "end", "frequency", "lemma", "paragraph", "parts", "posTag", "sentence"]
    );
    assert_eq!(records[1].feature_value("posTag"), Some("VBP"));

    let bare = extractor.extract_all_selecting(&cas, TOKEN_TYPE, false);
    assert_eq!(bare.len(), 4);
    assert_eq!(bare[1].features().len(), 2);
}

#[test]
fn test_extract_bound_matches_unbound() {
    let cas = document();
    let extractor = Extractor::default();

    let binding = SchemaBinding::bind(cas.type_system(), "test", TOKEN_TYPE, &["posTag", "lemma"]).unwrap();
    assert_eq!(
        extractor.extract_bound(&cas, &binding),
        extractor.extract_all_with_features(&cas, TOKEN_TYPE, &["posTag", "lemma"])
    );

    let err = SchemaBinding::bind(cas.type_system(), "test", TOKEN_TYPE, &["chunk"]).unwrap_err();
    assert!(err.to_string().contains("chunk"));
}

#[test]
fn test_extraction_is_idempotent() {
    let cas = document();
    let extractor = Extractor::default();
    let features = ["posTag", "lemma", "sentence", "missing"];

    let first = extractor.extract_all_with_features(&cas, TOKEN_TYPE, &features);
    let second = extractor.extract_all_with_features(&cas, TOKEN_TYPE, &features);
    assert_eq!(first, second);
}

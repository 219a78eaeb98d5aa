//! Document Metadata Integration Tests
//!
//! Tests for collecting crawler and classification name/value pairs.

use casflat::cas::types::{DOCUMENT_ANNOTATION, STRING, TOP};
use casflat::cas::FeatureDef;
use casflat::core::metadata::{CLASSIFICATION_META_FIELD_TYPE, CRAWLER_META_FIELD_TYPE};
use casflat::{extract_meta_fields, extract_source_meta_fields, Cas, MetaFieldSource, TypeDef, TypeSystem};

fn meta_type(name: &str) -> TypeDef {
    TypeDef::new(name, TOP)
        .with_feature("name", STRING)
        .with_feature("value", STRING)
}

fn crawled_type_system() -> TypeSystem {
    let mut ts = TypeSystem::new()
        .with_type(meta_type(CRAWLER_META_FIELD_TYPE))
        .unwrap()
        .with_type(meta_type(CLASSIFICATION_META_FIELD_TYPE))
        .unwrap();
    ts.add_feature(DOCUMENT_ANNOTATION, FeatureDef::new("id", STRING))
        .unwrap();
    ts
}

fn add_pair(cas: &mut Cas, type_name: &str, name: &str, value: Option<&str>) {
    let field = cas.create_fs(type_name).unwrap();
    cas.set_value(field, "name", name).unwrap();
    if let Some(value) = value {
        cas.set_value(field, "value", value).unwrap();
    }
}

#[test]
fn test_collects_non_empty_pairs() {
    let mut cas = Cas::new(crawled_type_system(), "body");
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "title", Some("Quarterly report"));
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "author", Some(""));
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "date", None);
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "", Some("orphan"));
    add_pair(&mut cas, CLASSIFICATION_META_FIELD_TYPE, "category", Some("finance"));

    let crawler = extract_source_meta_fields(&cas, MetaFieldSource::Crawler);
    assert_eq!(crawler.len(), 1);
    assert_eq!(crawler.get("title"), Some("Quarterly report"));

    let classification = extract_source_meta_fields(&cas, MetaFieldSource::Classification);
    assert_eq!(classification.len(), 1);
    assert_eq!(classification.get("category"), Some("finance"));
}

#[test]
fn test_later_pairs_overwrite_earlier() {
    let mut cas = Cas::new(crawled_type_system(), "");
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "lang", Some("de"));
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "lang", Some("en"));

    let fields = extract_meta_fields(&cas, CRAWLER_META_FIELD_TYPE);
    assert_eq!(fields.get("lang"), Some("en"));
}

#[test]
fn test_missing_schema_yields_empty() {
    // no document id on the type system
    let ts = TypeSystem::new()
        .with_type(meta_type(CRAWLER_META_FIELD_TYPE))
        .unwrap();
    let mut cas = Cas::new(ts, "");
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "title", Some("x"));
    assert!(extract_meta_fields(&cas, CRAWLER_META_FIELD_TYPE).is_empty());

    // unknown metadata type
    let cas = Cas::new(crawled_type_system(), "");
    assert!(extract_meta_fields(&cas, "no.Such.MetaField").is_empty());
}

#[test]
fn test_meta_fields_serialize_as_map() {
    let mut cas = Cas::new(crawled_type_system(), "");
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "title", Some("Report"));
    add_pair(&mut cas, CRAWLER_META_FIELD_TYPE, "author", Some("Kim"));

    let fields = extract_source_meta_fields(&cas, MetaFieldSource::Crawler);
    let json = serde_json::to_string(&fields).unwrap();
    assert_eq!(json, r#"{"author":"Kim","title":"Report"}"#);
}

//! Tag Round-Trip Tests
//!
//! Tests for the tag value model across both encodings:
//! - Every variant survives the document form and the wire form
//! - Normalization is applied on read, never stored
//! - Nested list containers recurse through the same rules
//! - Schemas loaded from disk drive decoding

use std::fs;
use std::sync::Arc;

use chrono::{FixedOffset, TimeZone, Utc};
use serde_json::json;
use tagstore::record::Record;
use tagstore::schema::{SchemaError, SchemaLoader, StructureDefinition, TagDefinition};
use tagstore::tag::{DecodeError, Tag, TagContainer, TagError, TagValue, UNRECOGNIZED_INDEX, UNRECOGNIZED_LABEL};
use tagstore::validation::{Rule, TagInput};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn every_type() -> StructureDefinition {
    StructureDefinition::new(
        "samples",
        vec![
            TagDefinition::boolean("flag", "Flag"),
            TagDefinition::long("count", "Count").with_range(0.0, 100.0),
            TagDefinition::double("ratio", "Ratio").with_range(0.0, 1.0),
            TagDefinition::string("label", "Label"),
            TagDefinition::enumeration("color", "Color", ["red", "green", "blue"]),
            TagDefinition::date("taken", "Taken"),
            TagDefinition::list(
                "readings",
                "Readings",
                vec![
                    TagDefinition::double("value", "Value"),
                    TagDefinition::string("unit", "Unit"),
                ],
            ),
        ],
    )
}

fn def(structure: &StructureDefinition, key: &str) -> Arc<TagDefinition> {
    structure.definition(key).unwrap().clone()
}

fn full_container(structure: &StructureDefinition) -> TagContainer {
    let readings = def(structure, "readings");
    let value = readings.entry("value").unwrap().clone();
    let unit = readings.entry("unit").unwrap().clone();
    let reading = TagContainer::from_tags(vec![
        Tag::double(value, 21.5).unwrap(),
        Tag::string(unit, "C").unwrap(),
    ])
    .unwrap();

    TagContainer::from_tags(vec![
        Tag::boolean(def(structure, "flag"), true).unwrap(),
        Tag::long(def(structure, "count"), 42).unwrap(),
        Tag::double(def(structure, "ratio"), 0.25).unwrap(),
        Tag::string(def(structure, "label"), "sample \"A\"").unwrap(),
        Tag::enumeration(def(structure, "color"), 2).unwrap(),
        Tag::date(def(structure, "taken"), Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap()).unwrap(),
        Tag::list(readings, vec![reading, TagContainer::new()]).unwrap(),
    ])
    .unwrap()
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

/// Every variant survives the document encoding.
#[test]
fn test_document_round_trip_every_variant() {
    let structure = every_type();
    let container = full_container(&structure);

    let document = container.to_document();
    let back = TagContainer::from_document(structure.definitions(), &document).unwrap();
    assert_eq!(back, container);
}

/// Every variant survives the wire encoding.
#[test]
fn test_wire_round_trip_every_variant() {
    let structure = every_type();
    let container = full_container(&structure);

    let bytes = container.encode_wire().unwrap();
    let back = TagContainer::decode_wire(structure.definitions(), &bytes).unwrap();
    assert_eq!(back, container);
}

/// Out-of-range values are stored raw, so both encodings keep them.
#[test]
fn test_out_of_range_values_round_trip_raw() {
    let structure = every_type();
    let container = TagContainer::from_tags(vec![
        Tag::long(def(&structure, "count"), 500).unwrap(),
        Tag::enumeration(def(&structure, "color"), 7).unwrap(),
    ])
    .unwrap();

    let document = container.to_document();
    assert_eq!(json!(document), json!({"count": 500, "color": 7}));

    let back = TagContainer::from_document(structure.definitions(), &document).unwrap();
    assert_eq!(back.get("count").unwrap().raw_value(), &TagValue::Long(500));
    assert_eq!(back.get("count").unwrap().as_long(), Some(100));
    assert_eq!(back.get("color").unwrap().raw_value(), &TagValue::Enum(7));
    assert_eq!(back.get("color").unwrap().enum_label(), Some(UNRECOGNIZED_LABEL));
}

// =============================================================================
// Normalization Tests
// =============================================================================

/// Numeric values clamp to [min, max] when read.
#[test]
fn test_numeric_clamping() {
    let structure = every_type();
    let count = def(&structure, "count");
    let ratio = def(&structure, "ratio");

    assert_eq!(Tag::long(count.clone(), -3).unwrap().as_long(), Some(0));
    assert_eq!(Tag::long(count.clone(), 300).unwrap().as_long(), Some(100));
    assert_eq!(Tag::long(count, 55).unwrap().as_long(), Some(55));

    assert_eq!(Tag::double(ratio.clone(), -0.5).unwrap().as_double(), Some(0.0));
    assert_eq!(Tag::double(ratio.clone(), 1.5).unwrap().as_double(), Some(1.0));
    assert_eq!(Tag::double(ratio, 0.3).unwrap().as_double(), Some(0.3));
}

/// Negative indices store the sentinel; upper out-of-range indices are kept.
#[test]
fn test_enum_sentinel() {
    let structure = every_type();
    let color = def(&structure, "color");

    let negative = Tag::enumeration(color.clone(), -5).unwrap();
    assert_eq!(negative.raw_value(), &TagValue::Enum(UNRECOGNIZED_INDEX));
    assert_eq!(negative.enum_label(), Some("UNRECOGNIZED"));

    let high = Tag::enumeration(color, 3).unwrap();
    assert_eq!(high.raw_value(), &TagValue::Enum(3));
    assert_eq!(high.enum_index(), Some(UNRECOGNIZED_INDEX));
    assert_eq!(high.canonical(), r#""color": "UNRECOGNIZED""#);
}

/// Dates in any offset are stored in UTC.
#[test]
fn test_dates_normalize_to_utc() {
    let structure = every_type();
    let taken = def(&structure, "taken");
    let local = FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, 20, 30, 0)
        .unwrap();

    let container = TagContainer::from_tags(vec![Tag::date(taken, local).unwrap()]).unwrap();
    assert_eq!(json!(container.to_document()), json!({"taken": "2024-03-02T01:30:00Z"}));
}

// =============================================================================
// Error Tests
// =============================================================================

/// Constructing a tag against a definition of another type fails.
#[test]
fn test_type_mismatch_on_construct() {
    let structure = every_type();
    let result = Tag::string(def(&structure, "count"), "many");
    assert!(matches!(result, Err(TagError::TypeMismatch { .. })));
}

/// Non-finite doubles have no encoding and never become tags.
#[test]
fn test_non_finite_double_never_becomes_a_tag() {
    let structure = every_type();
    let ratio = def(&structure, "ratio");

    for v in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        assert_eq!(Tag::double(ratio.clone(), v), Err(TagError::NonFinite("ratio".into())));

        let mut input = TagInput::new(ratio.clone());
        input.set_value(Some(TagValue::Double(v)));
        assert_eq!(input.get_tag().unwrap_err().rule(), Rule::Other);
    }

    // The largest finite value still survives both encodings
    let container = TagContainer::from_tags(vec![Tag::double(def(&structure, "ratio"), f64::MAX).unwrap()]).unwrap();
    let back = TagContainer::from_document(structure.definitions(), &container.to_document()).unwrap();
    assert_eq!(back, container);
    let bytes = container.encode_wire().unwrap();
    assert_eq!(TagContainer::decode_wire(structure.definitions(), &bytes).unwrap(), container);
}

/// Schema files whose LONG bounds hold no integer are rejected.
#[test]
fn test_schema_long_bounds_without_integer() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("schema.json");
    fs::write(
        &path,
        json!({
            "name": "narrow",
            "definitions": [{"key": "n", "name": "N", "type": "LONG", "min": 0.5, "max": 0.7}]
        })
        .to_string(),
    )
    .unwrap();

    let mut loader = SchemaLoader::new();
    assert!(matches!(loader.load_file(&path), Err(SchemaError::InvalidDefinition { .. })));
    assert!(loader.names().is_empty());
}

/// A document value of the wrong JSON type is a decode error.
#[test]
fn test_decode_type_mismatch() {
    let structure = every_type();
    let document = json!({"flag": "yes"});
    let result = TagContainer::from_document(structure.definitions(), document.as_object().unwrap());
    assert!(matches!(result, Err(DecodeError::TypeMismatch { .. })));
}

/// A null string is rejected.
#[test]
fn test_decode_null_string() {
    let structure = every_type();
    let document = json!({"label": null});
    let result = TagContainer::from_document(structure.definitions(), document.as_object().unwrap());
    assert_eq!(result, Err(DecodeError::NullValue("label".into())));
}

// =============================================================================
// End-to-End Tests
// =============================================================================

/// name/children schema loaded from disk round-trips a full record.
#[test]
fn test_end_to_end_name_and_children() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("schema.json");
    fs::write(
        &path,
        json!({
            "name": "family",
            "definitions": [
                {"key": "name", "name": "Name", "type": "STRING", "required": true, "min": 1, "max": 20},
                {"key": "children", "name": "Children", "type": "LIST", "min": 0,
                 "entries": [{"key": "child", "name": "Child", "type": "LONG"}]}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let mut loader = SchemaLoader::new();
    loader.load_file(&path).unwrap();
    let structure = loader.get("family").unwrap();

    let name = structure.definition("name").unwrap().clone();
    let children = structure.definition("children").unwrap().clone();
    let child = children.entry("child").unwrap().clone();
    let entries = [1, 2, 3]
        .iter()
        .map(|n| TagContainer::from_tags(vec![Tag::long(child.clone(), *n).unwrap()]).unwrap())
        .collect();

    let mut record = Record::new(Some("owner".into()));
    record
        .annotate(
            vec![Tag::string(name, "Ada").unwrap(), Tag::list(children, entries).unwrap()],
            "editor",
        )
        .unwrap();

    let document = record.to_document();
    assert_eq!(document["tags"], json!({"name": "Ada", "children": [1, 2, 3]}));

    let back = Record::from_document(&structure, &document).unwrap();
    assert_eq!(back.tags, record.tags);
    assert_eq!(back, record);
}

//! Tag definitions and structure definitions
//!
//! Supported tag types:
//! - BOOL: boolean flag
//! - LONG: 64-bit signed integer, clamped to `[min, max]` on read
//! - DOUBLE: 64-bit float, clamped to `[min, max]` on read
//! - STRING: text whose length must satisfy `[min, max]`
//! - ENUM: index into an ordered list of labels
//! - DATE: UTC timestamp
//! - LIST: ordered entries, each a container of the nested `entries` schema
//!
//! Definitions are published once and then shared behind `Arc` by every tag
//! and query element that targets them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::errors::{SchemaError, SchemaResult};

/// Closed set of tag types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagType {
    Bool,
    Long,
    Double,
    String,
    Enum,
    Date,
    List,
}

impl TagType {
    /// Returns the type name used in documents and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::Bool => "BOOL",
            TagType::Long => "LONG",
            TagType::Double => "DOUBLE",
            TagType::String => "STRING",
            TagType::Enum => "ENUM",
            TagType::Date => "DATE",
            TagType::List => "LIST",
        }
    }

    /// Returns true for types whose `min`/`max` are numeric value bounds
    pub fn is_numeric(&self) -> bool {
        matches!(self, TagType::Long | TagType::Double)
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value an enabler's selector must hold, by index or by label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnablerValue {
    Index(i32),
    Label(String),
}

/// Conditional-relevance rule: the owning definition is only active while the
/// enum tag `selector` holds `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enabler {
    /// Key of the enum-typed tag that switches the field on
    pub selector: String,
    pub value: EnablerValue,
}

impl Enabler {
    pub fn by_index(selector: impl Into<String>, index: i32) -> Self {
        Self {
            selector: selector.into(),
            value: EnablerValue::Index(index),
        }
    }

    pub fn by_label(selector: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            value: EnablerValue::Label(label.into()),
        }
    }
}

/// Immutable schema descriptor for one field.
///
/// `min`/`max` mean numeric range for LONG/DOUBLE, character count for
/// STRING and entry count for LIST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Stable identifier, unique within a structure
    pub key: String,
    /// Display label
    pub name: String,
    #[serde(rename = "type")]
    pub tag_type: TagType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Ordered labels, only for ENUM
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabler: Option<Enabler>,
    /// Schema of one list entry, only for LIST
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Arc<TagDefinition>>,
}

// Bounds are checked to be finite by `validate_structure`, so equality is total.
impl Eq for TagDefinition {}

impl Hash for TagDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.tag_type.hash(state);
        self.required.hash(state);
        self.enumerators.hash(state);
    }
}

impl TagDefinition {
    fn with_type(key: impl Into<String>, name: impl Into<String>, tag_type: TagType) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            tag_type,
            required: false,
            min: None,
            max: None,
            enumerators: Vec::new(),
            enabler: None,
            entries: Vec::new(),
        }
    }

    /// Create an optional boolean definition
    pub fn boolean(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_type(key, name, TagType::Bool)
    }

    /// Create an optional integer definition
    pub fn long(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_type(key, name, TagType::Long)
    }

    /// Create an optional floating point definition
    pub fn double(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_type(key, name, TagType::Double)
    }

    /// Create an optional text definition
    pub fn string(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_type(key, name, TagType::String)
    }

    /// Create an optional enum definition over the given labels
    pub fn enumeration<I, S>(key: impl Into<String>, name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut def = Self::with_type(key, name, TagType::Enum);
        def.enumerators = labels.into_iter().map(Into::into).collect();
        def
    }

    /// Create an optional timestamp definition
    pub fn date(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_type(key, name, TagType::Date)
    }

    /// Create an optional list definition whose entries follow `entries`
    pub fn list<I>(key: impl Into<String>, name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = TagDefinition>,
    {
        let mut def = Self::with_type(key, name, TagType::List);
        def.entries = entries.into_iter().map(Arc::new).collect();
        def
    }

    /// Marks the definition as mandatory
    pub fn mandatory(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_min(min).with_max(max)
    }

    pub fn with_enabler(mut self, enabler: Enabler) -> Self {
        self.enabler = Some(enabler);
        self
    }

    /// Publishes the definition for sharing
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Lower bound for LONG values, rounded into the range
    pub fn long_min(&self) -> Option<i64> {
        self.min.map(|m| m.ceil() as i64)
    }

    /// Upper bound for LONG values, rounded into the range
    pub fn long_max(&self) -> Option<i64> {
        self.max.map(|m| m.floor() as i64)
    }

    /// Returns the label at `index`, if it names an enumerator
    pub fn enum_label(&self, index: i32) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.enumerators.get(i))
            .map(String::as_str)
    }

    /// Position of `label` among the enumerators
    pub fn enum_index(&self, label: &str) -> Option<i32> {
        self.enumerators
            .iter()
            .position(|l| l == label)
            .and_then(|i| i32::try_from(i).ok())
    }

    /// Looks up a nested list entry definition by key
    pub fn entry(&self, key: &str) -> Option<&Arc<TagDefinition>> {
        self.entries.iter().find(|d| d.key == key)
    }

    /// The only entry definition of a single-valued list.
    ///
    /// Entries of such lists are persisted as bare values without keys.
    pub fn single_entry(&self) -> Option<&Arc<TagDefinition>> {
        match self.entries.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Validates the definition itself (not a value)
    pub fn validate_structure(&self) -> SchemaResult<()> {
        let invalid = |reason: &str| SchemaError::InvalidDefinition {
            key: self.key.clone(),
            reason: reason.to_string(),
        };

        if self.key.trim().is_empty() {
            return Err(invalid("key must not be empty"));
        }

        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(invalid("bounds must be finite"));
            }
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(invalid("min must not exceed max"));
            }
        }

        if let (TagType::Long, Some(lo), Some(hi)) = (self.tag_type, self.long_min(), self.long_max()) {
            if lo > hi {
                return Err(invalid("bounds must contain an integer"));
            }
        }

        if matches!(self.tag_type, TagType::String | TagType::List) && self.min.map_or(false, |m| m < 0.0) {
            return Err(invalid("length bounds must not be negative"));
        }

        if (self.tag_type == TagType::Enum) == self.enumerators.is_empty() {
            return Err(invalid("enumerators must be present exactly for ENUM"));
        }

        if (self.tag_type == TagType::List) == self.entries.is_empty() {
            return Err(invalid("entries must be present exactly for LIST"));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.key.as_str()) {
                return Err(SchemaError::DuplicateKey(entry.key.clone()));
            }
            entry.validate_structure()?;
        }

        Ok(())
    }
}

/// Ordered set of tag definitions describing one record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDefinition {
    pub name: String,
    pub definitions: Vec<Arc<TagDefinition>>,
}

impl StructureDefinition {
    pub fn new<I>(name: impl Into<String>, definitions: I) -> Self
    where
        I: IntoIterator<Item = TagDefinition>,
    {
        Self {
            name: name.into(),
            definitions: definitions.into_iter().map(Arc::new).collect(),
        }
    }

    /// Looks up a top-level definition by key
    pub fn definition(&self, key: &str) -> Option<&Arc<TagDefinition>> {
        self.definitions.iter().find(|d| d.key == key)
    }

    pub fn definitions(&self) -> &[Arc<TagDefinition>] {
        &self.definitions
    }

    /// Validates every definition, key uniqueness and enabler targets
    pub fn validate_structure(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for def in &self.definitions {
            if !seen.insert(def.key.as_str()) {
                return Err(SchemaError::DuplicateKey(def.key.clone()));
            }
            def.validate_structure()?;
        }

        validate_enablers(&self.definitions)
    }
}

/// Enablers may only reference enum siblings within the same container
fn validate_enablers(siblings: &[Arc<TagDefinition>]) -> SchemaResult<()> {
    for def in siblings {
        if let Some(enabler) = &def.enabler {
            let invalid = |reason: &str| SchemaError::InvalidEnabler {
                key: def.key.clone(),
                selector: enabler.selector.clone(),
                reason: reason.to_string(),
            };

            let selector = siblings
                .iter()
                .find(|d| d.key == enabler.selector)
                .ok_or_else(|| invalid("selector is not defined"))?;

            if selector.tag_type != TagType::Enum {
                return Err(invalid("selector is not an ENUM"));
            }

            let known = match &enabler.value {
                EnablerValue::Index(i) => selector.enum_label(*i).is_some(),
                EnablerValue::Label(l) => selector.enum_index(l).is_some(),
            };
            if !known {
                return Err(invalid("value is not one of the selector's enumerators"));
            }
        }

        validate_enablers(&def.entries)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_structure() -> StructureDefinition {
        StructureDefinition::new(
            "sample",
            vec![
                TagDefinition::string("name", "Name").mandatory().with_range(1.0, 20.0),
                TagDefinition::enumeration("kind", "Kind", ["plant", "animal"]),
                TagDefinition::long("legs", "Legs")
                    .with_range(0.0, 8.0)
                    .with_enabler(Enabler::by_label("kind", "animal")),
                TagDefinition::list("children", "Children", vec![TagDefinition::long("child", "Child")]),
            ],
        )
    }

    #[test]
    fn test_structure_valid() {
        assert!(sample_structure().validate_structure().is_ok());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let structure = StructureDefinition::new(
            "dup",
            vec![TagDefinition::boolean("a", "A"), TagDefinition::long("a", "A2")],
        );
        assert!(matches!(
            structure.validate_structure(),
            Err(SchemaError::DuplicateKey(k)) if k == "a"
        ));
    }

    #[test]
    fn test_enumerators_only_for_enum() {
        let mut def = TagDefinition::string("s", "S");
        def.enumerators = vec!["x".into()];
        assert!(def.validate_structure().is_err());

        let empty_enum = TagDefinition::enumeration("e", "E", Vec::<String>::new());
        assert!(empty_enum.validate_structure().is_err());
    }

    #[test]
    fn test_list_requires_entries() {
        let list = TagDefinition::list("l", "L", Vec::new());
        assert!(list.validate_structure().is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let def = TagDefinition::long("n", "N").with_range(5.0, 1.0);
        assert!(def.validate_structure().is_err());
    }

    #[test]
    fn test_long_bounds_without_integer_rejected() {
        let def = TagDefinition::long("n", "N").with_range(0.5, 0.7);
        assert!(matches!(
            def.validate_structure(),
            Err(SchemaError::InvalidDefinition { .. })
        ));

        let double = TagDefinition::double("x", "X").with_range(0.5, 0.7);
        assert!(double.validate_structure().is_ok());
        let single = TagDefinition::long("n", "N").with_range(0.5, 1.0);
        assert!(single.validate_structure().is_ok());
    }

    #[test]
    fn test_enabler_must_target_enum() {
        let structure = StructureDefinition::new(
            "bad",
            vec![
                TagDefinition::boolean("flag", "Flag"),
                TagDefinition::long("n", "N").with_enabler(Enabler::by_index("flag", 0)),
            ],
        );
        assert!(matches!(
            structure.validate_structure(),
            Err(SchemaError::InvalidEnabler { .. })
        ));
    }

    #[test]
    fn test_enabler_unknown_label() {
        let structure = StructureDefinition::new(
            "bad",
            vec![
                TagDefinition::enumeration("kind", "Kind", ["a", "b"]),
                TagDefinition::long("n", "N").with_enabler(Enabler::by_label("kind", "c")),
            ],
        );
        assert!(structure.validate_structure().is_err());
    }

    #[test]
    fn test_long_bounds_round_inward() {
        let def = TagDefinition::long("n", "N").with_range(0.5, 9.5);
        assert_eq!(def.long_min(), Some(1));
        assert_eq!(def.long_max(), Some(9));
    }

    #[test]
    fn test_enum_label_lookup() {
        let def = TagDefinition::enumeration("kind", "Kind", ["plant", "animal"]);
        assert_eq!(def.enum_label(1), Some("animal"));
        assert_eq!(def.enum_label(2), None);
        assert_eq!(def.enum_label(-1), None);
        assert_eq!(def.enum_index("plant"), Some(0));
    }

    #[test]
    fn test_definition_json_shape() {
        let def = TagDefinition::enumeration("kind", "Kind", ["a"]).mandatory();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "ENUM");
        assert_eq!(json["required"], true);
        assert!(json.get("min").is_none());

        let back: TagDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_single_entry() {
        let structure = sample_structure();
        let children = structure.definition("children").unwrap();
        assert_eq!(children.single_entry().map(|d| d.key.as_str()), Some("child"));
        assert!(structure.definition("name").unwrap().single_entry().is_none());
    }
}

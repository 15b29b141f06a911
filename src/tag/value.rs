//! Typed tag values
//!
//! A `Tag` pairs one shared `TagDefinition` with a `TagValue` of the matching
//! variant. Values are stored exactly as given; normalization happens on
//! every read:
//! - LONG/DOUBLE are clamped to the definition's `[min, max]`
//! - ENUM indices outside the enumerators read as the sentinel `-1`
//!
//! Negative enum indices are stored as `-1` directly. Indices past the last
//! enumerator are kept as given so they survive a round trip.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use crate::schema::{TagDefinition, TagType};

use super::container::TagContainer;
use super::errors::TagError;

/// Sentinel index for an enum value that names no enumerator
pub const UNRECOGNIZED_INDEX: i32 = -1;

/// Label rendered for the sentinel
pub const UNRECOGNIZED_LABEL: &str = "UNRECOGNIZED";

/// Raw value of one tag, one variant per tag type
#[derive(Debug, Clone)]
pub enum TagValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    /// Index into the definition's enumerators
    Enum(i32),
    Date(DateTime<Utc>),
    /// One nested container per list entry
    List(Vec<TagContainer>),
}

impl TagValue {
    pub fn tag_type(&self) -> TagType {
        match self {
            TagValue::Bool(_) => TagType::Bool,
            TagValue::Long(_) => TagType::Long,
            TagValue::Double(_) => TagType::Double,
            TagValue::String(_) => TagType::String,
            TagValue::Enum(_) => TagType::Enum,
            TagValue::Date(_) => TagType::Date,
            TagValue::List(_) => TagType::List,
        }
    }

    /// Converts any timestamp to UTC
    pub fn date<Tz: TimeZone>(at: DateTime<Tz>) -> Self {
        TagValue::Date(at.with_timezone(&Utc))
    }
}

// Doubles compare by bit pattern so equality stays reflexive and agrees with Hash.
impl PartialEq for TagValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TagValue::Bool(a), TagValue::Bool(b)) => a == b,
            (TagValue::Long(a), TagValue::Long(b)) => a == b,
            (TagValue::Double(a), TagValue::Double(b)) => a.to_bits() == b.to_bits(),
            (TagValue::String(a), TagValue::String(b)) => a == b,
            (TagValue::Enum(a), TagValue::Enum(b)) => a == b,
            (TagValue::Date(a), TagValue::Date(b)) => a == b,
            (TagValue::List(a), TagValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TagValue {}

impl Hash for TagValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TagValue::Bool(v) => v.hash(state),
            TagValue::Long(v) => v.hash(state),
            TagValue::Double(v) => v.to_bits().hash(state),
            TagValue::String(v) => v.hash(state),
            TagValue::Enum(v) => v.hash(state),
            TagValue::Date(v) => v.hash(state),
            TagValue::List(v) => v.hash(state),
        }
    }
}

/// Immutable typed value bound to a tag definition.
///
/// Equality and hashing cover `(definition, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    definition: Arc<TagDefinition>,
    value: TagValue,
}

impl Tag {
    /// Binds `value` to `definition`.
    ///
    /// # Errors
    ///
    /// `TagError::TypeMismatch` if the definition's type differs from the
    /// value's variant, `TagError::NonFinite` for a NaN or infinite double.
    pub fn new(definition: Arc<TagDefinition>, value: TagValue) -> Result<Self, TagError> {
        if definition.tag_type != value.tag_type() {
            return Err(TagError::TypeMismatch {
                key: definition.key.clone(),
                expected: definition.tag_type,
                actual: value.tag_type(),
            });
        }

        // JSON has no encoding for these
        if let TagValue::Double(v) = value {
            if !v.is_finite() {
                return Err(TagError::NonFinite(definition.key.clone()));
            }
        }

        let value = match value {
            TagValue::Enum(i) if i < 0 => TagValue::Enum(UNRECOGNIZED_INDEX),
            other => other,
        };

        Ok(Self { definition, value })
    }

    pub fn boolean(definition: Arc<TagDefinition>, value: bool) -> Result<Self, TagError> {
        Self::new(definition, TagValue::Bool(value))
    }

    pub fn long(definition: Arc<TagDefinition>, value: i64) -> Result<Self, TagError> {
        Self::new(definition, TagValue::Long(value))
    }

    pub fn double(definition: Arc<TagDefinition>, value: f64) -> Result<Self, TagError> {
        Self::new(definition, TagValue::Double(value))
    }

    pub fn string(definition: Arc<TagDefinition>, value: impl Into<String>) -> Result<Self, TagError> {
        Self::new(definition, TagValue::String(value.into()))
    }

    pub fn enumeration(definition: Arc<TagDefinition>, index: i32) -> Result<Self, TagError> {
        Self::new(definition, TagValue::Enum(index))
    }

    pub fn date<Tz: TimeZone>(definition: Arc<TagDefinition>, at: DateTime<Tz>) -> Result<Self, TagError> {
        Self::new(definition, TagValue::date(at))
    }

    pub fn list(definition: Arc<TagDefinition>, entries: Vec<TagContainer>) -> Result<Self, TagError> {
        Self::new(definition, TagValue::List(entries))
    }

    pub fn definition(&self) -> &Arc<TagDefinition> {
        &self.definition
    }

    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn tag_type(&self) -> TagType {
        self.definition.tag_type
    }

    /// The value exactly as stored, without read-time normalization
    pub fn raw_value(&self) -> &TagValue {
        &self.value
    }

    /// The normalized value. Clones list entries; prefer the typed accessors.
    pub fn value(&self) -> TagValue {
        match &self.value {
            TagValue::Long(_) => TagValue::Long(self.as_long().unwrap_or_default()),
            TagValue::Double(_) => TagValue::Double(self.as_double().unwrap_or_default()),
            TagValue::Enum(_) => TagValue::Enum(self.enum_index().unwrap_or(UNRECOGNIZED_INDEX)),
            other => other.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            TagValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Integer value clamped to the definition's bounds
    pub fn as_long(&self) -> Option<i64> {
        match self.value {
            TagValue::Long(v) => Some(clamp_long(&self.definition, v)),
            _ => None,
        }
    }

    /// Floating point value clamped to the definition's bounds
    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            TagValue::Double(v) => Some(clamp_double(&self.definition, v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            TagValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Enum index, or `-1` when it names no enumerator
    pub fn enum_index(&self) -> Option<i32> {
        match self.value {
            TagValue::Enum(i) => Some(normalize_enum_index(&self.definition, i)),
            _ => None,
        }
    }

    /// Enum label, or `"UNRECOGNIZED"` for the sentinel
    pub fn enum_label(&self) -> Option<&str> {
        match self.value {
            TagValue::Enum(i) => Some(self.definition.enum_label(i).unwrap_or(UNRECOGNIZED_LABEL)),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self.value {
            TagValue::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn entries(&self) -> Option<&[TagContainer]> {
        match &self.value {
            TagValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Deterministic rendering `"key": value` for logs and diffs
    pub fn canonical(&self) -> String {
        format!("{}: {}", quote(self.key()), self.render_value())
    }

    pub(crate) fn render_value(&self) -> String {
        match &self.value {
            TagValue::Bool(v) => v.to_string(),
            TagValue::Long(_) => self.as_long().unwrap_or_default().to_string(),
            TagValue::Double(_) => format!("{:?}", self.as_double().unwrap_or_default()),
            TagValue::String(v) => quote(v),
            TagValue::Enum(_) => quote(self.enum_label().unwrap_or(UNRECOGNIZED_LABEL)),
            TagValue::Date(v) => quote(&format_date(v)),
            TagValue::List(entries) => {
                let parts: Vec<String> = entries.iter().map(TagContainer::canonical).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

pub(crate) fn clamp_long(definition: &TagDefinition, value: i64) -> i64 {
    let mut v = value;
    if let Some(lo) = definition.long_min() {
        v = v.max(lo);
    }
    if let Some(hi) = definition.long_max() {
        v = v.min(hi);
    }
    v
}

pub(crate) fn clamp_double(definition: &TagDefinition, value: f64) -> f64 {
    let mut v = value;
    if let Some(lo) = definition.min {
        v = v.max(lo);
    }
    if let Some(hi) = definition.max {
        v = v.min(hi);
    }
    v
}

pub(crate) fn normalize_enum_index(definition: &TagDefinition, index: i32) -> i32 {
    if definition.enum_label(index).is_some() {
        index
    } else {
        UNRECOGNIZED_INDEX
    }
}

/// RFC 3339 in UTC, keeping every sub-second digit
pub(crate) fn format_date(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn quote(text: &str) -> String {
    Value::from(text).to_string()
}

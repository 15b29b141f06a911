//! Wire encoding for tags
//!
//! Unlike the document form, every wire tag carries its own type
//! discriminant: `{"type": "LONG", "key": "age", "value": 3}`. Decoding still
//! checks the discriminant against the schema.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{TagDefinition, TagType};

use super::container::TagContainer;
use super::errors::{DecodeError, DecodeResult};
use super::value::{Tag, TagValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum WireTag {
    Bool { key: String, value: bool },
    Long { key: String, value: i64 },
    Double { key: String, value: f64 },
    String { key: String, value: String },
    Enum { key: String, value: i32 },
    Date { key: String, value: DateTime<Utc> },
    List { key: String, value: Vec<Vec<WireTag>> },
}

impl WireTag {
    pub fn key(&self) -> &str {
        match self {
            WireTag::Bool { key, .. }
            | WireTag::Long { key, .. }
            | WireTag::Double { key, .. }
            | WireTag::String { key, .. }
            | WireTag::Enum { key, .. }
            | WireTag::Date { key, .. }
            | WireTag::List { key, .. } => key,
        }
    }

    pub fn tag_type(&self) -> TagType {
        match self {
            WireTag::Bool { .. } => TagType::Bool,
            WireTag::Long { .. } => TagType::Long,
            WireTag::Double { .. } => TagType::Double,
            WireTag::String { .. } => TagType::String,
            WireTag::Enum { .. } => TagType::Enum,
            WireTag::Date { .. } => TagType::Date,
            WireTag::List { .. } => TagType::List,
        }
    }
}

impl Tag {
    pub fn to_wire(&self) -> WireTag {
        let key = self.key().to_string();
        match self.raw_value() {
            TagValue::Bool(v) => WireTag::Bool { key, value: *v },
            TagValue::Long(v) => WireTag::Long { key, value: *v },
            TagValue::Double(v) => WireTag::Double { key, value: *v },
            TagValue::String(v) => WireTag::String { key, value: v.clone() },
            TagValue::Enum(v) => WireTag::Enum { key, value: *v },
            TagValue::Date(v) => WireTag::Date { key, value: *v },
            TagValue::List(entries) => WireTag::List {
                key,
                value: entries.iter().map(TagContainer::to_wire).collect(),
            },
        }
    }

    /// Rebuilds a tag from its wire form.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the wire discriminant disagrees with the definition,
    /// `UnknownKey` if the wire key is not the definition's key.
    pub fn from_wire(definition: &Arc<TagDefinition>, wire: &WireTag) -> DecodeResult<Tag> {
        if wire.key() != definition.key {
            return Err(DecodeError::UnknownKey(wire.key().to_string()));
        }

        let value = match wire {
            WireTag::Bool { value, .. } => TagValue::Bool(*value),
            WireTag::Long { value, .. } => TagValue::Long(*value),
            WireTag::Double { value, .. } => TagValue::Double(*value),
            WireTag::String { value, .. } => TagValue::String(value.clone()),
            WireTag::Enum { value, .. } => TagValue::Enum(*value),
            WireTag::Date { value, .. } => TagValue::Date(*value),
            WireTag::List { value, .. } => TagValue::List(
                value
                    .iter()
                    .map(|entry| TagContainer::from_wire(&definition.entries, entry))
                    .collect::<DecodeResult<Vec<_>>>()?,
            ),
        };

        Ok(Tag::new(Arc::clone(definition), value)?)
    }
}

impl TagContainer {
    pub fn to_wire(&self) -> Vec<WireTag> {
        self.iter().map(Tag::to_wire).collect()
    }

    pub fn from_wire(definitions: &[Arc<TagDefinition>], wire: &[WireTag]) -> DecodeResult<Self> {
        let tags = wire
            .iter()
            .map(|w| {
                let definition = definitions
                    .iter()
                    .find(|d| d.key == w.key())
                    .ok_or_else(|| DecodeError::UnknownKey(w.key().to_string()))?;
                Tag::from_wire(definition, w)
            })
            .collect::<DecodeResult<Vec<_>>>()?;

        Ok(TagContainer::from_tags(tags)?)
    }

    /// Serializes the container's wire form to JSON bytes
    pub fn encode_wire(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.to_wire())
    }

    pub fn decode_wire(definitions: &[Arc<TagDefinition>], bytes: &[u8]) -> DecodeResult<Self> {
        let wire: Vec<WireTag> =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        Self::from_wire(definitions, &wire)
    }
}

//! Persisted document encoding
//!
//! A container is a JSON object mapping each tag key to its encoded value, in
//! container order:
//! - BOOL → bool, LONG → integer, DOUBLE → number, STRING → string
//! - ENUM → raw integer index
//! - DATE → RFC 3339 string in UTC
//! - LIST → array with one element per entry
//!
//! Entries of a list with a single entry definition are appended as bare
//! values (`[1, 2, 3]`); an empty entry is `null`. All other entries are
//! container objects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::schema::{TagDefinition, TagType};

use super::container::TagContainer;
use super::errors::{DecodeError, DecodeResult};
use super::value::{format_date, Tag, TagValue};

impl Tag {
    /// Writes the value under its key into `document`
    pub fn write_to(&self, document: &mut Map<String, Value>) {
        document.insert(self.key().to_string(), self.encode_value());
    }

    /// Appends the value, without its key, to `list`
    pub fn append_to(&self, list: &mut Vec<Value>) {
        list.push(self.encode_value());
    }

    fn encode_value(&self) -> Value {
        match self.raw_value() {
            TagValue::Bool(v) => Value::Bool(*v),
            TagValue::Long(v) => Value::from(*v),
            TagValue::Double(v) => Value::from(*v),
            TagValue::String(v) => Value::String(v.clone()),
            TagValue::Enum(v) => Value::from(*v),
            TagValue::Date(v) => Value::String(format_date(v)),
            TagValue::List(entries) => {
                let mut list = Vec::with_capacity(entries.len());
                for entry in entries {
                    encode_entry(self.definition(), entry, &mut list);
                }
                Value::Array(list)
            }
        }
    }

    /// Reads the tag for `definition` from `document`.
    ///
    /// # Errors
    ///
    /// - `MissingKey` if the key is absent
    /// - `NullValue` if the key maps to null
    /// - `TypeMismatch` if the stored JSON does not fit the definition's type
    pub fn read_from(definition: &Arc<TagDefinition>, document: &Map<String, Value>) -> DecodeResult<Tag> {
        Self::read_typed(definition.tag_type, definition, document)
    }

    /// Like `read_from`, but also requires the definition to be of `expected` type
    pub fn read_typed(
        expected: TagType,
        definition: &Arc<TagDefinition>,
        document: &Map<String, Value>,
    ) -> DecodeResult<Tag> {
        if definition.tag_type != expected {
            return Err(DecodeError::TypeMismatch {
                key: definition.key.clone(),
                expected: expected.to_string(),
                found: definition.tag_type.to_string(),
            });
        }

        let raw = document
            .get(&definition.key)
            .ok_or_else(|| DecodeError::MissingKey(definition.key.clone()))?;

        Self::read_element(definition, raw)
    }

    /// Decodes a bare value (no key) for `definition`
    pub fn read_element(definition: &Arc<TagDefinition>, raw: &Value) -> DecodeResult<Tag> {
        let key = definition.key.as_str();

        if raw.is_null() {
            return Err(DecodeError::NullValue(key.to_string()));
        }

        let value = match definition.tag_type {
            TagType::Bool => TagValue::Bool(
                raw.as_bool()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "bool", raw))?,
            ),
            TagType::Long => TagValue::Long(
                raw.as_i64()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "int", raw))?,
            ),
            TagType::Double => TagValue::Double(
                raw.as_f64()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "number", raw))?,
            ),
            TagType::String => TagValue::String(
                raw.as_str()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "string", raw))?
                    .to_string(),
            ),
            TagType::Enum => {
                let index = raw
                    .as_i64()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "int", raw))?;
                let index = i32::try_from(index).map_err(|_| DecodeError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("enum index {} out of range", index),
                })?;
                TagValue::Enum(index)
            }
            TagType::Date => {
                let text = raw
                    .as_str()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "RFC 3339 string", raw))?;
                TagValue::Date(parse_date(key, text)?)
            }
            TagType::List => {
                let items = raw
                    .as_array()
                    .ok_or_else(|| DecodeError::type_mismatch(key, "array", raw))?;
                let entries = items
                    .iter()
                    .map(|item| decode_entry(definition, item))
                    .collect::<DecodeResult<Vec<_>>>()?;
                TagValue::List(entries)
            }
        };

        Ok(Tag::new(Arc::clone(definition), value)?)
    }
}

impl TagContainer {
    /// Encodes every tag under its key, in container order
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        for tag in self {
            tag.write_to(&mut document);
        }
        document
    }

    /// Decodes a container against `definitions`.
    ///
    /// Absent keys are skipped (optional tags); keys the schema does not
    /// define are rejected. Tags come out in schema order.
    pub fn from_document(definitions: &[Arc<TagDefinition>], document: &Map<String, Value>) -> DecodeResult<Self> {
        if let Some(unknown) = document
            .keys()
            .find(|k| !definitions.iter().any(|d| &d.key == *k))
        {
            return Err(DecodeError::UnknownKey(unknown.clone()));
        }

        let mut tags = Vec::new();
        for definition in definitions {
            if document.contains_key(&definition.key) {
                tags.push(Tag::read_from(definition, document)?);
            }
        }

        Ok(TagContainer::from_tags(tags)?)
    }
}

fn encode_entry(list: &TagDefinition, entry: &TagContainer, out: &mut Vec<Value>) {
    if let Some(single) = list.single_entry() {
        if entry.is_empty() {
            out.push(Value::Null);
            return;
        }
        if entry.len() == 1 {
            if let Some(tag) = entry.get(&single.key) {
                tag.append_to(out);
                return;
            }
        }
    }

    out.push(Value::Object(entry.to_document()));
}

fn decode_entry(list: &Arc<TagDefinition>, item: &Value) -> DecodeResult<TagContainer> {
    match (item, list.single_entry()) {
        (Value::Object(document), _) => TagContainer::from_document(&list.entries, document),
        (Value::Null, Some(_)) => Ok(TagContainer::new()),
        (_, Some(single)) => Ok(TagContainer::from_tags(vec![Tag::read_element(single, item)?])?),
        (_, None) => Err(DecodeError::type_mismatch(&list.key, "object entry", item)),
    }
}

pub(crate) fn parse_date(key: &str, text: &str) -> DecodeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DecodeError::InvalidValue {
            key: key.to_string(),
            reason: format!("invalid timestamp '{}': {}", text, e),
        })
}

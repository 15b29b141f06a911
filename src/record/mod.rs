//! Records
//!
//! A record is one annotated object: an identifier, an optional owner, its
//! tag container and the last edit. Persisted layout:
//!
//! ```text
//! {
//!   "_id": "<uuid>",
//!   "owner_id": "<owner>" | null,
//!   "tags": { "<key>": <value>, ... },
//!   "edit": { "editor": "<name>", "timestamp": "<rfc3339>" } | null
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::StructureDefinition;
use crate::tag::{format_date, DecodeError, DecodeResult, Tag, TagContainer, TagError};

pub const ID_KEY: &str = "_id";
pub const OWNER_KEY: &str = "owner_id";
pub const TAGS_KEY: &str = "tags";
pub const EDIT_KEY: &str = "edit";

/// Who last annotated a record, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEntry {
    pub editor: String,
    pub timestamp: DateTime<Utc>,
}

impl EditEntry {
    pub fn now(editor: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: Option<String>,
    pub tags: TagContainer,
    pub edit: Option<EditEntry>,
}

impl Record {
    /// Create an empty record with a fresh identifier
    pub fn new(owner_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            tags: TagContainer::new(),
            edit: None,
        }
    }

    /// Replaces all tags and stamps the edit entry.
    ///
    /// On error the record's tags are left empty and the edit entry is
    /// unchanged.
    pub fn annotate<I>(&mut self, tags: I, editor: &str) -> Result<(), TagError>
    where
        I: IntoIterator<Item = Tag>,
    {
        self.tags.rebuild(tags)?;
        self.edit = Some(EditEntry::now(editor));
        Ok(())
    }

    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(ID_KEY.into(), Value::String(self.id.to_string()));
        doc.insert(
            OWNER_KEY.into(),
            self.owner_id.clone().map_or(Value::Null, Value::String),
        );
        doc.insert(TAGS_KEY.into(), Value::Object(self.tags.to_document()));
        doc.insert(
            EDIT_KEY.into(),
            match &self.edit {
                Some(edit) => serde_json::json!({
                    "editor": edit.editor,
                    "timestamp": format_date(&edit.timestamp),
                }),
                None => Value::Null,
            },
        );
        Value::Object(doc)
    }

    /// Decodes a persisted record against its structure.
    ///
    /// Failures are logged at warn and returned; the caller decides whether
    /// to skip the document.
    pub fn from_document(structure: &StructureDefinition, document: &Value) -> DecodeResult<Record> {
        match Self::decode(structure, document) {
            Ok(record) => {
                let id = record.id.to_string();
                log_event_with_fields(
                    Event::RecordDecoded,
                    &[("id", id.as_str()), ("structure", structure.name.as_str())],
                );
                Ok(record)
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::RecordDecodeFailed,
                    &[
                        ("code", e.code()),
                        ("reason", reason.as_str()),
                        ("structure", structure.name.as_str()),
                    ],
                );
                Err(e)
            }
        }
    }

    fn decode(structure: &StructureDefinition, document: &Value) -> DecodeResult<Record> {
        let doc = document
            .as_object()
            .ok_or_else(|| DecodeError::Malformed("record document must be an object".into()))?;

        let id = match doc.get(ID_KEY) {
            None => return Err(DecodeError::MissingKey(ID_KEY.into())),
            Some(Value::String(text)) => Uuid::parse_str(text).map_err(|e| DecodeError::InvalidValue {
                key: ID_KEY.into(),
                reason: e.to_string(),
            })?,
            Some(other) => return Err(DecodeError::type_mismatch(ID_KEY, "string", other)),
        };

        let owner_id = match doc.get(OWNER_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(owner)) => Some(owner.clone()),
            Some(other) => return Err(DecodeError::type_mismatch(OWNER_KEY, "string", other)),
        };

        let tags = match doc.get(TAGS_KEY) {
            None => return Err(DecodeError::MissingKey(TAGS_KEY.into())),
            Some(Value::Object(map)) => TagContainer::from_document(structure.definitions(), map)?,
            Some(other) => return Err(DecodeError::type_mismatch(TAGS_KEY, "object", other)),
        };

        let edit = match doc.get(EDIT_KEY) {
            None | Some(Value::Null) => None,
            Some(value) => Some(EditEntry::deserialize(value).map_err(|e| {
                DecodeError::InvalidValue {
                    key: EDIT_KEY.into(),
                    reason: e.to_string(),
                }
            })?),
        };

        Ok(Record {
            id,
            owner_id,
            tags,
            edit,
        })
    }
}

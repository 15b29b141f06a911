//! Wire encoding for query trees
//!
//! Every node travels as an envelope `{"key", "variant", "payload"}`. The
//! variant names the node kind; decoding dispatches on it once and parses the
//! payload for that kind. `INTERNAL` payloads carry the match condition code
//! and the nested envelope.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{TagDefinition, TagType};
use crate::tag::{DecodeError, DecodeResult};

use super::element::{CompareOp, EqualityOp, MatchCondition, QueryElement, QueryKind, StringOp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelope {
    pub key: String,
    pub variant: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVariant {
    Bool,
    Long,
    Double,
    String,
    Enum,
    Date,
    Internal,
}

impl QueryVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryVariant::Bool => "BOOL",
            QueryVariant::Long => "LONG",
            QueryVariant::Double => "DOUBLE",
            QueryVariant::String => "STRING",
            QueryVariant::Enum => "ENUM",
            QueryVariant::Date => "DATE",
            QueryVariant::Internal => "INTERNAL",
        }
    }

    pub fn target_type(&self) -> TagType {
        match self {
            QueryVariant::Bool => TagType::Bool,
            QueryVariant::Long => TagType::Long,
            QueryVariant::Double => TagType::Double,
            QueryVariant::String => TagType::String,
            QueryVariant::Enum => TagType::Enum,
            QueryVariant::Date => TagType::Date,
            QueryVariant::Internal => TagType::List,
        }
    }
}

impl FromStr for QueryVariant {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOL" => Ok(QueryVariant::Bool),
            "LONG" => Ok(QueryVariant::Long),
            "DOUBLE" => Ok(QueryVariant::Double),
            "STRING" => Ok(QueryVariant::String),
            "ENUM" => Ok(QueryVariant::Enum),
            "DATE" => Ok(QueryVariant::Date),
            "INTERNAL" => Ok(QueryVariant::Internal),
            other => Err(DecodeError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize)]
struct ComparePayload<O, V> {
    op: O,
    value: V,
}

#[derive(Serialize, Deserialize)]
struct StringPayload {
    op: StringOp,
    value: String,
    #[serde(default = "default_case_sensitive")]
    case_sensitive: bool,
}

fn default_case_sensitive() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
struct EnumPayload {
    op: EqualityOp,
    index: i32,
}

#[derive(Serialize, Deserialize)]
struct InternalPayload {
    condition: i32,
    nested: Box<QueryEnvelope>,
}

impl QueryElement {
    pub fn variant(&self) -> QueryVariant {
        match self.kind() {
            QueryKind::Bool { .. } => QueryVariant::Bool,
            QueryKind::Long { .. } => QueryVariant::Long,
            QueryKind::Double { .. } => QueryVariant::Double,
            QueryKind::String { .. } => QueryVariant::String,
            QueryKind::Enum { .. } => QueryVariant::Enum,
            QueryKind::Date { .. } => QueryVariant::Date,
            QueryKind::Internal { .. } => QueryVariant::Internal,
        }
    }

    pub fn to_envelope(&self) -> serde_json::Result<QueryEnvelope> {
        let payload = match self.kind() {
            QueryKind::Bool { op, value } => serde_json::to_value(ComparePayload { op, value })?,
            QueryKind::Long { op, value } => serde_json::to_value(ComparePayload { op, value })?,
            QueryKind::Double { op, value } => serde_json::to_value(ComparePayload { op, value })?,
            QueryKind::Date { op, value } => serde_json::to_value(ComparePayload { op, value })?,
            QueryKind::String {
                op,
                value,
                case_sensitive,
            } => serde_json::to_value(StringPayload {
                op: *op,
                value: value.clone(),
                case_sensitive: *case_sensitive,
            })?,
            QueryKind::Enum { op, index } => serde_json::to_value(EnumPayload { op: *op, index: *index })?,
            QueryKind::Internal { condition, nested } => serde_json::to_value(InternalPayload {
                condition: condition.code(),
                nested: Box::new(nested.to_envelope()?),
            })?,
        };

        Ok(QueryEnvelope {
            key: self.key().to_string(),
            variant: self.variant().as_str().to_string(),
            payload,
        })
    }

    /// Rebuilds a query element from its envelope.
    ///
    /// The key is resolved in `definitions`; nested envelopes of an internal
    /// node are resolved in the list's entry definitions.
    pub fn from_envelope(definitions: &[Arc<TagDefinition>], envelope: &QueryEnvelope) -> DecodeResult<Self> {
        let definition = definitions
            .iter()
            .find(|d| d.key == envelope.key)
            .ok_or_else(|| DecodeError::UnknownKey(envelope.key.clone()))?;

        let variant: QueryVariant = envelope.variant.parse()?;
        if variant.target_type() != definition.tag_type {
            return Err(DecodeError::TypeMismatch {
                key: envelope.key.clone(),
                expected: definition.tag_type.to_string(),
                found: variant.to_string(),
            });
        }

        let kind = match variant {
            QueryVariant::Bool => {
                let p: ComparePayload<EqualityOp, bool> = payload(envelope)?;
                QueryKind::Bool { op: p.op, value: p.value }
            }
            QueryVariant::Long => {
                let p: ComparePayload<CompareOp, i64> = payload(envelope)?;
                QueryKind::Long { op: p.op, value: p.value }
            }
            QueryVariant::Double => {
                let p: ComparePayload<CompareOp, f64> = payload(envelope)?;
                QueryKind::Double { op: p.op, value: p.value }
            }
            QueryVariant::Date => {
                let p: ComparePayload<CompareOp, DateTime<Utc>> = payload(envelope)?;
                QueryKind::Date { op: p.op, value: p.value }
            }
            QueryVariant::String => {
                let p: StringPayload = payload(envelope)?;
                QueryKind::String {
                    op: p.op,
                    value: p.value,
                    case_sensitive: p.case_sensitive,
                }
            }
            QueryVariant::Enum => {
                let p: EnumPayload = payload(envelope)?;
                QueryKind::Enum { op: p.op, index: p.index }
            }
            QueryVariant::Internal => {
                let p: InternalPayload = payload(envelope)?;
                QueryKind::Internal {
                    condition: MatchCondition::from_code(p.condition),
                    nested: Box::new(QueryElement::from_envelope(&definition.entries, &p.nested)?),
                }
            }
        };

        Ok(QueryElement::new(Arc::clone(definition), kind)?)
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.to_envelope()?)
    }

    pub fn decode(definitions: &[Arc<TagDefinition>], bytes: &[u8]) -> DecodeResult<Self> {
        let envelope: QueryEnvelope =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        Self::from_envelope(definitions, &envelope)
    }
}

fn payload<T: DeserializeOwned>(envelope: &QueryEnvelope) -> DecodeResult<T> {
    T::deserialize(&envelope.payload).map_err(|e| DecodeError::InvalidValue {
        key: envelope.key.clone(),
        reason: format!("{} payload: {}", envelope.variant, e),
    })
}

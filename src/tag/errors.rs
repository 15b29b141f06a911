//! Tag error types
//!
//! Two kinds, kept apart from validation errors:
//! - `TagError`: a tag or query element was built against the wrong definition
//! - `DecodeError`: a persisted document or wire message does not fit the schema.
//!   Fatal to the single decode, never retried.

use serde_json::Value;
use thiserror::Error;

use crate::schema::TagType;

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag '{key}' is defined as {expected}, not {actual}")]
    TypeMismatch {
        key: String,
        expected: TagType,
        actual: TagType,
    },

    #[error("duplicate tag key '{0}' in container")]
    DuplicateKey(String),

    #[error("'{entry}' is not an entry of list '{list}'")]
    NotAListEntry { list: String, entry: String },

    #[error("tag '{0}' needs a finite number")]
    NonFinite(String),
}

impl TagError {
    pub fn code(&self) -> &'static str {
        match self {
            TagError::TypeMismatch { .. } => "TAG_TYPE_MISMATCH",
            TagError::DuplicateKey(_) => "TAG_DUPLICATE_KEY",
            TagError::NotAListEntry { .. } => "TAG_NOT_A_LIST_ENTRY",
            TagError::NonFinite(_) => "TAG_NON_FINITE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("key '{0}' is missing")]
    MissingKey(String),

    #[error("key '{0}' is null")]
    NullValue(String),

    #[error("key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },

    #[error("key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("key '{0}' is not defined by the schema")]
    UnknownKey(String),

    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    #[error("malformed input: {0}")]
    Malformed(String),
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::MissingKey(_) => "DECODE_MISSING_KEY",
            DecodeError::NullValue(_) => "DECODE_NULL_VALUE",
            DecodeError::TypeMismatch { .. } => "DECODE_TYPE_MISMATCH",
            DecodeError::InvalidValue { .. } => "DECODE_INVALID_VALUE",
            DecodeError::UnknownKey(_) => "DECODE_UNKNOWN_KEY",
            DecodeError::UnknownVariant(_) => "DECODE_UNKNOWN_VARIANT",
            DecodeError::Malformed(_) => "DECODE_MALFORMED",
        }
    }

    pub(crate) fn type_mismatch(key: &str, expected: impl Into<String>, found: &Value) -> Self {
        DecodeError::TypeMismatch {
            key: key.to_string(),
            expected: expected.into(),
            found: json_type_name(found).to_string(),
        }
    }
}

impl From<TagError> for DecodeError {
    fn from(e: TagError) -> Self {
        match e {
            TagError::TypeMismatch { key, expected, actual } => DecodeError::TypeMismatch {
                key,
                expected: expected.to_string(),
                found: actual.to_string(),
            },
            TagError::DuplicateKey(key) => DecodeError::InvalidValue {
                key,
                reason: "duplicate key".into(),
            },
            TagError::NotAListEntry { entry, .. } => DecodeError::UnknownKey(entry),
            TagError::NonFinite(key) => DecodeError::InvalidValue {
                key,
                reason: "not a finite number".into(),
            },
        }
    }
}

/// Returns the JSON type name for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Schema error types
//!
//! Error codes:
//! - SCHEMA_INVALID_DEFINITION
//! - SCHEMA_DUPLICATE_KEY
//! - SCHEMA_INVALID_ENABLER
//! - SCHEMA_ALREADY_REGISTERED (schemas are immutable once published)
//! - SCHEMA_UNKNOWN_STRUCTURE
//! - SCHEMA_IO
//! - SCHEMA_MALFORMED

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building, loading or registering structure definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("tag definition '{key}' is invalid: {reason}")]
    InvalidDefinition { key: String, reason: String },

    #[error("duplicate tag key '{0}'")]
    DuplicateKey(String),

    #[error("enabler of '{key}' on '{selector}' is invalid: {reason}")]
    InvalidEnabler {
        key: String,
        selector: String,
        reason: String,
    },

    #[error("structure '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("structure '{0}' not found")]
    UnknownStructure(String),

    #[error("failed to read schema file '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::InvalidDefinition { .. } => "SCHEMA_INVALID_DEFINITION",
            SchemaError::DuplicateKey(_) => "SCHEMA_DUPLICATE_KEY",
            SchemaError::InvalidEnabler { .. } => "SCHEMA_INVALID_ENABLER",
            SchemaError::AlreadyRegistered(_) => "SCHEMA_ALREADY_REGISTERED",
            SchemaError::UnknownStructure(_) => "SCHEMA_UNKNOWN_STRUCTURE",
            SchemaError::Io { .. } => "SCHEMA_IO",
            SchemaError::Malformed { .. } => "SCHEMA_MALFORMED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(SchemaError::DuplicateKey("a".into()).code(), "SCHEMA_DUPLICATE_KEY");
        assert_eq!(
            SchemaError::UnknownStructure("x".into()).code(),
            "SCHEMA_UNKNOWN_STRUCTURE"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = SchemaError::InvalidDefinition {
            key: "age".into(),
            reason: "min must not exceed max".into(),
        };
        let display = err.to_string();
        assert!(display.contains("age"));
        assert!(display.contains("min must not exceed max"));
    }
}

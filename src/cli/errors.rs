//! CLI-specific error types
//!
//! All CLI errors are fatal: the command stops and `main` exits non-zero.

use std::fmt;
use std::io;

use crate::schema::SchemaError;
use crate::store::StoreError;
use crate::tag::DecodeError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Schema file could not be loaded
    SchemaError,
    /// Input does not fit the schema
    DecodeError,
    /// Store rejected an operation
    StoreError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TAGSTORE_CLI_CONFIG_ERROR",
            Self::IoError => "TAGSTORE_CLI_IO_ERROR",
            Self::SchemaError => "TAGSTORE_CLI_SCHEMA_ERROR",
            Self::DecodeError => "TAGSTORE_CLI_DECODE_ERROR",
            Self::StoreError => "TAGSTORE_CLI_STORE_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, format!("{}: {}", e.code(), e))
    }
}

impl From<DecodeError> for CliError {
    fn from(e: DecodeError) -> Self {
        Self::new(CliErrorCode::DecodeError, format!("{}: {}", e.code(), e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreError, format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("bad");
        assert_eq!(err.to_string(), "TAGSTORE_CLI_CONFIG_ERROR: bad");
        assert_eq!(err.message(), "bad");
    }

    #[test]
    fn test_decode_error_maps_code() {
        let err: CliError = DecodeError::UnknownKey("x".into()).into();
        assert_eq!(err.code(), &CliErrorCode::DecodeError);
        assert_eq!(err.code_str(), "TAGSTORE_CLI_DECODE_ERROR");
        assert!(err.message().starts_with("DECODE_UNKNOWN_KEY"));
    }
}

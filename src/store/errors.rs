//! Store error types

use thiserror::Error;

use crate::tag::DecodeError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record '{0}' already exists")]
    DuplicateId(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("stored document does not fit the schema: {0}")]
    Decode(#[from] DecodeError),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateId(_) => "STORE_DUPLICATE_ID",
            StoreError::InvalidDocument(_) => "STORE_INVALID_DOCUMENT",
            StoreError::Decode(_) => "STORE_DECODE",
        }
    }
}

//! Store seam for tagstore
//!
//! The surrounding application owns the real document store and passes a
//! handle into every operation that needs persistence. This module defines
//! the filter vocabulary the query compiler targets, the store trait and an
//! in-memory reference store.

mod errors;
mod filter;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use filter::{Quantifier, StoreFilter, StoreOp, StoreValue};
pub use memory::{DocumentMatcher, MemoryStore};

use uuid::Uuid;

use crate::record::Record;

/// A document store holding encoded records
pub trait DocumentStore {
    /// Persist a record; ids are unique
    fn insert(&mut self, record: &Record) -> StoreResult<()>;

    fn get(&self, id: &Uuid) -> StoreResult<Option<Record>>;

    /// Run a filter scoped at the record document
    fn find(&self, filter: &StoreFilter) -> StoreResult<Vec<Record>>;
}

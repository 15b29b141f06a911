//! Query subsystem for tagstore
//!
//! A query tree is built against the same schema as the records it selects.
//! It can be:
//! - evaluated in memory against a realized `TagContainer`
//! - compiled into a `StoreFilter` for a document store
//! - encoded as a self-describing envelope for transport
//!
//! Evaluation and compilation never fail; missing data selects nothing.

mod compile;
mod element;
mod engine;
mod evaluate;
mod wire;

pub use element::{CompareOp, EqualityOp, MatchCondition, QueryElement, QueryKind, StringOp};
pub use engine::QueryEngine;
pub use wire::{QueryEnvelope, QueryVariant};

//! tagstore - typed metadata records and a dual-mode query engine
//!
//! Records carry tags bound to a shared schema. Queries over those tags run
//! either in memory or compiled for a document store, with identical results.

pub mod cli;
pub mod observability;
pub mod query;
pub mod record;
pub mod schema;
pub mod store;
pub mod tag;
pub mod validation;

//! Observable events
//!
//! Events are explicit and typed; each one carries its default severity.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,
    /// A structure definition was published
    SchemaLoaded,
    /// A record document was decoded
    RecordDecoded,
    /// A record document could not be decoded against its schema
    RecordDecodeFailed,
    /// A query envelope was decoded
    QueryDecoded,
    /// A query tree was compiled into a store filter
    QueryCompiled,
    /// A query tree was evaluated against in-memory records
    QueryEvaluated,
    /// A store filter was run against a document store
    StoreQueryExecuted,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::RecordDecoded => "RECORD_DECODED",
            Event::RecordDecodeFailed => "RECORD_DECODE_FAILED",
            Event::QueryDecoded => "QUERY_DECODED",
            Event::QueryCompiled => "QUERY_COMPILED",
            Event::QueryEvaluated => "QUERY_EVALUATED",
            Event::StoreQueryExecuted => "STORE_QUERY_EXECUTED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::SchemaLoaded => Severity::Info,
            Event::RecordDecodeFailed => Severity::Warn,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

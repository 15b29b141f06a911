//! Query engine
//!
//! Runs query elements against records of one structure, either in memory or
//! by compiling them for a document store. Both paths must select the same
//! records.

use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event};
use crate::record::{Record, TAGS_KEY};
use crate::schema::StructureDefinition;
use crate::store::{DocumentStore, StoreFilter, StoreResult};
use crate::tag::{DecodeResult, TagContainer};

use super::element::QueryElement;

pub struct QueryEngine {
    structure: Arc<StructureDefinition>,
}

impl QueryEngine {
    pub fn new(structure: Arc<StructureDefinition>) -> Self {
        Self { structure }
    }

    pub fn structure(&self) -> &Arc<StructureDefinition> {
        &self.structure
    }

    /// Compiles `query` into a filter scoped at a record document
    pub fn compile(&self, query: &QueryElement) -> StoreFilter {
        let filter = StoreFilter::nested(TAGS_KEY, query.compile());
        let depth = query.depth().to_string();
        log_event_with_fields(
            Event::QueryCompiled,
            &[("depth", depth.as_str()), ("key", query.key())],
        );
        filter
    }

    pub fn matches(&self, query: &QueryElement, container: Option<&TagContainer>) -> bool {
        query.evaluate(container)
    }

    /// Evaluates `query` in memory, keeping input order
    pub fn filter<'a>(&self, query: &QueryElement, records: &'a [Record]) -> Vec<&'a Record> {
        let matched: Vec<&Record> = records
            .iter()
            .filter(|r| query.evaluate(Some(&r.tags)))
            .collect();

        let scanned = records.len().to_string();
        let count = matched.len().to_string();
        log_event_with_fields(
            Event::QueryEvaluated,
            &[
                ("key", query.key()),
                ("matched", count.as_str()),
                ("scanned", scanned.as_str()),
            ],
        );
        matched
    }

    /// Compiles `query` and runs it against `store`
    pub fn find<S: DocumentStore>(&self, store: &S, query: &QueryElement) -> StoreResult<Vec<Record>> {
        store.find(&self.compile(query))
    }

    pub fn encode(&self, query: &QueryElement) -> serde_json::Result<Vec<u8>> {
        query.encode()
    }

    /// Decodes a query envelope against the engine's structure
    pub fn decode(&self, bytes: &[u8]) -> DecodeResult<QueryElement> {
        let query = QueryElement::decode(self.structure.definitions(), bytes)?;
        let depth = query.depth().to_string();
        log_event_with_fields(
            Event::QueryDecoded,
            &[("depth", depth.as_str()), ("key", query.key())],
        );
        Ok(query)
    }
}

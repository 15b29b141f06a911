//! In-memory document store
//!
//! Keeps encoded record documents and interprets `StoreFilter` over them, the
//! way an external document store would. Matching works on the persisted
//! JSON only; it never decodes tags.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::record::{Record, ID_KEY};
use crate::schema::StructureDefinition;

use super::errors::{StoreError, StoreResult};
use super::filter::{Quantifier, StoreFilter, StoreOp, StoreValue};
use super::DocumentStore;

/// Evaluates store filters against JSON documents
pub struct DocumentMatcher;

impl DocumentMatcher {
    /// Checks if `scope` satisfies `filter`.
    ///
    /// Missing, null and mistyped fields never match a comparison.
    pub fn matches(scope: &Value, filter: &StoreFilter) -> bool {
        match filter {
            StoreFilter::Always => true,
            StoreFilter::Never => false,
            StoreFilter::HasKey { key } => field(scope, Some(key)).is_some(),
            StoreFilter::Compare {
                key,
                op,
                value,
                ignore_case,
            } => match field(scope, key.as_deref()) {
                Some(actual) => Self::compare(actual, *op, value, *ignore_case),
                None => false,
            },
            StoreFilter::And { filters } => filters.iter().all(|f| Self::matches(scope, f)),
            StoreFilter::Or { filters } => filters.iter().any(|f| Self::matches(scope, f)),
            StoreFilter::Link {
                key,
                quantifier,
                scope: inner,
            } => {
                let Some(Value::Array(items)) = field(scope, key.as_deref()) else {
                    return false;
                };
                match quantifier {
                    Quantifier::Any => items.iter().any(|item| Self::matches(item, inner)),
                    Quantifier::All => items.iter().all(|item| Self::matches(item, inner)),
                }
            }
            StoreFilter::Nested { key, scope: inner } => match field(scope, Some(key)) {
                Some(nested @ Value::Object(_)) => Self::matches(nested, inner),
                _ => false,
            },
        }
    }

    fn compare(actual: &Value, op: StoreOp, expected: &StoreValue, ignore_case: bool) -> bool {
        match expected {
            StoreValue::Bool(b) => actual.as_bool().is_some_and(|a| ordered(op, Some(a.cmp(b)))),
            StoreValue::Long(n) => actual.as_i64().is_some_and(|a| ordered(op, Some(a.cmp(n)))),
            StoreValue::Double(x) => actual.as_f64().is_some_and(|a| ordered(op, a.partial_cmp(x))),
            StoreValue::Date(at) => actual
                .as_str()
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
                .map(|d| d.with_timezone(&Utc))
                .is_some_and(|a| ordered(op, Some(a.cmp(at)))),
            StoreValue::Text(text) => {
                let Some(a) = actual.as_str() else {
                    return false;
                };
                if ignore_case {
                    text_op(op, &a.to_lowercase(), &text.to_lowercase())
                } else {
                    text_op(op, a, text)
                }
            }
        }
    }
}

/// Resolves `key` in `scope`; `None` addresses the scope itself. Null is absent.
fn field<'a>(scope: &'a Value, key: Option<&str>) -> Option<&'a Value> {
    let value = match key {
        Some(k) => scope.as_object()?.get(k)?,
        None => scope,
    };
    (!value.is_null()).then_some(value)
}

fn ordered(op: StoreOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        StoreOp::Eq => ordering == Ordering::Equal,
        StoreOp::Ne => ordering != Ordering::Equal,
        StoreOp::Lt => ordering == Ordering::Less,
        StoreOp::Le => ordering != Ordering::Greater,
        StoreOp::Gt => ordering == Ordering::Greater,
        StoreOp::Ge => ordering != Ordering::Less,
        StoreOp::Contains | StoreOp::BeginsWith | StoreOp::EndsWith => false,
    }
}

fn text_op(op: StoreOp, actual: &str, expected: &str) -> bool {
    match op {
        StoreOp::Contains => actual.contains(expected),
        StoreOp::BeginsWith => actual.starts_with(expected),
        StoreOp::EndsWith => actual.ends_with(expected),
        _ => ordered(op, Some(actual.cmp(expected))),
    }
}

/// Reference store holding the persisted form of every record.
///
/// Documents are kept in insertion order; `find` returns matches in that
/// order.
pub struct MemoryStore {
    structure: Arc<StructureDefinition>,
    documents: Vec<Value>,
}

impl MemoryStore {
    pub fn new(structure: Arc<StructureDefinition>) -> Self {
        Self {
            structure,
            documents: Vec::new(),
        }
    }

    pub fn structure(&self) -> &Arc<StructureDefinition> {
        &self.structure
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Stores a raw document as is, e.g. one read from disk
    pub fn insert_document(&mut self, document: Value) -> StoreResult<()> {
        let id = document
            .get(ID_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::InvalidDocument(format!("missing '{}'", ID_KEY)))?
            .to_string();

        if self.position(&id).is_some() {
            return Err(StoreError::DuplicateId(id));
        }

        self.documents.push(document);
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.get(ID_KEY).and_then(Value::as_str) == Some(id))
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&mut self, record: &Record) -> StoreResult<()> {
        self.insert_document(record.to_document())
    }

    fn get(&self, id: &Uuid) -> StoreResult<Option<Record>> {
        match self.position(&id.to_string()) {
            Some(i) => Ok(Some(Record::from_document(&self.structure, &self.documents[i])?)),
            None => Ok(None),
        }
    }

    fn find(&self, filter: &StoreFilter) -> StoreResult<Vec<Record>> {
        let records = self
            .documents
            .iter()
            .filter(|doc| DocumentMatcher::matches(doc, filter))
            .map(|doc| Record::from_document(&self.structure, doc))
            .collect::<Result<Vec<_>, _>>()?;

        let scanned = self.documents.len().to_string();
        let matched = records.len().to_string();
        log_event_with_fields(
            Event::StoreQueryExecuted,
            &[("matched", matched.as_str()), ("scanned", scanned.as_str())],
        );

        Ok(records)
    }
}

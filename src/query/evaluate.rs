//! In-memory evaluation
//!
//! Evaluates a query element directly against a realized tag container.
//! Absence is never an error: a missing container, a missing tag or an
//! unrecognized quantifier all evaluate to false.

use crate::tag::{normalize_enum_index, TagContainer};

use super::element::{MatchCondition, QueryElement, QueryKind};

impl QueryElement {
    pub fn evaluate(&self, container: Option<&TagContainer>) -> bool {
        let Some(tag) = container.and_then(|c| c.get(self.key())) else {
            return false;
        };

        match self.kind() {
            QueryKind::Bool { op, value } => tag.as_bool().is_some_and(|v| op.apply(&v, value)),
            QueryKind::Long { op, value } => tag.as_long().is_some_and(|v| op.apply(&v, value)),
            QueryKind::Double { op, value } => tag.as_double().is_some_and(|v| op.apply(&v, value)),
            QueryKind::Date { op, value } => tag.as_date().is_some_and(|v| op.apply(&v, value)),
            QueryKind::String {
                op,
                value,
                case_sensitive,
            } => tag
                .as_str()
                .is_some_and(|v| op.apply(v, value, *case_sensitive)),
            QueryKind::Enum { op, index } => {
                let literal = normalize_enum_index(self.definition(), *index);
                tag.enum_index().is_some_and(|v| op.apply(&v, &literal))
            }
            QueryKind::Internal { condition, nested } => {
                let Some(entries) = tag.entries() else {
                    return false;
                };
                match condition {
                    MatchCondition::MatchOne => entries.iter().any(|e| nested.evaluate(Some(e))),
                    // Vacuously true on an empty list
                    MatchCondition::MatchAll => entries.iter().all(|e| nested.evaluate(Some(e))),
                    MatchCondition::Unrecognized(_) => false,
                }
            }
        }
    }
}

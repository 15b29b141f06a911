//! Store-native filter vocabulary
//!
//! A `StoreFilter` is evaluated against a scope value, starting at the record
//! document. `Nested` moves the scope into an object field, `Link` quantifies
//! over the elements of an array field. A `key` of `None` addresses the scope
//! value itself, which is how bare list elements are reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    BeginsWith,
    EndsWith,
}

/// Typed comparison literal. Dates compare as instants, not as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum StoreValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Date(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    Any,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum StoreFilter {
    Always,
    Never,
    /// The field exists and is not null
    HasKey { key: String },
    Compare {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        op: StoreOp,
        value: StoreValue,
        #[serde(default, skip_serializing_if = "is_false")]
        ignore_case: bool,
    },
    And { filters: Vec<StoreFilter> },
    Or { filters: Vec<StoreFilter> },
    /// Quantifies `scope` over the elements of an array field
    Link {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        quantifier: Quantifier,
        scope: Box<StoreFilter>,
    },
    /// Evaluates `scope` inside an object field
    Nested { key: String, scope: Box<StoreFilter> },
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl StoreFilter {
    pub fn has_key(key: impl Into<String>) -> Self {
        StoreFilter::HasKey { key: key.into() }
    }

    pub fn compare(key: Option<&str>, op: StoreOp, value: StoreValue) -> Self {
        StoreFilter::Compare {
            key: key.map(str::to_string),
            op,
            value,
            ignore_case: false,
        }
    }

    pub fn compare_text(key: Option<&str>, op: StoreOp, value: impl Into<String>, ignore_case: bool) -> Self {
        StoreFilter::Compare {
            key: key.map(str::to_string),
            op,
            value: StoreValue::Text(value.into()),
            ignore_case,
        }
    }

    /// Conjunction; collapses a single operand, `Always` for none
    pub fn and(filters: Vec<StoreFilter>) -> Self {
        let mut filters: Vec<StoreFilter> = filters
            .into_iter()
            .filter(|f| *f != StoreFilter::Always)
            .collect();
        if filters.iter().any(|f| *f == StoreFilter::Never) {
            return StoreFilter::Never;
        }
        match filters.len() {
            0 => StoreFilter::Always,
            1 => filters.remove(0),
            _ => StoreFilter::And { filters },
        }
    }

    /// Disjunction; collapses a single operand, `Never` for none
    pub fn or(filters: Vec<StoreFilter>) -> Self {
        let mut filters: Vec<StoreFilter> = filters
            .into_iter()
            .filter(|f| *f != StoreFilter::Never)
            .collect();
        if filters.iter().any(|f| *f == StoreFilter::Always) {
            return StoreFilter::Always;
        }
        match filters.len() {
            0 => StoreFilter::Never,
            1 => filters.remove(0),
            _ => StoreFilter::Or { filters },
        }
    }

    pub fn link(key: Option<&str>, quantifier: Quantifier, scope: StoreFilter) -> Self {
        StoreFilter::Link {
            key: key.map(str::to_string),
            quantifier,
            scope: Box::new(scope),
        }
    }

    pub fn nested(key: impl Into<String>, scope: StoreFilter) -> Self {
        StoreFilter::Nested {
            key: key.into(),
            scope: Box::new(scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_and_or_simplify() {
        let a = StoreFilter::has_key("a");
        assert_eq!(StoreFilter::and(vec![a.clone()]), a);
        assert_eq!(StoreFilter::and(vec![]), StoreFilter::Always);
        assert_eq!(StoreFilter::or(vec![]), StoreFilter::Never);
        assert_eq!(StoreFilter::and(vec![a.clone(), StoreFilter::Never]), StoreFilter::Never);
        assert_eq!(StoreFilter::or(vec![a.clone(), StoreFilter::Never]), a);
        assert_eq!(StoreFilter::and(vec![a.clone(), StoreFilter::Always]), a);
    }

    #[test]
    fn test_serialized_shape() {
        let filter = StoreFilter::and(vec![
            StoreFilter::has_key("age"),
            StoreFilter::compare(Some("age"), StoreOp::Ge, StoreValue::Long(18)),
        ]);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "filter": "and",
                "filters": [
                    {"filter": "has_key", "key": "age"},
                    {"filter": "compare", "key": "age", "op": "ge", "value": {"type": "LONG", "value": 18}}
                ]
            })
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        let filter = StoreFilter::nested(
            "tags",
            StoreFilter::link(
                Some("pets"),
                Quantifier::All,
                StoreFilter::compare_text(None, StoreOp::BeginsWith, "R", true),
            ),
        );
        let text = serde_json::to_string(&filter).unwrap();
        let back: StoreFilter = serde_json::from_str(&text).unwrap();
        assert_eq!(back, filter);
    }

    #[test]
    fn test_every_variant_serializes() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let filters = vec![
            StoreFilter::Always,
            StoreFilter::Never,
            StoreFilter::has_key("n"),
            StoreFilter::compare(Some("n"), StoreOp::Lt, StoreValue::Double(2.5)),
            StoreFilter::compare(None, StoreOp::Eq, StoreValue::Bool(true)),
            StoreFilter::compare(Some("at"), StoreOp::Le, StoreValue::Date(at)),
            StoreFilter::compare_text(Some("s"), StoreOp::Contains, "x", true),
            StoreFilter::And {
                filters: vec![StoreFilter::has_key("a"), StoreFilter::has_key("b")],
            },
            StoreFilter::Or {
                filters: vec![StoreFilter::has_key("a"), StoreFilter::Never],
            },
            StoreFilter::link(None, Quantifier::Any, StoreFilter::Always),
            StoreFilter::nested("tags", StoreFilter::has_key("n")),
        ];

        for filter in filters {
            let value = serde_json::to_value(&filter).unwrap();
            assert!(value["filter"].is_string(), "untagged: {}", value);
            let back: StoreFilter = serde_json::from_value(value).unwrap();
            assert_eq!(back, filter);
        }
        assert_eq!(serde_json::to_value(StoreFilter::Never).unwrap(), json!({"filter": "never"}));
    }
}

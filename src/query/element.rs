//! Query elements
//!
//! A `QueryElement` is a predicate node bound to the definition whose key it
//! targets. Leaf kinds compare one scalar tag; `Internal` quantifies a nested
//! element over the entries of a list tag.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{TagDefinition, TagType};
use crate::tag::TagError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EqualityOp {
    Equal,
    NotEqual,
}

impl EqualityOp {
    pub fn apply<T: PartialEq + ?Sized>(&self, actual: &T, expected: &T) -> bool {
        match self {
            EqualityOp::Equal => actual == expected,
            EqualityOp::NotEqual => actual != expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl CompareOp {
    pub fn apply<T: PartialOrd + ?Sized>(&self, actual: &T, expected: &T) -> bool {
        match self {
            CompareOp::Equal => actual == expected,
            CompareOp::NotEqual => actual != expected,
            CompareOp::Less => actual < expected,
            CompareOp::LessOrEqual => actual <= expected,
            CompareOp::Greater => actual > expected,
            CompareOp::GreaterOrEqual => actual >= expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StringOp {
    Equal,
    Contains,
    BeginsWith,
    EndsWith,
}

impl StringOp {
    pub fn apply(&self, actual: &str, expected: &str, case_sensitive: bool) -> bool {
        if !case_sensitive {
            return self.apply(&actual.to_lowercase(), &expected.to_lowercase(), true);
        }
        match self {
            StringOp::Equal => actual == expected,
            StringOp::Contains => actual.contains(expected),
            StringOp::BeginsWith => actual.starts_with(expected),
            StringOp::EndsWith => actual.ends_with(expected),
        }
    }
}

/// Quantifier of an `Internal` element.
///
/// Travels as an integer code; unknown codes are kept so they round-trip,
/// and never match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCondition {
    MatchOne,
    MatchAll,
    Unrecognized(i32),
}

impl MatchCondition {
    pub const MATCH_ONE: i32 = 0;
    pub const MATCH_ALL: i32 = 1;

    pub fn code(&self) -> i32 {
        match self {
            MatchCondition::MatchOne => Self::MATCH_ONE,
            MatchCondition::MatchAll => Self::MATCH_ALL,
            MatchCondition::Unrecognized(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::MATCH_ONE => MatchCondition::MatchOne,
            Self::MATCH_ALL => MatchCondition::MatchAll,
            other => MatchCondition::Unrecognized(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    Bool { op: EqualityOp, value: bool },
    Long { op: CompareOp, value: i64 },
    Double { op: CompareOp, value: f64 },
    String { op: StringOp, value: String, case_sensitive: bool },
    /// Out-of-range indices compare as the unrecognized sentinel
    Enum { op: EqualityOp, index: i32 },
    Date { op: CompareOp, value: DateTime<Utc> },
    Internal { condition: MatchCondition, nested: Box<QueryElement> },
}

impl QueryKind {
    /// Type of the definition this kind can target
    pub fn target_type(&self) -> TagType {
        match self {
            QueryKind::Bool { .. } => TagType::Bool,
            QueryKind::Long { .. } => TagType::Long,
            QueryKind::Double { .. } => TagType::Double,
            QueryKind::String { .. } => TagType::String,
            QueryKind::Enum { .. } => TagType::Enum,
            QueryKind::Date { .. } => TagType::Date,
            QueryKind::Internal { .. } => TagType::List,
        }
    }
}

/// Predicate node. Structural equality over `(definition, kind)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryElement {
    definition: Arc<TagDefinition>,
    kind: QueryKind,
}

impl QueryElement {
    /// Binds `kind` to `definition`.
    ///
    /// # Errors
    ///
    /// `TagError::TypeMismatch` if the kind cannot target the definition's
    /// type, `TagError::NotAListEntry` if an internal element's nested
    /// definition is not an entry of the list, `TagError::NonFinite` for a
    /// NaN or infinite double literal.
    pub fn new(definition: Arc<TagDefinition>, kind: QueryKind) -> Result<Self, TagError> {
        if kind.target_type() != definition.tag_type {
            return Err(TagError::TypeMismatch {
                key: definition.key.clone(),
                expected: definition.tag_type,
                actual: kind.target_type(),
            });
        }

        if let QueryKind::Double { value, .. } = &kind {
            if !value.is_finite() {
                return Err(TagError::NonFinite(definition.key.clone()));
            }
        }

        if let QueryKind::Internal { nested, .. } = &kind {
            let entry = definition.entry(&nested.definition.key);
            if entry.map_or(true, |e| **e != *nested.definition) {
                return Err(TagError::NotAListEntry {
                    list: definition.key.clone(),
                    entry: nested.definition.key.clone(),
                });
            }
        }

        Ok(Self { definition, kind })
    }

    pub fn boolean(definition: Arc<TagDefinition>, op: EqualityOp, value: bool) -> Result<Self, TagError> {
        Self::new(definition, QueryKind::Bool { op, value })
    }

    pub fn long(definition: Arc<TagDefinition>, op: CompareOp, value: i64) -> Result<Self, TagError> {
        Self::new(definition, QueryKind::Long { op, value })
    }

    pub fn double(definition: Arc<TagDefinition>, op: CompareOp, value: f64) -> Result<Self, TagError> {
        Self::new(definition, QueryKind::Double { op, value })
    }

    pub fn string(
        definition: Arc<TagDefinition>,
        op: StringOp,
        value: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, TagError> {
        Self::new(
            definition,
            QueryKind::String {
                op,
                value: value.into(),
                case_sensitive,
            },
        )
    }

    pub fn enumeration(definition: Arc<TagDefinition>, op: EqualityOp, index: i32) -> Result<Self, TagError> {
        Self::new(definition, QueryKind::Enum { op, index })
    }

    pub fn date<Tz: TimeZone>(
        definition: Arc<TagDefinition>,
        op: CompareOp,
        at: DateTime<Tz>,
    ) -> Result<Self, TagError> {
        Self::new(
            definition,
            QueryKind::Date {
                op,
                value: at.with_timezone(&Utc),
            },
        )
    }

    pub fn internal(
        definition: Arc<TagDefinition>,
        condition: MatchCondition,
        nested: QueryElement,
    ) -> Result<Self, TagError> {
        Self::new(
            definition,
            QueryKind::Internal {
                condition,
                nested: Box::new(nested),
            },
        )
    }

    pub fn definition(&self) -> &Arc<TagDefinition> {
        &self.definition
    }

    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    /// Number of nested levels, 1 for a leaf
    pub fn depth(&self) -> usize {
        match &self.kind {
            QueryKind::Internal { nested, .. } => 1 + nested.depth(),
            _ => 1,
        }
    }
}

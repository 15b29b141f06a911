//! Store compilation
//!
//! Translates a query element into a `StoreFilter` scoped at a container
//! document. The store only sees raw persisted values, so compilation folds
//! read-time normalization into the filter:
//!
//! - numeric comparisons run against the clamped domain: the interior range,
//!   plus everything below `min` when `min` itself satisfies the comparison,
//!   plus everything above `max` when `max` does
//! - an enum literal outside the enumerators matches raw indices outside
//!   `[0, len)`
//! - list entries of a single-definition list may be bare values or objects

use crate::store::{Quantifier, StoreFilter, StoreOp, StoreValue};

use super::element::{CompareOp, EqualityOp, MatchCondition, QueryElement, QueryKind, StringOp};

impl QueryElement {
    /// Compiles against the document of the container holding the target tag
    pub fn compile(&self) -> StoreFilter {
        StoreFilter::and(vec![
            StoreFilter::has_key(self.key()),
            self.compile_value(Some(self.key())),
        ])
    }

    /// Compiles the value test alone; `None` tests the scope value itself
    fn compile_value(&self, key: Option<&str>) -> StoreFilter {
        let definition = self.definition();

        match self.kind() {
            QueryKind::Bool { op, value } => {
                StoreFilter::compare(key, equality(*op), StoreValue::Bool(*value))
            }
            QueryKind::Long { op, value } => bounded(
                key,
                *op,
                *value,
                definition.long_min(),
                definition.long_max(),
                StoreValue::Long,
            ),
            QueryKind::Double { op, value } => {
                bounded(key, *op, *value, definition.min, definition.max, StoreValue::Double)
            }
            QueryKind::Date { op, value } => {
                StoreFilter::compare(key, ordering(*op), StoreValue::Date(*value))
            }
            QueryKind::String {
                op,
                value,
                case_sensitive,
            } => StoreFilter::compare_text(key, text(*op), value.clone(), !*case_sensitive),
            QueryKind::Enum { op, index } => {
                if definition.enum_label(*index).is_some() {
                    return StoreFilter::compare(key, equality(*op), StoreValue::Long(i64::from(*index)));
                }
                let len = definition.enumerators.len() as i64;
                match op {
                    EqualityOp::Equal => StoreFilter::or(vec![
                        StoreFilter::compare(key, StoreOp::Lt, StoreValue::Long(0)),
                        StoreFilter::compare(key, StoreOp::Ge, StoreValue::Long(len)),
                    ]),
                    EqualityOp::NotEqual => StoreFilter::and(vec![
                        StoreFilter::compare(key, StoreOp::Ge, StoreValue::Long(0)),
                        StoreFilter::compare(key, StoreOp::Lt, StoreValue::Long(len)),
                    ]),
                }
            }
            QueryKind::Internal { condition, nested } => {
                let quantifier = match condition {
                    MatchCondition::MatchOne => Quantifier::Any,
                    MatchCondition::MatchAll => Quantifier::All,
                    MatchCondition::Unrecognized(_) => return StoreFilter::Never,
                };
                let entry = if definition.single_entry().is_some() {
                    StoreFilter::or(vec![nested.compile_value(None), nested.compile()])
                } else {
                    nested.compile()
                };
                StoreFilter::link(key, quantifier, entry)
            }
        }
    }
}

fn bounded<T>(
    key: Option<&str>,
    op: CompareOp,
    value: T,
    min: Option<T>,
    max: Option<T>,
    wrap: fn(T) -> StoreValue,
) -> StoreFilter
where
    T: PartialOrd + Copy,
{
    let mut interior = Vec::new();
    if let Some(lo) = min {
        interior.push(StoreFilter::compare(key, StoreOp::Ge, wrap(lo)));
    }
    if let Some(hi) = max {
        interior.push(StoreFilter::compare(key, StoreOp::Le, wrap(hi)));
    }
    interior.push(StoreFilter::compare(key, ordering(op), wrap(value)));

    let mut branches = vec![StoreFilter::and(interior)];
    if let Some(lo) = min.filter(|lo| op.apply(lo, &value)) {
        branches.push(StoreFilter::compare(key, StoreOp::Lt, wrap(lo)));
    }
    if let Some(hi) = max.filter(|hi| op.apply(hi, &value)) {
        branches.push(StoreFilter::compare(key, StoreOp::Gt, wrap(hi)));
    }
    StoreFilter::or(branches)
}

fn equality(op: EqualityOp) -> StoreOp {
    match op {
        EqualityOp::Equal => StoreOp::Eq,
        EqualityOp::NotEqual => StoreOp::Ne,
    }
}

fn ordering(op: CompareOp) -> StoreOp {
    match op {
        CompareOp::Equal => StoreOp::Eq,
        CompareOp::NotEqual => StoreOp::Ne,
        CompareOp::Less => StoreOp::Lt,
        CompareOp::LessOrEqual => StoreOp::Le,
        CompareOp::Greater => StoreOp::Gt,
        CompareOp::GreaterOrEqual => StoreOp::Ge,
    }
}

fn text(op: StringOp) -> StoreOp {
    match op {
        StringOp::Equal => StoreOp::Eq,
        StringOp::Contains => StoreOp::Contains,
        StringOp::BeginsWith => StoreOp::BeginsWith,
        StringOp::EndsWith => StoreOp::EndsWith,
    }
}

//! Value and container checks
//!
//! Rules per type:
//! - absent / empty text / empty list / negative enum index → empty
//! - empty and required → EMPTY_MANDATORY_FIELD, empty and optional → no tag
//! - LONG/DOUBLE outside `[min, max]` → LESS_THAN_MIN / MORE_THAN_MAX
//! - STRING length (characters) outside `[min, max]` → STRING_TOO_SHORT / STRING_TOO_LONG
//! - LIST entry count outside `[min, max]` → LIST_NOT_ENOUGH_VALUES / LIST_TOO_MANY_VALUES
//! - ENUM index past the last enumerator → INVALID_MANDATORY_FIELD when required
//! - value variant not matching the definition, or a NaN / infinite double → OTHER
//!
//! All bounds are inclusive.

use std::sync::Arc;

use crate::schema::{TagDefinition, TagType};
use crate::tag::{TagContainer, TagValue};

use super::rules::{Rule, ValidationError};

/// Outcome of a successful check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checked {
    /// The value is well formed and should become a tag
    Present,
    /// The field is optional and empty; no tag
    Empty,
}

/// Checks one raw value against its definition.
///
/// `required` is passed separately so callers can relax it, e.g. for a field
/// whose enabler is not satisfied.
pub fn check_value(
    definition: &TagDefinition,
    raw: Option<&TagValue>,
    required: bool,
) -> Result<Checked, ValidationError> {
    let subject = definition.name.as_str();

    let Some(value) = raw.filter(|v| !is_empty(definition, v)) else {
        return if required {
            Err(ValidationError::new(Rule::EmptyMandatoryField, subject))
        } else {
            Ok(Checked::Empty)
        };
    };

    if value.tag_type() != definition.tag_type {
        return Err(ValidationError::new(Rule::Other, subject));
    }

    match value {
        TagValue::Long(v) => check_range(definition, *v as f64)?,
        TagValue::Double(v) => {
            if !v.is_finite() {
                return Err(ValidationError::new(Rule::Other, subject));
            }
            check_range(definition, *v)?
        }
        TagValue::String(text) => {
            let len = text.chars().count() as f64;
            if let Some(min) = definition.min.filter(|m| len < *m) {
                return Err(ValidationError::with_value(Rule::StringTooShort, subject, min));
            }
            if let Some(max) = definition.max.filter(|m| len > *m) {
                return Err(ValidationError::with_value(Rule::StringTooLong, subject, max));
            }
        }
        TagValue::Enum(index) => {
            if definition.enum_label(*index).is_none() {
                return if required {
                    Err(ValidationError::new(Rule::InvalidMandatoryField, subject))
                } else {
                    Ok(Checked::Empty)
                };
            }
        }
        TagValue::List(entries) => {
            let count = entries.len() as f64;
            if let Some(min) = definition.min.filter(|m| count < *m) {
                return Err(ValidationError::with_value(Rule::ListNotEnoughValues, subject, min));
            }
            if let Some(max) = definition.max.filter(|m| count > *m) {
                return Err(ValidationError::with_value(Rule::ListTooManyValues, subject, max));
            }
            for entry in entries {
                if let Some(first) = check_entries(&definition.entries, entry).into_iter().next() {
                    return Err(first);
                }
            }
        }
        TagValue::Bool(_) | TagValue::Date(_) => {}
    }

    Ok(Checked::Present)
}

/// Checks a whole container against `definitions`, collecting every failure.
///
/// A definition whose enabler is not satisfied by the container is treated
/// as optional. Tags with keys outside `definitions` fail with OTHER.
pub(crate) fn check_entries(definitions: &[Arc<TagDefinition>], container: &TagContainer) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for definition in definitions {
        let active = definition
            .enabler
            .as_ref()
            .map_or(true, |e| container.satisfies(e));
        let required = definition.required && active;
        let raw = container.get(&definition.key).map(|t| t.raw_value());

        if let Err(e) = check_value(definition, raw, required) {
            errors.push(e);
        }
    }

    for tag in container {
        if !definitions.iter().any(|d| d.key == tag.key()) {
            errors.push(ValidationError::new(Rule::Other, tag.key()));
        }
    }

    errors
}

fn check_range(definition: &TagDefinition, value: f64) -> Result<(), ValidationError> {
    let subject = definition.name.as_str();
    if let Some(min) = definition.min.filter(|m| value < *m) {
        return Err(ValidationError::with_value(Rule::LessThanMin, subject, min));
    }
    if let Some(max) = definition.max.filter(|m| value > *m) {
        return Err(ValidationError::with_value(Rule::MoreThanMax, subject, max));
    }
    Ok(())
}

fn is_empty(definition: &TagDefinition, value: &TagValue) -> bool {
    match value {
        TagValue::String(text) => text.is_empty(),
        TagValue::List(entries) => entries.is_empty() && definition.tag_type == TagType::List,
        TagValue::Enum(index) => *index < 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Enabler;
    use crate::tag::Tag;

    fn text(min: f64, max: f64) -> TagDefinition {
        TagDefinition::string("name", "Name").with_range(min, max)
    }

    fn s(v: &str) -> TagValue {
        TagValue::String(v.to_string())
    }

    #[test]
    fn test_string_bounds_inclusive() {
        let def = text(2.0, 5.0);
        assert_eq!(
            check_value(&def, Some(&s("a")), false),
            Err(ValidationError::with_value(Rule::StringTooShort, "Name", 2.0))
        );
        assert_eq!(
            check_value(&def, Some(&s("abcdef")), false),
            Err(ValidationError::with_value(Rule::StringTooLong, "Name", 5.0))
        );
        assert_eq!(check_value(&def, Some(&s("ab")), false), Ok(Checked::Present));
        assert_eq!(check_value(&def, Some(&s("abcde")), false), Ok(Checked::Present));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let def = text(0.0, 3.0);
        assert_eq!(check_value(&def, Some(&s("äöü")), false), Ok(Checked::Present));
    }

    #[test]
    fn test_required_empty() {
        let def = text(0.0, 5.0).mandatory();
        let expected = Err(ValidationError::new(Rule::EmptyMandatoryField, "Name"));
        assert_eq!(check_value(&def, None, true), expected);
        assert_eq!(check_value(&def, Some(&s("")), true), expected);
    }

    #[test]
    fn test_optional_empty_is_no_tag() {
        let def = text(2.0, 5.0);
        assert_eq!(check_value(&def, None, false), Ok(Checked::Empty));
        assert_eq!(check_value(&def, Some(&s("")), false), Ok(Checked::Empty));
    }

    #[test]
    fn test_numeric_bounds() {
        let def = TagDefinition::long("legs", "Legs").with_range(0.0, 8.0);
        assert_eq!(
            check_value(&def, Some(&TagValue::Long(-1)), false),
            Err(ValidationError::with_value(Rule::LessThanMin, "Legs", 0.0))
        );
        assert_eq!(
            check_value(&def, Some(&TagValue::Long(9)), false),
            Err(ValidationError::with_value(Rule::MoreThanMax, "Legs", 8.0))
        );
        assert_eq!(check_value(&def, Some(&TagValue::Long(8)), false), Ok(Checked::Present));
    }

    #[test]
    fn test_double_non_finite_rejected() {
        let def = TagDefinition::double("x", "X").with_max(10.0);
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                check_value(&def, Some(&TagValue::Double(v)), false),
                Err(ValidationError::new(Rule::Other, "X"))
            );
        }
    }

    #[test]
    fn test_list_cardinality() {
        let def = TagDefinition::list("l", "Items", vec![TagDefinition::long("n", "N")]).with_range(1.0, 2.0);
        let entry = TagContainer::new();
        assert_eq!(
            check_value(&def, Some(&TagValue::List(vec![entry.clone(); 3])), false),
            Err(ValidationError::with_value(Rule::ListTooManyValues, "Items", 2.0))
        );

        let def = def.with_min(2.0);
        assert_eq!(
            check_value(&def, Some(&TagValue::List(vec![entry])), false),
            Err(ValidationError::with_value(Rule::ListNotEnoughValues, "Items", 2.0))
        );
    }

    #[test]
    fn test_list_entries_are_checked() {
        let def = TagDefinition::list(
            "l",
            "Items",
            vec![TagDefinition::long("n", "N").with_range(0.0, 3.0)],
        );
        let n = def.entries[0].clone();
        let bad = TagContainer::from_tags(vec![Tag::long(n, 7).unwrap()]).unwrap();
        assert_eq!(
            check_value(&def, Some(&TagValue::List(vec![bad])), false),
            Err(ValidationError::with_value(Rule::MoreThanMax, "N", 3.0))
        );
    }

    #[test]
    fn test_enum_out_of_range() {
        let def = TagDefinition::enumeration("c", "Color", ["r", "g"]);
        assert_eq!(check_value(&def, Some(&TagValue::Enum(5)), false), Ok(Checked::Empty));
        assert_eq!(
            check_value(&def, Some(&TagValue::Enum(5)), true),
            Err(ValidationError::new(Rule::InvalidMandatoryField, "Color"))
        );
        assert_eq!(
            check_value(&def, Some(&TagValue::Enum(-1)), true),
            Err(ValidationError::new(Rule::EmptyMandatoryField, "Color"))
        );
    }

    #[test]
    fn test_variant_mismatch_is_other() {
        let def = TagDefinition::long("n", "N");
        assert_eq!(
            check_value(&def, Some(&TagValue::Bool(true)), false),
            Err(ValidationError::new(Rule::Other, "N"))
        );
    }

    #[test]
    fn test_disabled_field_not_required() {
        let kind = TagDefinition::enumeration("kind", "Kind", ["plant", "animal"]).into_shared();
        let legs = TagDefinition::long("legs", "Legs")
            .mandatory()
            .with_enabler(Enabler::by_label("kind", "animal"))
            .into_shared();
        let defs = vec![kind.clone(), legs];

        let plant = TagContainer::from_tags(vec![Tag::enumeration(kind.clone(), 0).unwrap()]).unwrap();
        assert!(check_entries(&defs, &plant).is_empty());

        let animal = TagContainer::from_tags(vec![Tag::enumeration(kind, 1).unwrap()]).unwrap();
        assert_eq!(
            check_entries(&defs, &animal),
            vec![ValidationError::new(Rule::EmptyMandatoryField, "Legs")]
        );
    }

    #[test]
    fn test_unknown_tag_reported() {
        let defs: Vec<Arc<TagDefinition>> = vec![];
        let stray = TagDefinition::boolean("stray", "Stray").into_shared();
        let container = TagContainer::from_tags(vec![Tag::boolean(stray, true).unwrap()]).unwrap();
        assert_eq!(
            check_entries(&defs, &container),
            vec![ValidationError::new(Rule::Other, "stray")]
        );
    }
}

//! Validation rule taxonomy
//!
//! Every user-correctable failure maps to one `Rule`. A rule's template has
//! up to two positional placeholders: `{0}` for the subject name and `{1}`
//! for the numeric bound.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    InvalidMandatoryField,
    EmptyMandatoryField,
    LessThanMin,
    MoreThanMax,
    ListNotEnoughValues,
    ListTooManyValues,
    StringTooShort,
    StringTooLong,
    Other,
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Rule::InvalidMandatoryField => "INVALID_MANDATORY_FIELD",
            Rule::EmptyMandatoryField => "EMPTY_MANDATORY_FIELD",
            Rule::LessThanMin => "LESS_THAN_MIN",
            Rule::MoreThanMax => "MORE_THAN_MAX",
            Rule::ListNotEnoughValues => "LIST_NOT_ENOUGH_VALUES",
            Rule::ListTooManyValues => "LIST_TOO_MANY_VALUES",
            Rule::StringTooShort => "STRING_TOO_SHORT",
            Rule::StringTooLong => "STRING_TOO_LONG",
            Rule::Other => "OTHER",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Rule::InvalidMandatoryField => "Field '{0}' has an invalid value",
            Rule::EmptyMandatoryField => "Field '{0}' is mandatory",
            Rule::LessThanMin => "Field '{0}' must be at least {1}",
            Rule::MoreThanMax => "Field '{0}' must be at most {1}",
            Rule::ListNotEnoughValues => "List '{0}' needs at least {1} entries",
            Rule::ListTooManyValues => "List '{0}' allows at most {1} entries",
            Rule::StringTooShort => "Text '{0}' must have at least {1} characters",
            Rule::StringTooLong => "Text '{0}' must have at most {1} characters",
            Rule::Other => "Field '{0}' is not valid",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A validation failure: `(rule, subject name, optional bound)`.
///
/// Two errors are equal iff all three fields match.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    rule: Rule,
    subject: String,
    value: Option<f64>,
}

impl ValidationError {
    pub fn new(rule: Rule, subject: impl Into<String>) -> Self {
        Self {
            rule,
            subject: subject.into(),
            value: None,
        }
    }

    pub fn with_value(rule: Rule, subject: impl Into<String>, value: f64) -> Self {
        Self {
            rule,
            subject: subject.into(),
            value: Some(value),
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Substitutes the subject and bound into the rule's template
    pub fn render(&self) -> String {
        let bound = self.value.map(format_bound).unwrap_or_default();
        self.rule
            .template()
            .replace("{0}", &self.subject)
            .replace("{1}", &bound)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for ValidationError {}

/// Whole numbers render without a fractional part
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

//! Input contract for form-like collaborators
//!
//! A `TagInput` holds the raw value of one field while it is being edited.
//! `get_tag` either returns a well-formed tag, returns `None` for an optional
//! empty field, or fails with a `ValidationError`.

use std::sync::Arc;

use crate::schema::TagDefinition;
use crate::tag::{Tag, TagValue};

use super::check::{check_value, Checked};
use super::rules::{Rule, ValidationError};

#[derive(Debug, Clone)]
pub struct TagInput {
    definition: Arc<TagDefinition>,
    raw: Option<TagValue>,
    enabled: bool,
}

impl TagInput {
    pub fn new(definition: Arc<TagDefinition>) -> Self {
        Self {
            definition,
            raw: None,
            enabled: true,
        }
    }

    pub fn definition(&self) -> &Arc<TagDefinition> {
        &self.definition
    }

    /// Loads the raw value of an existing tag, or clears the input
    pub fn reset(&mut self, tag: Option<&Tag>) {
        self.raw = tag.map(|t| t.raw_value().clone());
    }

    pub fn set_value(&mut self, raw: Option<TagValue>) {
        self.raw = raw;
    }

    /// A disabled input is never mandatory.
    ///
    /// Callers drive this from the definition's enabler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn required(&self) -> bool {
        self.definition.required && self.enabled
    }

    /// Returns the checked raw value, `None` when optional and empty
    pub fn get_value(&self) -> Result<Option<TagValue>, ValidationError> {
        match check_value(&self.definition, self.raw.as_ref(), self.required())? {
            Checked::Present => Ok(self.raw.clone()),
            Checked::Empty => Ok(None),
        }
    }

    pub fn get_tag(&self) -> Result<Option<Tag>, ValidationError> {
        let Some(value) = self.get_value()? else {
            return Ok(None);
        };

        Tag::new(Arc::clone(&self.definition), value)
            .map(Some)
            .map_err(|_| ValidationError::new(Rule::Other, self.definition.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn test_round_trip_through_reset() {
        let def = TagDefinition::long("legs", "Legs").with_range(0.0, 8.0).into_shared();
        let tag = Tag::long(def.clone(), 4).unwrap();

        let mut input = TagInput::new(def);
        input.reset(Some(&tag));
        assert_eq!(input.get_tag().unwrap(), Some(tag));

        input.reset(None);
        assert_eq!(input.get_tag().unwrap(), None);
    }

    #[test]
    fn test_required_empty_fails() {
        let def = TagDefinition::string("name", "Name").mandatory().into_shared();
        let mut input = TagInput::new(def);
        input.set_value(Some(TagValue::String(String::new())));
        assert_eq!(
            input.get_tag(),
            Err(ValidationError::new(Rule::EmptyMandatoryField, "Name"))
        );
    }

    #[test]
    fn test_disabled_input_relaxes_required() {
        let def = TagDefinition::string("name", "Name").mandatory().into_shared();
        let mut input = TagInput::new(def);
        input.set_enabled(false);
        assert_eq!(input.get_tag(), Ok(None));
    }

    #[test]
    fn test_out_of_range_value_fails() {
        let def = TagDefinition::double("ratio", "Ratio").with_range(0.0, 1.0).into_shared();
        let mut input = TagInput::new(def);
        input.set_value(Some(TagValue::Double(1.5)));
        assert_eq!(
            input.get_value(),
            Err(ValidationError::with_value(Rule::MoreThanMax, "Ratio", 1.0))
        );
    }

    #[test]
    fn test_wrong_variant_is_other() {
        let def = TagDefinition::boolean("flag", "Flag").into_shared();
        let mut input = TagInput::new(def);
        input.set_value(Some(TagValue::Long(1)));
        assert_eq!(input.get_tag(), Err(ValidationError::new(Rule::Other, "Flag")));
    }

    #[test]
    fn test_date_is_stored_in_utc() {
        let def = TagDefinition::date("at", "At").into_shared();
        let local = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap();
        let mut input = TagInput::new(def);
        input.set_value(Some(TagValue::date(local)));

        let tag = input.get_tag().unwrap().unwrap();
        assert_eq!(
            tag.as_date(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }
}

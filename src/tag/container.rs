//! Tag containers
//!
//! An ordered set of tags, at most one per key. A container is only changed
//! through `rebuild`, which clears it and adds the new tags; there are no
//! partial in-place edits.

use crate::schema::{Enabler, EnablerValue};

use super::errors::TagError;
use super::value::{Tag, UNRECOGNIZED_INDEX};

/// Annotated data of one record, or of one entry of a list tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagContainer {
    tags: Vec<Tag>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a container from tags in order.
    ///
    /// # Errors
    ///
    /// `TagError::DuplicateKey` if two tags share a key.
    pub fn from_tags<I>(tags: I) -> Result<Self, TagError>
    where
        I: IntoIterator<Item = Tag>,
    {
        let mut container = Self::new();
        container.rebuild(tags)?;
        Ok(container)
    }

    /// Clears the container and adds `tags` in order.
    ///
    /// On error the container is left empty.
    pub fn rebuild<I>(&mut self, tags: I) -> Result<(), TagError>
    where
        I: IntoIterator<Item = Tag>,
    {
        self.tags.clear();

        let mut fresh: Vec<Tag> = Vec::new();
        for tag in tags {
            if fresh.iter().any(|t| t.key() == tag.key()) {
                return Err(TagError::DuplicateKey(tag.key().to_string()));
            }
            fresh.push(tag);
        }

        self.tags = fresh;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key() == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(Tag::key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns true if the enabler's selector tag currently holds its value.
    ///
    /// A missing selector, or one holding an unrecognized index, never
    /// satisfies an enabler.
    pub fn satisfies(&self, enabler: &Enabler) -> bool {
        let Some(selector) = self.get(&enabler.selector) else {
            return false;
        };
        let Some(index) = selector.enum_index() else {
            return false;
        };
        if index == UNRECOGNIZED_INDEX {
            return false;
        }

        match &enabler.value {
            EnablerValue::Index(expected) => index == *expected,
            EnablerValue::Label(expected) => selector.enum_label() == Some(expected.as_str()),
        }
    }

    /// Deterministic rendering `{"a": 1, "b": "x"}`
    pub fn canonical(&self) -> String {
        let parts: Vec<String> = self.tags.iter().map(Tag::canonical).collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl<'a> IntoIterator for &'a TagContainer {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

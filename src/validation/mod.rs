//! Validation for tagstore
//!
//! Turns raw input into tags, or into user-correctable `ValidationError`s.
//! Validation failures are part of normal operation and are never logged.

mod check;
mod input;
mod rules;

pub use check::{check_value, Checked};
pub use input::TagInput;
pub use rules::{Rule, ValidationError};

use crate::schema::StructureDefinition;
use crate::tag::TagContainer;

/// Validates every tag of a record against its structure.
///
/// Returns all failures in schema order, followed by tags the structure does
/// not define. A definition whose enabler is not satisfied is optional.
pub fn validate_container(structure: &StructureDefinition, container: &TagContainer) -> Vec<ValidationError> {
    check::check_entries(structure.definitions(), container)
}

//! Schema subsystem for tagstore
//!
//! A structure definition is the ordered sequence of tag definitions that
//! describe one record type. Definitions are immutable after publication and
//! shared by reference from every tag and query element that targets them.

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{Enabler, EnablerValue, StructureDefinition, TagDefinition, TagType};

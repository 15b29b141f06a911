//! Tag value model for tagstore
//!
//! - `Tag`: immutable typed value bound to a shared `TagDefinition`
//! - `TagContainer`: ordered set of tags, one per key, nested for list tags
//! - document codec: key → value JSON objects used for persistence
//! - wire codec: self-describing tags used for transport
//!
//! Values are normalized on read (numeric clamping, enum sentinel), never
//! on write, so both encodings round-trip exactly.

mod container;
mod document;
mod errors;
mod value;
mod wire;

pub use container::TagContainer;
pub use errors::{DecodeError, DecodeResult, TagError};
pub use value::{Tag, TagValue, UNRECOGNIZED_INDEX, UNRECOGNIZED_LABEL};
pub use wire::WireTag;

pub(crate) use value::{format_date, normalize_enum_index};

//! Observability subsystem for tagstore
//!
//! Structured JSON logging with typed events. Observability is read-only:
//! it has no side effects on decoding, validation or query evaluation, and a
//! failed log write never fails the caller.
//!
//! ```ignore
//! use tagstore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::QueryCompiled, &[("key", "name")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Only verifies no panic
        log_event_with_fields(Event::ConfigLoaded, &[]);
        log_event_with_fields(Event::RecordDecodeFailed, &[("reason", "test")]);
    }
}

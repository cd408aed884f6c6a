//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed catalog events
//! - Begin/complete scopes for long operations
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on indexing or querying
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use appy_catalog::observability::{Event, Logger, ObservationScope};
//!
//! log_event_with_fields(Event::CatalogLoaded, &[("catalog", "Person")]);
//!
//! let scope = ObservationScope::new("INDEX_RECOMPUTE");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a typed event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a typed event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::CatalogLoaded, &[("catalog", "Person")]);
    }
}

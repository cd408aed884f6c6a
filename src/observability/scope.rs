//! Begin/end logging around long operations
//!
//! A scope logs `{NAME}_BEGIN` when opened and exactly one closing line:
//! `{NAME}_COMPLETE`, `{NAME}_FAILED`, or `{NAME}_INCOMPLETE` when dropped
//! without being closed (early return, panic).

use std::time::Instant;

use super::logger::{Logger, Severity};

/// Logged operation in progress
///
/// ```ignore
/// let scope = ObservationScope::with_fields("INDEX_RECOMPUTE", &[("index", "birth")]);
/// // ... do work ...
/// scope.complete_with_fields(&[("objects_after", "12")]);
/// ```
///
/// Fields given at creation are repeated on the closing line, along with
/// the elapsed time in milliseconds.
pub struct ObservationScope<'a> {
    name: &'a str,
    fields: Vec<(&'a str, String)>,
    start: Instant,
    closed: bool,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            start: Instant::now(),
            closed: false,
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Closes the scope successfully, adding `extra` to the closing line
    pub fn complete_with_fields(self, extra: &[(&str, &str)]) {
        self.close(Severity::Info, "COMPLETE", extra);
    }

    /// Closes the scope as failed, at ERROR level
    pub fn fail(self, reason: &str) {
        self.close(Severity::Error, "FAILED", &[("reason", reason)]);
    }

    /// Closes the scope as failed, at FATAL level
    pub fn fail_fatal(self, reason: &str) {
        self.close(Severity::Fatal, "FAILED", &[("reason", reason)]);
    }

    /// Milliseconds since the scope was opened
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }

    fn close(mut self, severity: Severity, outcome: &str, extra: &[(&str, &str)]) {
        self.closed = true;
        let elapsed = self.elapsed_ms();
        let fields = self.closing_fields(&elapsed, extra);
        Logger::log(severity, &format!("{}_{}", self.name, outcome), &fields);
    }

    fn closing_fields<'b>(&'b self, elapsed: &'b str, extra: &[(&'b str, &'b str)]) -> Vec<(&'b str, &'b str)> {
        self.fields
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(std::iter::once(("elapsed_ms", elapsed)))
            .chain(extra.iter().copied())
            .collect()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.closed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_fields_repeat_opening_fields() {
        let scope = ObservationScope::with_fields("TEST", &[("index", "birth")]);
        let fields = scope.closing_fields("5", &[("objects_after", "3")]);
        assert_eq!(
            fields,
            vec![("index", "birth"), ("elapsed_ms", "5"), ("objects_after", "3")]
        );
        scope.complete();
    }

    #[test]
    fn test_close_marks_scope() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.closed);
        scope.fail("scan failed");

        let scope = ObservationScope::new("TEST");
        scope.fail_fatal("store unreadable");
    }

    #[test]
    fn test_scope_drop_without_close() {
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }
}

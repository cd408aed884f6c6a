//! JSON-lines logger
//!
//! One line per event, keys in alphabetical order, written synchronously.
//! Every line goes to stderr: stdout belongs to command responses.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Per-query detail such as sort strategies
    Trace = 0,
    #[default]
    Info = 1,
    Warn = 2,
    /// An object or a query was rejected
    Error = 3,
    /// The object store cannot be read
    Fatal = 4,
}

impl Severity {
    /// Name written in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Lines below this severity are dropped
static THRESHOLD: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// Writes catalog events as JSON lines on stderr
pub struct Logger;

impl Logger {
    /// Sets the minimum severity written from now on
    pub fn set_threshold(severity: Severity) {
        THRESHOLD.store(severity as u8, Ordering::Relaxed);
    }

    /// Current minimum severity
    pub fn threshold() -> Severity {
        Severity::from_u8(THRESHOLD.load(Ordering::Relaxed))
    }

    /// Returns true if lines of this severity are written
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::threshold()
    }

    /// Writes `event` with `fields` if `severity` reaches the threshold
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if Self::enabled(severity) {
            Self::log_to_writer(severity, event, fields, &mut io::stderr().lock());
        }
    }

    /// JSON object of one log line. Keys are sorted; `event` and `severity`
    /// win over fields of the same name.
    pub fn line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> Value {
        let mut line: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(*value)))
            .collect();
        line.insert("event".to_string(), Value::from(event));
        line.insert("severity".to_string(), Value::from(severity.as_str()));
        Value::Object(line)
    }

    /// Writes one log line to `writer`, whatever the threshold.
    ///
    /// Logging never fails the caller: write errors are ignored.
    pub fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut output = Self::line(severity, event, fields).to_string();
        output.push('\n');
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }
}

#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

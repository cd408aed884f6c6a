//! CLI-specific error types
//!
//! Every CLI error ends the command; it is printed as a JSON error response.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::index::IndexError;
use crate::query::ParseError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, object dump)
    IoError,
    /// A `--where` criterion could not be parsed
    InvalidCriterion,
    /// Indexing, search or scan failure
    IndexError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "APPY_CLI_CONFIG_ERROR",
            Self::IoError => "APPY_CLI_IO_ERROR",
            Self::InvalidCriterion => "APPY_CLI_INVALID_CRITERION",
            Self::IndexError => "APPY_CLI_INDEX_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_criterion(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidCriterion, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<IndexError> for CliError {
    fn from(e: IndexError) -> Self {
        Self::new(CliErrorCode::IndexError, e.to_string())
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        Self::invalid_criterion(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_codes() {
        let err: CliError = ConfigError::Invalid("duplicate class 'A'".to_string()).into();
        assert_eq!(err.code_str(), "APPY_CLI_CONFIG_ERROR");
        assert!(err.message().contains("duplicate class"));

        let err: CliError = IndexError::unknown_catalog("Animal").into();
        assert_eq!(err.code(), &CliErrorCode::IndexError);
        assert!(err.to_string().starts_with("APPY_CLI_INDEX_ERROR: "));

        let err: CliError = ParseError::MissingField("age".to_string()).into();
        assert_eq!(err.code(), &CliErrorCode::InvalidCriterion);
    }
}

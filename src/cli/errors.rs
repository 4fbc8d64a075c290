//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code and a
//! `CODE: message` line on stderr.

use std::fmt;
use std::io;

use crate::audit::ValidationError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or environment error
    ConfigError,
    /// I/O error (input file, stdin, stdout)
    IoError,
    /// Input text rejected before auditing
    ValidationError,
    /// Server or runtime failed to start
    StartupFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CITEAUDIT_CONFIG_ERROR",
            Self::IoError => "CITEAUDIT_IO_ERROR",
            Self::ValidationError => "CITEAUDIT_VALIDATION_ERROR",
            Self::StartupFailed => "CITEAUDIT_STARTUP_FAILED",
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
    /// Create a new CLI error
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

    pub fn startup_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::StartupFailed, msg)
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

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        Self::new(CliErrorCode::ValidationError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("remote_timeout_secs must be > 0");
        assert_eq!(
            err.to_string(),
            "CITEAUDIT_CONFIG_ERROR: remote_timeout_secs must be > 0"
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err = CliError::from(ValidationError::EmptyText);
        assert_eq!(err.code(), &CliErrorCode::ValidationError);
        assert_eq!(err.code_str(), "CITEAUDIT_VALIDATION_ERROR");
    }
}

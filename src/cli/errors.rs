//! CLI-specific error types

use std::fmt;
use std::io;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// I/O error reading input
    IoError,
    /// Tokenization aborted on a fatal lex error
    LexFailed,
    /// Tokenization finished but batched bad characters
    BadCharacters,
    /// Output serialization error
    OutputError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoError => "WIRESPEC_CLI_IO_ERROR",
            Self::LexFailed => "WIRESPEC_CLI_LEX_FAILED",
            Self::BadCharacters => "WIRESPEC_CLI_BAD_CHARACTERS",
            Self::OutputError => "WIRESPEC_CLI_OUTPUT_ERROR",
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

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Fatal lex error
    pub fn lex_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LexFailed, msg)
    }

    /// Bad characters batched during tokenization
    pub fn bad_characters(count: usize) -> Self {
        Self::new(
            CliErrorCode::BadCharacters,
            format!("{} bad character(s) in input", count),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
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
        Self::new(CliErrorCode::OutputError, format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

//! Domain error types
//!
//! This module defines the error hierarchy for Ruanon. The recognizer-level
//! kinds (`InvalidInput`, `RecognizerTimeout`, `RecognizerFailure`) are kept
//! distinct so that a service boundary can map each one to its own status.

use thiserror::Error;

/// Main Ruanon error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum RuanonError {
    /// The payload cannot be anonymized (for example, it exceeds the size limit)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The name recognition capability did not answer in time
    #[error("Name recognizer timed out after {timeout_ms}ms")]
    RecognizerTimeout { timeout_ms: u64 },

    /// The name recognition capability returned an error
    #[error("Name recognizer failed: {0}")]
    RecognizerFailure(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Audit log errors
    #[error("Audit error: {0}")]
    Audit(String),
}

impl RuanonError {
    /// Whether the error originates from the name recognition capability
    pub fn is_recognizer_error(&self) -> bool {
        matches!(
            self,
            RuanonError::RecognizerTimeout { .. } | RuanonError::RecognizerFailure(_)
        )
    }

    /// Short machine-readable kind, stable across versions
    pub fn kind(&self) -> &'static str {
        match self {
            RuanonError::InvalidInput(_) => "invalid_input",
            RuanonError::RecognizerTimeout { .. } => "recognizer_timeout",
            RuanonError::RecognizerFailure(_) => "recognizer_failure",
            RuanonError::Configuration(_) => "configuration",
            RuanonError::Validation(_) => "validation",
            RuanonError::Serialization(_) => "serialization",
            RuanonError::Io(_) => "io",
            RuanonError::Audit(_) => "audit",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RuanonError {
    fn from(err: std::io::Error) -> Self {
        RuanonError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RuanonError {
    fn from(err: serde_json::Error) -> Self {
        RuanonError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RuanonError {
    fn from(err: toml::de::Error) -> Self {
        RuanonError::Configuration(format!("TOML parse error: {err}"))
    }
}

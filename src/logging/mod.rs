//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for interactive use
//! - JSON-formatted file logs with rotation
//! - Configurable log levels
//!
//! Log events never carry personal data. Calls are identified by their
//! request id; detections are reported as counts.
//!
//! # Example
//!
//! ```no_run
//! use ruanon::logging::init_logging;
//! use ruanon::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Service started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of one anonymization call
///
/// # Example
///
/// ```no_run
/// use ruanon::log_anonymization_complete;
///
/// let request_id = uuid::Uuid::new_v4();
/// log_anonymization_complete!(request_id, 3, 2, 12u64);
/// ```
#[macro_export]
macro_rules! log_anonymization_complete {
    ($request_id:expr, $detections:expr, $placeholders:expr, $duration_ms:expr) => {
        tracing::info!(
            request_id = %$request_id,
            detections = $detections,
            placeholders = $placeholders,
            duration_ms = $duration_ms,
            "Anonymization completed"
        );
    };
}

/// Log that name recognition failed and the call continues with pattern
/// spans only
///
/// # Example
///
/// ```no_run
/// use ruanon::log_recognizer_fallback;
/// use ruanon::domain::RuanonError;
///
/// let error = RuanonError::RecognizerTimeout { timeout_ms: 5000 };
/// log_recognizer_fallback!("http", &error);
/// ```
#[macro_export]
macro_rules! log_recognizer_fallback {
    ($recognizer:expr, $error:expr) => {
        tracing::warn!(
            recognizer = %$recognizer,
            error_kind = $error.kind(),
            error = %$error,
            "Name recognizer failed, continuing with pattern detection only"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

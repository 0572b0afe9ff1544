//! Structured logging setup using tracing
//!
//! Console output goes to stderr so that command output on stdout stays
//! machine-readable. File output is always JSON.

use crate::config::LoggingConfig;
use crate::domain::{Result, RuanonError};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system based on configuration
///
/// `RUST_LOG` takes precedence over `log_level_str` when set.
///
/// # Returns
///
/// A `LoggingGuard` that must be kept alive for the duration of the program
///
/// # Example
///
/// ```no_run
/// use ruanon::logging::init_logging;
/// use ruanon::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ruanon={log_level}")));

    let mut layers = Vec::new();

    let console_layer = if config.console_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(env_filter.clone())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(env_filter.clone())
            .boxed()
    };
    layers.push(console_layer);

    let file_guard = if config.local_enabled {
        let rotation = parse_rotation(&config.local_rotation)?;

        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            RuanonError::Configuration(format!(
                "Failed to create log directory {}: {}",
                config.local_path, e
            ))
        })?;

        let file_appender = RollingFileAppender::new(rotation, &config.local_path, "ruanon.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking)
            .with_filter(env_filter);

        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| RuanonError::Configuration(format!("Failed to initialize logging: {e}")))?;

    tracing::debug!(
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(RuanonError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Result<Rotation> {
    match rotation {
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        "never" => Ok(Rotation::NEVER),
        other => Err(RuanonError::Configuration(format!(
            "Invalid log rotation: {other}. Must be one of: daily, hourly, never"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("TRACE").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("invalid").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert!(parse_rotation("daily").is_ok());
        assert!(parse_rotation("never").is_ok());
        assert!(parse_rotation("weekly").is_err());
    }
}

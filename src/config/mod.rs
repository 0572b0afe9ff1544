//! Configuration management for Ruanon.
//!
//! Ruanon reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `RUANON_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ruanon::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ruanon.toml")?;
//! println!("Recognizer: {:?}", config.recognizer.kind);
//! println!("Entity types: {:?}", config.engine.entity_types);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`EngineConfig`] - Entity types, stop words, placeholders, normalization
//! - [`RecognizerConfig`] - Name recognizer kind, endpoint, bulkhead, timeout
//! - [`AuditConfig`] - Audit trail
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [engine]
//! entity_types = ["PERSON", "PHONE_NUMBER", "ADDRESS", "INN", "PASSPORT"]
//! stop_words = ["встреча"]
//! placeholder_style = "angle"
//!
//! [engine.normalization]
//! phone_number = "phone_canonical"
//!
//! [recognizer]
//! kind = "http"
//! endpoint = "http://localhost:8080/ner"
//! api_token = "${RUANON_NER_TOKEN}"
//! timeout_ms = 5000
//! max_concurrency = 4
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use crate::anonymization::config::{AuditConfig, EngineConfig, RecognizerConfig};
pub use loader::{load_config, load_config_from_str, load_config_or_default};
pub use schema::{ApplicationConfig, LoggingConfig, RuanonConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};

//! Configuration schema types
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! working configuration.

use crate::anonymization::config::{
    AnonymizationConfig, AuditConfig, EngineConfig, RecognizerConfig,
};
use serde::{Deserialize, Serialize};

/// Main Ruanon configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuanonConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Detection, mapping and substitution settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Person-name recognizer settings
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Audit trail settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RuanonConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.engine.validate().map_err(|e| format!("{e:#}"))?;
        self.recognizer.validate().map_err(|e| format!("{e:#}"))?;
        self.audit.validate().map_err(|e| format!("{e:#}"))?;
        self.logging.validate()?;
        Ok(())
    }

    /// The sections the anonymization engine is built from
    pub fn anonymization_config(&self) -> AnonymizationConfig {
        AnonymizationConfig {
            engine: self.engine.clone(),
            recognizer: self.recognizer.clone(),
            audit: self.audit.clone(),
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging (JSON lines)
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Emit console logs as JSON instead of human-readable text
    #[serde(default)]
    pub console_json: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            console_json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::EntityType;
    use crate::anonymization::recognizer::RecognizerKind;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_path, "./logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let config = LoggingConfig {
            local_rotation: "weekly".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let config: RuanonConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.entity_types, EntityType::ALL.to_vec());
        assert_eq!(config.recognizer.kind, RecognizerKind::Gazetteer);
    }

    #[test]
    fn test_section_errors_surface() {
        let mut config = RuanonConfig::default();
        config.recognizer.max_concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("max_concurrency"));
    }

    #[test]
    fn test_anonymization_config_copies_sections() {
        let mut config = RuanonConfig::default();
        config.engine.max_input_chars = 42;
        config.audit.enabled = true;

        let anonymization = config.anonymization_config();
        assert_eq!(anonymization.engine.max_input_chars, 42);
        assert!(anonymization.audit.enabled);
    }
}

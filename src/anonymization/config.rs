//! Anonymization configuration

use crate::anonymization::mapping::{NormalizationPolicy, PlaceholderStyle};
use crate::anonymization::models::EntityType;
use crate::anonymization::recognizer::RecognizerKind;
use crate::config::{secret_string_opt, SecretString};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Detection and substitution settings (`[engine]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Entity types to detect
    #[serde(default = "default_entity_types")]
    pub entity_types: Vec<EntityType>,

    /// Extra stop words added to the built-in list
    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Start from the built-in stop-word list
    #[serde(default = "default_true")]
    pub use_default_stop_words: bool,

    /// Longest accepted input, in characters
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    #[serde(default)]
    pub placeholder_style: PlaceholderStyle,

    /// Per-type normalization for placeholder reuse
    #[serde(default)]
    pub normalization: NormalizationPolicy,

    /// Path to a custom pattern library TOML file
    pub pattern_library: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            entity_types: default_entity_types(),
            stop_words: Vec::new(),
            use_default_stop_words: true,
            max_input_chars: default_max_input_chars(),
            placeholder_style: PlaceholderStyle::default(),
            normalization: NormalizationPolicy::default(),
            pattern_library: None,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.entity_types.is_empty() {
            anyhow::bail!("engine.entity_types cannot be empty");
        }

        if self.max_input_chars == 0 {
            anyhow::bail!("engine.max_input_chars must be greater than 0");
        }

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("RUANON_ENGINE_ENTITY_TYPES") {
            self.entity_types = val
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<EntityType>())
                .collect::<std::result::Result<_, _>>()
                .context("Invalid RUANON_ENGINE_ENTITY_TYPES value")?;
        }

        if let Ok(val) = std::env::var("RUANON_ENGINE_MAX_INPUT_CHARS") {
            self.max_input_chars = val
                .parse()
                .context("Invalid RUANON_ENGINE_MAX_INPUT_CHARS value")?;
        }

        if let Ok(val) = std::env::var("RUANON_ENGINE_PLACEHOLDER_STYLE") {
            self.placeholder_style = match val.to_lowercase().as_str() {
                "angle" => PlaceholderStyle::Angle,
                "braced" => PlaceholderStyle::Braced,
                _ => anyhow::bail!("Invalid RUANON_ENGINE_PLACEHOLDER_STYLE: {}", val),
            };
        }

        if let Ok(val) = std::env::var("RUANON_ENGINE_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        Ok(())
    }
}

/// Name recognizer settings (`[recognizer]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    #[serde(default)]
    pub kind: RecognizerKind,

    /// NER service URL, required for `kind = "http"`
    pub endpoint: Option<String>,

    /// Bearer token for the NER service, never serialized
    #[serde(default, skip_serializing)]
    pub api_token: Option<SecretString>,

    /// Deadline for one recognizer call, including the bulkhead wait
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum concurrent recognizer calls
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Continue with pattern spans only when the recognizer fails
    #[serde(default)]
    pub fallback_to_patterns: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            kind: RecognizerKind::default(),
            endpoint: None,
            api_token: None,
            timeout_ms: default_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            fallback_to_patterns: false,
        }
    }
}

impl RecognizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            anyhow::bail!("recognizer.timeout_ms must be greater than 0");
        }

        if self.max_concurrency == 0 {
            anyhow::bail!("recognizer.max_concurrency must be greater than 0");
        }

        if self.kind == RecognizerKind::Http {
            let endpoint = self
                .endpoint
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("recognizer.endpoint is required when kind = \"http\""))?;

            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                anyhow::bail!("recognizer.endpoint must start with http:// or https://");
            }
        }

        if let Some(ref token) = self.api_token {
            if token.expose_secret().is_empty() {
                anyhow::bail!("recognizer.api_token cannot be empty when set");
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("RUANON_RECOGNIZER_KIND") {
            self.kind = val.parse().context("Invalid RUANON_RECOGNIZER_KIND value")?;
        }

        if let Ok(val) = std::env::var("RUANON_RECOGNIZER_ENDPOINT") {
            self.endpoint = Some(val);
        }

        if let Ok(val) = std::env::var("RUANON_RECOGNIZER_API_TOKEN") {
            self.api_token = secret_string_opt(Some(val));
        }

        if let Ok(val) = std::env::var("RUANON_RECOGNIZER_TIMEOUT_MS") {
            self.timeout_ms = val
                .parse()
                .context("Invalid RUANON_RECOGNIZER_TIMEOUT_MS value")?;
        }

        if let Ok(val) = std::env::var("RUANON_RECOGNIZER_MAX_CONCURRENCY") {
            self.max_concurrency = val
                .parse()
                .context("Invalid RUANON_RECOGNIZER_MAX_CONCURRENCY value")?;
        }

        if let Ok(val) = std::env::var("RUANON_RECOGNIZER_FALLBACK_TO_PATTERNS") {
            self.fallback_to_patterns = val
                .parse()
                .context("Invalid RUANON_RECOGNIZER_FALLBACK_TO_PATTERNS value")?;
        }

        Ok(())
    }
}

/// Audit logging configuration (`[audit]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("audit.log_path cannot be empty when audit is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("RUANON_AUDIT_ENABLED") {
            self.enabled = val.parse().context("Invalid RUANON_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("RUANON_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("RUANON_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid RUANON_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}

/// Everything the engine needs to build itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub recognizer: RecognizerConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .context("Invalid engine configuration")?;
        self.recognizer
            .validate()
            .context("Invalid recognizer configuration")?;
        self.audit.validate().context("Invalid audit configuration")?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.engine.apply_env_overrides()?;
        self.recognizer.apply_env_overrides()?;
        self.audit.apply_env_overrides()?;
        Ok(())
    }
}

fn default_entity_types() -> Vec<EntityType> {
    EntityType::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_max_input_chars() -> usize {
    100_000
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::RuanonConfig;
use crate::domain::errors::RuanonError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`RuanonConfig`]
/// 4. Applies environment variable overrides (`RUANON_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`RuanonError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use ruanon::config::loader::load_config;
///
/// let config = load_config("ruanon.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RuanonConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RuanonError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RuanonError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same steps as [`load_config`] without the file access.
pub fn load_config_from_str(contents: &str) -> Result<RuanonConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RuanonConfig = toml::from_str(&contents)
        .map_err(|e| RuanonError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads `path` when it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply either way.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<RuanonConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
    let mut config = RuanonConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut RuanonConfig) -> Result<()> {
    apply_env_overrides(config)?;

    config.validate().map_err(|e| {
        RuanonError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RuanonError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
    }

    if !missing_vars.is_empty() {
        return Err(RuanonError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `RUANON_*` prefix
///
/// Variables follow the pattern `RUANON_<SECTION>_<KEY>`, for example
/// `RUANON_RECOGNIZER_ENDPOINT` or `RUANON_ENGINE_MAX_INPUT_CHARS`.
fn apply_env_overrides(config: &mut RuanonConfig) -> Result<()> {
    if let Ok(val) = std::env::var("RUANON_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val.to_lowercase();
    }

    if let Ok(val) = std::env::var("RUANON_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().map_err(|_| {
            RuanonError::Configuration(format!("Invalid RUANON_LOGGING_LOCAL_ENABLED: {val}"))
        })?;
    }
    if let Ok(val) = std::env::var("RUANON_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("RUANON_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    let to_config_error = |e: anyhow::Error| RuanonError::Configuration(format!("{e:#}"));
    config.engine.apply_env_overrides().map_err(to_config_error)?;
    config
        .recognizer
        .apply_env_overrides()
        .map_err(to_config_error)?;
    config.audit.apply_env_overrides().map_err(to_config_error)?;

    Ok(())
}

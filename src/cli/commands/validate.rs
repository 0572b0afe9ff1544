//! Validate config command implementation

use crate::config::load_config;
use crate::anonymization::AnonymizationEngine;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loads the file, validates every section and builds the engine, so
    /// pattern libraries and the recognizer client are checked as well.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let engine = match AnonymizationEngine::new(config.anonymization_config()) {
            Ok(engine) => engine,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e:#}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Entity Types: {:?}", config.engine.entity_types);
        println!("  Placeholder Style: {:?}", config.engine.placeholder_style);
        println!("  Max Input Chars: {}", config.engine.max_input_chars);
        println!("  Stop Words: {}", engine.stop_words().len());
        println!(
            "  Name Recognizer: {}",
            engine.name_recognizer().unwrap_or("disabled")
        );
        if let Some(ref endpoint) = config.recognizer.endpoint {
            println!("  Recognizer Endpoint: {endpoint}");
        }
        println!(
            "  Recognizer Bulkhead: {} concurrent, {}ms timeout",
            config.recognizer.max_concurrency, config.recognizer.timeout_ms
        );
        println!(
            "  Fallback To Patterns: {}",
            config.recognizer.fallback_to_patterns
        );
        println!("  Audit: {}", config.audit.enabled);
        println!();

        Ok(0)
    }
}

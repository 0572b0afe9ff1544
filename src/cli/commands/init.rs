//! Init command implementation
//!
//! Writes a commented `ruanon.toml` with every setting at its default.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "ruanon.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            eprintln!("❌ Configuration file already exists: {}", self.output);
            eprintln!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. For an external NER service set [recognizer] kind = \"http\"");
                println!("     and put the token in RUANON_NER_TOKEN (a .env file works)");
                println!("  3. Validate configuration: ruanon validate-config");
                println!("  4. Try it: echo 'Меня зовут Иван' | ruanon anonymize");
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Failed to write configuration file");
                eprintln!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate the default configuration document
    pub fn generate_config() -> String {
        r#"# Ruanon Configuration File
# Anonymization of personal data in Russian text

[application]
log_level = "info"  # trace | debug | info | warn | error

[engine]
# Entity types to detect
entity_types = ["PERSON", "PHONE_NUMBER", "ADDRESS", "INN", "PASSPORT"]

# Extra stop words, added to the built-in list.
# Words that must never be reported as person names.
stop_words = []
use_default_stop_words = true

# Longest accepted input, in characters
max_input_chars = 100000

# angle: <PERSON_1>   braced: {ИМЯ_1}
placeholder_style = "angle"

# Optional TOML file with extra regex patterns
# pattern_library = "./patterns.toml"

# How values are compared when deciding whether to reuse a placeholder:
# exact | text | digits_only | phone_canonical
[engine.normalization]
person = "text"
phone_number = "phone_canonical"
address = "text"
inn = "digits_only"
passport = "digits_only"

[recognizer]
# gazetteer: built-in list of given names
# http:      external NER service
# none:      no name recognition
kind = "gazetteer"
# endpoint = "http://localhost:8080/ner"
# api_token = "${RUANON_NER_TOKEN}"
timeout_ms = 5000
max_concurrency = 4
# Continue with pattern detection when the recognizer fails
fallback_to_patterns = false

[audit]
enabled = false
log_path = "./audit/anonymization.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
console_json = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_loads() {
        let config = load_config_from_str(&InitArgs::generate_config()).unwrap();
        assert_eq!(config.engine.max_input_chars, 100_000);
        assert!(!config.audit.enabled);
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ruanon.toml");
        fs::write(&path, "# existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# existing");

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            force: true,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[recognizer]"));
    }
}

//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Ruanon using clap.
//!
//! Exit codes: 0 success, 2 configuration error, 3 partial batch failure,
//! 5 fatal error.

pub mod commands;

use clap::{Parser, Subcommand};

/// Ruanon - anonymization of personal data in Russian text
#[derive(Parser, Debug)]
#[command(name = "ruanon")]
#[command(version, about, long_about = None)]
#[command(author = "Ruanon Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "ruanon.toml", env = "RUANON_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUANON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize one text from a file or stdin
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Anonymize a JSON lines file
    Batch(commands::batch::BatchArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Run the selected command and return its exit code
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Anonymize(args) => args.execute(&self.config).await,
            Commands::Batch(args) => args.execute(&self.config).await,
            Commands::ValidateConfig(args) => args.execute(&self.config).await,
            Commands::Init(args) => args.execute().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::EntityType;

    #[test]
    fn test_cli_parse_anonymize() {
        let cli = Cli::parse_from(["ruanon", "anonymize"]);
        assert_eq!(cli.config, "ruanon.toml");
        assert!(matches!(cli.command, Commands::Anonymize(_)));
    }

    #[test]
    fn test_cli_parse_anonymize_options() {
        let cli = Cli::parse_from([
            "ruanon",
            "anonymize",
            "--stop-word",
            "встреча",
            "--stop-word",
            "праздник",
            "--entity",
            "PERSON",
            "--entity",
            "phone",
        ]);
        let Commands::Anonymize(args) = cli.command else {
            panic!("expected anonymize");
        };
        assert_eq!(args.stop_words, vec!["встреча", "праздник"]);
        assert_eq!(args.entities, vec![EntityType::Person, EntityType::PhoneNumber]);
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["ruanon", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["ruanon", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_batch() {
        let cli = Cli::parse_from(["ruanon", "batch", "--input", "texts.jsonl"]);
        assert!(matches!(cli.command, Commands::Batch(_)));
    }

    #[test]
    fn test_cli_parse_init_force() {
        let cli = Cli::parse_from(["ruanon", "init", "--force"]);
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert!(args.force);
    }
}

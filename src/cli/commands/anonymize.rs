//! Anonymize command implementation
//!
//! Reads one text from a file or stdin and prints the anonymized result as
//! JSON on stdout.

use super::{build_engine, AnonymizedOutput};
use crate::anonymization::{AnonymizeOptions, EntityType};
use anyhow::Context;
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// File to read; stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Extra stop word for this call (repeatable)
    #[arg(long = "stop-word", value_name = "WORD")]
    pub stop_words: Vec<String>,

    /// Restrict detection to an entity type (repeatable)
    #[arg(long = "entity", value_name = "TYPE")]
    pub entities: Vec<EntityType>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let engine = match build_engine(config_path) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ Configuration error: {e:#}");
                return Ok(2);
            }
        };

        let text = self.read_input()?;

        let mut options = AnonymizeOptions::default().with_stop_words(self.stop_words.clone());
        if !self.entities.is_empty() {
            options = options.with_entity_types(self.entities.clone());
        }

        let result = match engine.anonymize_with(&text, &options).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error_kind = e.kind(), error = %e, "Anonymization failed");
                eprintln!("❌ Anonymization failed: {e}");
                return Ok(5);
            }
        };

        let output = AnonymizedOutput::from(&result);
        let json = if self.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        println!("{json}");

        Ok(0)
    }

    fn read_input(&self) -> anyhow::Result<String> {
        match self.input {
            Some(ref path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display())),
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                Ok(text)
            }
        }
    }
}

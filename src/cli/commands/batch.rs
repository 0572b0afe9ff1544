//! Batch command implementation
//!
//! Reads JSON lines of the form `{"text": "..."}` and writes one JSON line
//! per input, in order. Failed items are written as `{"error": ...}` and
//! make the command exit with the partial-failure code.

use super::{build_engine, AnonymizedOutput};
use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON lines input file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct BatchItem {
    text: String,
}

#[derive(Debug, Serialize)]
struct BatchError {
    line: usize,
    error: String,
    kind: &'static str,
}

impl BatchArgs {
    /// Execute the batch command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let engine = match build_engine(config_path) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ Configuration error: {e:#}");
                return Ok(2);
            }
        };

        let content = std::fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read batch file {}", self.input.display()))?;

        // (line number, parsed text or parse error)
        let items: Vec<(usize, Result<String, String>)> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                let parsed = serde_json::from_str::<BatchItem>(line)
                    .map(|item| item.text)
                    .map_err(|e| format!("Invalid batch line: {e}"));
                (idx + 1, parsed)
            })
            .collect();

        let texts: Vec<String> = items
            .iter()
            .filter_map(|(_, parsed)| parsed.as_ref().ok().cloned())
            .collect();

        tracing::info!(items = items.len(), valid = texts.len(), "Starting batch");
        let mut results = engine.anonymize_batch(&texts).await.into_iter();

        let mut lines = Vec::with_capacity(items.len());
        let mut failures = 0usize;
        for (line, parsed) in &items {
            let json = match parsed {
                Err(message) => {
                    failures += 1;
                    crate::log_error_with_context!(message, "batch input line");
                    serde_json::to_string(&BatchError {
                        line: *line,
                        error: message.clone(),
                        kind: "invalid_line",
                    })?
                }
                Ok(_) => match results.next() {
                    Some(Ok(result)) => serde_json::to_string(&AnonymizedOutput::from(&result))?,
                    Some(Err(e)) => {
                        failures += 1;
                        serde_json::to_string(&BatchError {
                            line: *line,
                            error: e.to_string(),
                            kind: e.kind(),
                        })?
                    }
                    None => anyhow::bail!("Batch produced fewer results than inputs"),
                },
            };
            lines.push(json);
        }

        self.write_output(&lines)?;

        tracing::info!(total = items.len(), failures, "Batch completed");
        if failures > 0 {
            eprintln!("⚠️  {failures} of {} items failed", items.len());
            return Ok(3);
        }
        Ok(0)
    }

    fn write_output(&self, lines: &[String]) -> anyhow::Result<()> {
        let mut writer: Box<dyn Write> = match self.output {
            Some(ref path) => Box::new(std::io::BufWriter::new(
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create output file {}", path.display()))?,
            )),
            None => Box::new(std::io::stdout().lock()),
        };

        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_batch_writes_one_line_per_item() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out.jsonl");
        std::fs::write(
            &input,
            "{\"text\": \"ИНН 7707083893\"}\n\nnot json\n{\"text\": \"Звонила Анна\"}\n",
        )
        .unwrap();

        let args = BatchArgs {
            input,
            output: Some(output.clone()),
        };
        let config_path = dir.path().join("ruanon.toml");
        let code = args.execute(config_path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 3);

        let written = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["anonymized_text"], "ИНН <INN_1>");
        assert_eq!(lines[1]["line"], 3);
        assert_eq!(lines[1]["kind"], "invalid_line");
        assert_eq!(lines[2]["anonymized_text"], "Звонила <PERSON_1>");
        assert_eq!(lines[2]["mapping"]["<PERSON_1>"], "Анна");
    }

    #[tokio::test]
    async fn test_batch_all_ok() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        std::fs::write(&input, "{\"text\": \"без данных\"}\n").unwrap();

        let args = BatchArgs {
            input,
            output: Some(dir.path().join("out.jsonl")),
        };
        let config_path = dir.path().join("ruanon.toml");
        assert_eq!(args.execute(config_path.to_str().unwrap()).await.unwrap(), 0);
    }
}

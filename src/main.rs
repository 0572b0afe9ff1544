// Ruanon - Anonymization of personal data in Russian text
// Copyright (c) 2025 Ruanon Contributors
// Licensed under the MIT License

use clap::Parser;
use ruanon::cli::Cli;
use ruanon::config::load_config;
use ruanon::logging::init_logging;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; commands
    // report configuration errors themselves
    let file_config = if Path::new(&cli.config).exists() {
        load_config(&cli.config).ok()
    } else {
        None
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "warn".to_string());
    let logging_config = file_config.map(|c| c.logging).unwrap_or_default();

    let _guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Ruanon starting");

    let exit_code = match cli.execute().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5
        }
    };

    process::exit(exit_code);
}

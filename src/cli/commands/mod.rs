//! CLI command implementations

pub mod anonymize;
pub mod batch;
pub mod init;
pub mod validate;

use crate::anonymization::{AnonymizationEngine, AnonymizationResult, EntityType};
use crate::config::load_config_or_default;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON shape printed for one anonymized text
#[derive(Debug, Serialize)]
pub struct AnonymizedOutput {
    pub request_id: String,
    pub anonymized_text: String,
    /// `placeholder -> original`
    pub mapping: BTreeMap<String, String>,
    pub stats_by_type: BTreeMap<EntityType, usize>,
    pub processing_time_ms: u64,
}

impl From<&AnonymizationResult> for AnonymizedOutput {
    fn from(result: &AnonymizationResult) -> Self {
        Self {
            request_id: result.request_id.to_string(),
            anonymized_text: result.anonymized_text.clone(),
            mapping: result.mapping_as_map(),
            stats_by_type: result.stats_by_type.clone(),
            processing_time_ms: result.processing_time_ms,
        }
    }
}

/// Load configuration (defaults when the file is absent) and build the engine
pub(crate) fn build_engine(config_path: &str) -> anyhow::Result<AnonymizationEngine> {
    let config = load_config_or_default(config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;
    AnonymizationEngine::new(config.anonymization_config())
}

//! Anonymization result models

use super::span::{EntityType, Span};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One entry of the externally visible mapping
///
/// There is exactly one entry per distinct normalized value per type.
/// `original` is the first raw form seen for that value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Rendered placeholder token, e.g. `<PERSON_1>`
    pub placeholder: String,
    /// Representative original text
    pub original: String,
    /// Entity type of the value
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

/// A resolved span together with the placeholder that replaced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub span: Span,
    pub placeholder: String,
}

/// Result of anonymizing one text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationResult {
    /// Per-call identifier, used to correlate logs and audit entries
    pub request_id: Uuid,
    /// Input text with every resolved span replaced by its placeholder
    pub anonymized_text: String,
    /// Placeholder to original mapping, in order of first appearance
    pub mapping: Vec<MappingEntry>,
    /// Resolved spans in document order
    pub detections: Vec<Detection>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Timestamp of anonymization
    pub timestamp: DateTime<Utc>,
    /// Number of detections per entity type
    pub stats_by_type: BTreeMap<EntityType, usize>,
}

impl AnonymizationResult {
    /// Create a new anonymization result
    pub fn new(
        anonymized_text: String,
        mapping: Vec<MappingEntry>,
        detections: Vec<Detection>,
        processing_time_ms: u64,
    ) -> Self {
        let mut stats_by_type = BTreeMap::new();
        for detection in &detections {
            *stats_by_type.entry(detection.span.entity_type()).or_insert(0) += 1;
        }

        Self {
            request_id: Uuid::new_v4(),
            anonymized_text,
            mapping,
            detections,
            processing_time_ms,
            timestamp: Utc::now(),
            stats_by_type,
        }
    }

    /// Result for a text with nothing to anonymize
    pub fn unchanged(text: &str, processing_time_ms: u64) -> Self {
        Self::new(text.to_string(), Vec::new(), Vec::new(), processing_time_ms)
    }

    /// Get total number of detections
    pub fn total_detections(&self) -> usize {
        self.detections.len()
    }

    /// Check if any personal data was detected
    pub fn has_detections(&self) -> bool {
        !self.detections.is_empty()
    }

    /// Mapping in `placeholder -> original` object form
    pub fn mapping_as_map(&self) -> BTreeMap<String, String> {
        self.mapping
            .iter()
            .map(|entry| (entry.placeholder.clone(), entry.original.clone()))
            .collect()
    }

    /// Look up the original text behind a placeholder
    pub fn original_for(&self, placeholder: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|entry| entry.placeholder == placeholder)
            .map(|entry| entry.original.as_str())
    }

    /// Placeholders assigned to a given entity type, in order
    pub fn placeholders_of(&self, entity_type: EntityType) -> Vec<&str> {
        self.mapping
            .iter()
            .filter(|entry| entry.entity_type == entity_type)
            .map(|entry| entry.placeholder.as_str())
            .collect()
    }

    /// Reconstruct the original text exactly
    ///
    /// Uses each detection's raw text, so value-equal spans that were
    /// written differently come back in their own spelling.
    pub fn restore(&self) -> String {
        crate::anonymization::substitution::restore_detections(
            &self.anonymized_text,
            &self.detections,
        )
    }
}

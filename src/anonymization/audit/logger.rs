//! Audit logger for anonymization operations

use crate::anonymization::models::{AnonymizationResult, Detection, EntityType};
use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    request_id: String,
    detections_count: usize,
    placeholders_count: usize,
    processing_time_ms: u64,
    stats_by_type: BTreeMap<EntityType, usize>,
    detections: Vec<AuditDetection>,
}

/// Audit detection entry (with hashed original)
#[derive(Debug, Serialize)]
struct AuditDetection {
    entity_type: EntityType,
    placeholder: String,
    start: usize,
    end: usize,
    confidence: f32,
    /// SHA-256 hash of the original text (plaintext is never logged)
    value_hash: String,
}

/// Append-only audit trail of anonymization calls
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
    // Serializes appends from concurrent requests
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
            write_lock: Mutex::new(()),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Record one anonymization result
    pub fn log_anonymization(&self, result: &AnonymizationResult) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: result.timestamp.to_rfc3339(),
            request_id: result.request_id.to_string(),
            detections_count: result.detections.len(),
            placeholders_count: result.mapping.len(),
            processing_time_ms: result.processing_time_ms,
            stats_by_type: result.stats_by_type.clone(),
            detections: result
                .detections
                .iter()
                .map(|d| self.create_audit_detection(d))
                .collect(),
        };

        self.write_entry(&entry)
    }

    fn create_audit_detection(&self, detection: &Detection) -> AuditDetection {
        AuditDetection {
            entity_type: detection.span.entity_type(),
            placeholder: detection.placeholder.clone(),
            start: detection.span.start(),
            end: detection.span.end(),
            confidence: detection.span.confidence(),
            value_hash: hash_value(detection.span.text()),
        }
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let line = if self.json_format {
            serde_json::to_string(entry).context("Failed to serialize audit entry")?
        } else {
            let types = entry
                .stats_by_type
                .iter()
                .map(|(t, n)| format!("{t}={n}"))
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "[{}] Request: {} | Detections: {} | Placeholders: {} | Types: {} | Time: {}ms",
                entry.timestamp,
                entry.request_id,
                entry.detections_count,
                entry.placeholders_count,
                types,
                entry.processing_time_ms
            )
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Audit log lock poisoned"))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        writeln!(file, "{line}").context("Failed to write audit entry")?;

        Ok(())
    }
}

/// Hash a personal-data value using SHA-256
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{Span, SpanSource};
    use crate::anonymization::models::MappingEntry;
    use tempfile::tempdir;

    fn sample_result() -> AnonymizationResult {
        let text = "Иван, ИНН 7707083893";
        let person = Span::from_text(text, 0, "Иван".len(), EntityType::Person, 0.8, SpanSource::Model)
            .unwrap();
        let inn_start = text.find("7707").unwrap();
        let inn = Span::from_text(text, inn_start, text.len(), EntityType::Inn, 0.85, SpanSource::Pattern)
            .unwrap();

        AnonymizationResult::new(
            "<PERSON_1>, ИНН <INN_1>".to_string(),
            vec![
                MappingEntry {
                    placeholder: "<PERSON_1>".to_string(),
                    original: "Иван".to_string(),
                    entity_type: EntityType::Person,
                },
                MappingEntry {
                    placeholder: "<INN_1>".to_string(),
                    original: "7707083893".to_string(),
                    entity_type: EntityType::Inn,
                },
            ],
            vec![
                Detection {
                    span: person,
                    placeholder: "<PERSON_1>".to_string(),
                },
                Detection {
                    span: inn,
                    placeholder: "<INN_1>".to_string(),
                },
            ],
            3,
        )
    }

    #[test]
    fn test_audit_logger_creation() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("audit.log");

        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();
        assert!(logger.enabled);
        assert!(log_path.parent().unwrap().exists());
    }

    #[test]
    fn test_hash_value() {
        let hash1 = hash_value("Иван");
        let hash2 = hash_value("Иван");
        let hash3 = hash_value("Анна");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_json_entry_has_no_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        let result = sample_result();
        logger.log_anonymization(&result).unwrap();
        logger.log_anonymization(&result).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!content.contains("Иван"));
        assert!(!content.contains("7707083893"));

        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["detections_count"], 2);
        assert_eq!(entry["stats_by_type"]["INN"], 1);
        assert_eq!(entry["detections"][0]["value_hash"], hash_value("Иван"));
        assert_eq!(entry["request_id"], result.request_id.to_string());
    }

    #[test]
    fn test_plain_text_entry() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        logger.log_anonymization(&sample_result()).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Detections: 2"));
        assert!(content.contains("PERSON=1"));
        assert!(!content.contains("Иван"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        logger.log_anonymization(&sample_result()).unwrap();
        assert!(!log_path.exists());
    }
}

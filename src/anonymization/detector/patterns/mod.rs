//! Custom pattern library
//!
//! Deployments can add their own regular expressions for any entity type
//! through a TOML file referenced by `engine.pattern_library`:
//!
//! ```toml
//! [patterns.office_extension]
//! entity_type = "PHONE_NUMBER"
//! patterns = ['доб\. [0-9]{3,4}']
//! confidence = 0.8
//! ```
//!
//! Custom spans go through the same merger as built-in ones.

use super::SpanRecognizer;
use crate::anonymization::models::{EntityType, Span, SpanSource};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this entity type
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Entity type label (`PERSON`, `PHONE_NUMBER`, `ADDRESS`, `INN`, `PASSPORT`)
    #[serde(alias = "category")]
    pub entity_type: String,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Library key the pattern came from
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    pub entity_type: EntityType,
    pub confidence: f32,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    #[serde(default)]
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Registry of user-supplied patterns
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_type: HashMap<EntityType, Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Create a pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut registry = Self::default();

        // BTreeMap keeps registration order stable across runs
        for (name, def) in library.patterns {
            let entity_type: EntityType = def.entity_type.parse().with_context(|| {
                format!(
                    "Invalid entity type in pattern '{}': {}",
                    name, def.entity_type
                )
            })?;

            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Confidence for pattern '{name}' must be between 0.0 and 1.0, got {}",
                    def.confidence
                );
            }

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                let compiled = CompiledPattern {
                    name: name.clone(),
                    regex,
                    entity_type,
                    confidence: def.confidence,
                };

                registry.patterns.push(compiled.clone());
                registry
                    .patterns_by_type
                    .entry(entity_type)
                    .or_default()
                    .push(compiled);
            }
        }

        Ok(registry)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific entity type
    pub fn patterns_for_type(&self, entity_type: EntityType) -> Option<&[CompiledPattern]> {
        self.patterns_by_type
            .get(&entity_type)
            .map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// One recognizer per entity type that has patterns, limited to `enabled`
    pub fn recognizers(&self, enabled: &[EntityType]) -> Vec<Arc<dyn SpanRecognizer>> {
        EntityType::ALL
            .iter()
            .filter(|t| enabled.contains(*t))
            .filter_map(|t| {
                self.patterns_for_type(*t).map(|patterns| {
                    Arc::new(CustomPatternRecognizer {
                        entity_type: *t,
                        patterns: patterns.to_vec(),
                    }) as Arc<dyn SpanRecognizer>
                })
            })
            .collect()
    }
}

/// Recognizer backed by custom patterns of a single entity type
pub struct CustomPatternRecognizer {
    entity_type: EntityType,
    patterns: Vec<CompiledPattern>,
}

impl SpanRecognizer for CustomPatternRecognizer {
    fn name(&self) -> &str {
        "custom"
    }

    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    fn recognize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Span> + 'a> {
        Box::new(self.patterns.iter().flat_map(move |pattern| {
            pattern
                .regex
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .filter_map(move |m| {
                    Span::from_text(
                        text,
                        m.start(),
                        m.end(),
                        pattern.entity_type,
                        pattern.confidence,
                        SpanSource::Pattern,
                    )
                    .ok()
                })
        }))
    }
}

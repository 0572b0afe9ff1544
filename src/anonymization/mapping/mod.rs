//! Placeholder assignment
//!
//! A [`MappingStore`] lives for exactly one anonymization call. It hands out
//! `TYPE_N` placeholders with per-type counters starting at 1 and reuses a
//! placeholder whenever a value of the same type normalizes to a key that
//! was already seen.

pub mod normalize;

use crate::anonymization::models::{EntityType, MappingEntry, Span};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use normalize::{Normalization, NormalizationPolicy};

/// Rendering of placeholder tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `<PERSON_1>`
    #[default]
    Angle,
    /// `{ИМЯ_1}`
    Braced,
}

/// A typed placeholder identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub entity_type: EntityType,
    pub ordinal: u32,
}

impl Placeholder {
    pub fn render(&self, style: PlaceholderStyle) -> String {
        match style {
            PlaceholderStyle::Angle => format!("<{}_{}>", self.entity_type.label(), self.ordinal),
            PlaceholderStyle::Braced => {
                format!("{{{}_{}}}", self.entity_type.ru_label(), self.ordinal)
            }
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PlaceholderStyle::Angle))
    }
}

/// Per-call store of assigned placeholders
pub struct MappingStore<'a> {
    policy: &'a NormalizationPolicy,
    style: PlaceholderStyle,
    assigned: HashMap<(EntityType, String), usize>,
    counters: HashMap<EntityType, u32>,
    entries: Vec<MappingEntry>,
}

impl<'a> MappingStore<'a> {
    /// Create an empty store
    pub fn new(policy: &'a NormalizationPolicy, style: PlaceholderStyle) -> Self {
        Self {
            policy,
            style,
            assigned: HashMap::new(),
            counters: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Return the rendered placeholder for a span, assigning one if needed
    ///
    /// Spans must be fed in document order; ordinals follow first appearance.
    pub fn assign(&mut self, span: &Span) -> String {
        let entity_type = span.entity_type();
        let key = (entity_type, self.policy.key(entity_type, span.text()));

        if let Some(&index) = self.assigned.get(&key) {
            return self.entries[index].placeholder.clone();
        }

        let counter = self.counters.entry(entity_type).or_insert(0);
        *counter += 1;

        let placeholder = Placeholder {
            entity_type,
            ordinal: *counter,
        }
        .render(self.style);

        self.assigned.insert(key, self.entries.len());
        self.entries.push(MappingEntry {
            placeholder: placeholder.clone(),
            original: span.text().to_string(),
            entity_type,
        });

        placeholder
    }

    /// Number of distinct values seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the store, yielding the mapping in order of first appearance
    pub fn into_entries(self) -> Vec<MappingEntry> {
        self.entries
    }
}

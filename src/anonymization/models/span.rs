//! Entity types and detected spans

use crate::domain::{Result, RuanonError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of personal data the engine recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// Person names (given name, surname, patronymic)
    Person,
    /// Russian phone numbers
    PhoneNumber,
    /// Postal addresses, including apartment and metro qualifiers
    Address,
    /// Taxpayer identification numbers (10 or 12 digits)
    Inn,
    /// Passport series and number
    Passport,
}

impl EntityType {
    /// All entity types, in placeholder-label order
    pub const ALL: [EntityType; 5] = [
        EntityType::Person,
        EntityType::PhoneNumber,
        EntityType::Address,
        EntityType::Inn,
        EntityType::Passport,
    ];

    /// Get the placeholder label for the type
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Address => "ADDRESS",
            Self::Inn => "INN",
            Self::Passport => "PASSPORT",
        }
    }

    /// Get the Russian label used by the braced placeholder style
    pub fn ru_label(&self) -> &'static str {
        match self {
            Self::Person => "ИМЯ",
            Self::PhoneNumber => "ТЕЛЕФОН",
            Self::Address => "АДРЕС",
            Self::Inn => "ИНН",
            Self::Passport => "ПАСПОРТ",
        }
    }

    /// Check if this type is produced by a deterministic pattern recognizer
    ///
    /// Structured types outrank [`EntityType::Person`] when spans overlap.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Person)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityType {
    type Err = RuanonError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "PERSON" | "PER" | "NAME" | "ИМЯ" => Ok(Self::Person),
            "PHONE_NUMBER" | "PHONE" | "ТЕЛЕФОН" => Ok(Self::PhoneNumber),
            "ADDRESS" | "LOCATION" | "LOC" | "АДРЕС" => Ok(Self::Address),
            "INN" | "ИНН" => Ok(Self::Inn),
            "PASSPORT" | "ПАСПОРТ" => Ok(Self::Passport),
            _ => Err(RuanonError::Validation(format!("Unknown entity type: {s}"))),
        }
    }
}

/// Where a span came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanSource {
    /// Statistical name recognition model
    Model,
    /// Deterministic pattern recognizer
    Pattern,
}

/// A contiguous region of the input identified as personal data
///
/// Offsets are UTF-8 byte offsets into the input and always fall on
/// character boundaries. Spans are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
    entity_type: EntityType,
    text: String,
    confidence: f32,
    source: SpanSource,
}

impl Span {
    /// Create a span from parts
    ///
    /// # Errors
    ///
    /// Returns [`RuanonError::Validation`] when the range is empty or its
    /// length disagrees with `text`.
    pub fn new(
        start: usize,
        end: usize,
        entity_type: EntityType,
        text: impl Into<String>,
        confidence: f32,
        source: SpanSource,
    ) -> Result<Self> {
        let text = text.into();
        if start >= end || end - start != text.len() {
            return Err(RuanonError::Validation(format!(
                "Span range {start}..{end} does not match text of length {}",
                text.len()
            )));
        }

        Ok(Self {
            start,
            end,
            entity_type,
            text,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        })
    }

    /// Create a span by slicing `source_text` at `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns [`RuanonError::Validation`] when the range is empty, out of
    /// bounds, or splits a character.
    pub fn from_text(
        source_text: &str,
        start: usize,
        end: usize,
        entity_type: EntityType,
        confidence: f32,
        source: SpanSource,
    ) -> Result<Self> {
        if start >= end || end > source_text.len() {
            return Err(RuanonError::Validation(format!(
                "Invalid span range {start}..{end} for text of length {}",
                source_text.len()
            )));
        }
        let text = source_text.get(start..end).ok_or_else(|| {
            RuanonError::Validation(format!(
                "Span range {start}..{end} does not fall on character boundaries"
            ))
        })?;

        Ok(Self {
            start,
            end,
            entity_type,
            text: text.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            source,
        })
    }

    /// Start offset (inclusive)
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Spans are never empty; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// The original substring covered by the span
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn source(&self) -> SpanSource {
        self.source
    }

    /// Whether the two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(EntityType::Person.label(), "PERSON");
        assert_eq!(EntityType::PhoneNumber.label(), "PHONE_NUMBER");
        assert_eq!(EntityType::Address.ru_label(), "АДРЕС");
    }

    #[test]
    fn test_from_str_accepts_aliases() {
        assert_eq!("per".parse::<EntityType>().unwrap(), EntityType::Person);
        assert_eq!("ТЕЛЕФОН".parse::<EntityType>().unwrap(), EntityType::PhoneNumber);
        assert_eq!("inn".parse::<EntityType>().unwrap(), EntityType::Inn);
        assert!("EMAIL".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_only_person_is_unstructured() {
        let structured: Vec<_> = EntityType::ALL
            .iter()
            .filter(|t| !t.is_structured())
            .collect();
        assert_eq!(structured, vec![&EntityType::Person]);
    }

    #[test]
    fn test_span_from_text() {
        let text = "ИНН 1234567890";
        let start = text.find('1').unwrap();
        let span = Span::from_text(
            text,
            start,
            text.len(),
            EntityType::Inn,
            0.9,
            SpanSource::Pattern,
        )
        .unwrap();
        assert_eq!(span.text(), "1234567890");
        assert_eq!(span.len(), 10);
    }

    #[test]
    fn test_span_rejects_malformed_ranges() {
        let text = "Иван";
        assert!(Span::from_text(text, 2, 2, EntityType::Person, 1.0, SpanSource::Model).is_err());
        assert!(Span::from_text(text, 0, 99, EntityType::Person, 1.0, SpanSource::Model).is_err());
        // Byte 1 is inside the two-byte "И"
        assert!(Span::from_text(text, 1, 4, EntityType::Person, 1.0, SpanSource::Model).is_err());
    }

    #[test]
    fn test_overlap_and_containment() {
        let text = "северный пр 69";
        let outer =
            Span::from_text(text, 0, text.len(), EntityType::Address, 0.9, SpanSource::Pattern)
                .unwrap();
        let inner = Span::from_text(text, 0, "северный".len(), EntityType::Person, 0.8, SpanSource::Model)
            .unwrap();
        assert!(outer.overlaps(&inner));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_span_new_checks_length() {
        assert!(Span::new(4, 8, EntityType::Person, "Иван", 0.9, SpanSource::Model).is_err());
        let span = Span::new(4, 12, EntityType::Person, "Иван", 0.9, SpanSource::Model).unwrap();
        assert_eq!(span.len(), 8);
    }

    #[test]
    fn test_confidence_clamped() {
        let span = Span::from_text("abc", 0, 3, EntityType::Inn, 4.0, SpanSource::Pattern).unwrap();
        assert_eq!(span.confidence(), 1.0);
    }
}

//! Pattern-based detection
//!
//! Provides the [`SpanRecognizer`] seam and the deterministic recognizers
//! for structured Russian identifiers. Recognizers are pure: the same text
//! always yields the same spans, and they hold no per-call state, so one
//! instance is shared by every concurrent anonymization call.

pub mod address;
pub mod inn;
pub mod passport;
pub mod patterns;
pub mod phone;

use crate::anonymization::models::{EntityType, Span};
use anyhow::Result;
use std::sync::Arc;

pub use address::AddressRecognizer;
pub use inn::InnRecognizer;
pub use passport::PassportRecognizer;
pub use patterns::{CustomPatternRecognizer, PatternRegistry};
pub use phone::PhoneRecognizer;

/// Trait for deterministic span recognizers
pub trait SpanRecognizer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Entity type of every span this recognizer yields
    fn entity_type(&self) -> EntityType;

    /// Lazily yield candidate spans found in `text`
    ///
    /// Candidates may overlap each other; the span merger resolves them.
    fn recognize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Span> + 'a>;
}

/// Build the built-in recognizers for the requested entity types
///
/// PERSON has no pattern recognizer and is skipped here.
pub fn builtin_recognizers(entity_types: &[EntityType]) -> Result<Vec<Arc<dyn SpanRecognizer>>> {
    let mut recognizers: Vec<Arc<dyn SpanRecognizer>> = Vec::new();

    for entity_type in entity_types {
        match entity_type {
            EntityType::Person => {}
            EntityType::PhoneNumber => recognizers.push(Arc::new(PhoneRecognizer::new()?)),
            EntityType::Inn => recognizers.push(Arc::new(InnRecognizer::new()?)),
            EntityType::Passport => recognizers.push(Arc::new(PassportRecognizer::new()?)),
            EntityType::Address => recognizers.push(Arc::new(AddressRecognizer::new()?)),
        }
    }

    Ok(recognizers)
}

/// True when the match is not glued to neighbouring digits
///
/// Used to keep identifier patterns from matching inside longer numbers.
pub(crate) fn digit_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_recognizers_skip_person() {
        let recognizers = builtin_recognizers(&EntityType::ALL).unwrap();
        assert_eq!(recognizers.len(), 4);
        assert!(recognizers
            .iter()
            .all(|r| r.entity_type() != EntityType::Person));
    }

    #[test]
    fn test_builtin_recognizers_respect_selection() {
        let recognizers = builtin_recognizers(&[EntityType::Inn]).unwrap();
        assert_eq!(recognizers.len(), 1);
        assert_eq!(recognizers[0].entity_type(), EntityType::Inn);
    }

    #[test]
    fn test_digit_bounded() {
        let text = "a1234567890b";
        assert!(digit_bounded(text, 1, 11));
        assert!(!digit_bounded(text, 2, 11));
        assert!(!digit_bounded(text, 1, 10));
    }
}

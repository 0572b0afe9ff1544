//! Taxpayer identification number recognizer

use super::SpanRecognizer;
use crate::anonymization::models::{EntityType, Span, SpanSource};
use anyhow::{Context, Result};
use regex::Regex;

const CONFIDENCE: f32 = 0.85;

/// Recognizes standalone runs of exactly 10 (organization) or 12
/// (individual) digits
///
/// Only maximal digit runs are considered, so a 10-digit window inside a
/// longer number never matches.
pub struct InnRecognizer {
    digit_run: Regex,
}

impl InnRecognizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            digit_run: Regex::new(r"[0-9]+").context("Invalid INN pattern")?,
        })
    }
}

impl SpanRecognizer for InnRecognizer {
    fn name(&self) -> &str {
        "inn"
    }

    fn entity_type(&self) -> EntityType {
        EntityType::Inn
    }

    fn recognize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Span> + 'a> {
        Box::new(
            self.digit_run
                .find_iter(text)
                .filter(|m| matches!(m.len(), 10 | 12))
                .filter_map(move |m| {
                    Span::from_text(
                        text,
                        m.start(),
                        m.end(),
                        EntityType::Inn,
                        CONFIDENCE,
                        SpanSource::Pattern,
                    )
                    .ok()
                }),
        )
    }
}

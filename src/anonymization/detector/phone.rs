//! Russian phone number recognizer

use super::{digit_bounded, SpanRecognizer};
use crate::anonymization::models::{EntityType, Span, SpanSource};
use anyhow::{Context, Result};
use regex::Regex;

/// Country or trunk prefix followed by ten digits
const PREFIXED: &str =
    r"(?:\+7|8|7)[ \t-]?\(?[0-9]{3}\)?[ \t-]?[0-9]{3}[ \t-]?[0-9]{2}[ \t-]?[0-9]{2}";

/// Ten digits without a prefix; only accepted when grouped with separators
const BARE: &str = r"\(?[0-9]{3}\)?[ \t-]?[0-9]{3}[ \t-]?[0-9]{2}[ \t-]?[0-9]{2}";

const PREFIXED_CONFIDENCE: f32 = 0.9;
const BARE_CONFIDENCE: f32 = 0.75;

/// Recognizes `+7`/`8`/`7`-prefixed numbers and grouped ten-digit numbers
pub struct PhoneRecognizer {
    prefixed: Regex,
    bare: Regex,
}

impl PhoneRecognizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            prefixed: Regex::new(PREFIXED).context("Invalid prefixed phone pattern")?,
            bare: Regex::new(BARE).context("Invalid bare phone pattern")?,
        })
    }

    fn prefixed_spans<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Span> + 'a {
        self.prefixed
            .find_iter(text)
            .filter(move |m| digit_bounded(text, m.start(), m.end()))
            .filter_map(move |m| {
                Span::from_text(
                    text,
                    m.start(),
                    m.end(),
                    EntityType::PhoneNumber,
                    PREFIXED_CONFIDENCE,
                    SpanSource::Pattern,
                )
                .ok()
            })
    }

    fn bare_spans<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Span> + 'a {
        self.bare
            .find_iter(text)
            .filter(|m| m.as_str().contains([' ', '\t', '-', '(', ')']))
            .filter(move |m| digit_bounded(text, m.start(), m.end()))
            .filter_map(move |m| {
                Span::from_text(
                    text,
                    m.start(),
                    m.end(),
                    EntityType::PhoneNumber,
                    BARE_CONFIDENCE,
                    SpanSource::Pattern,
                )
                .ok()
            })
    }
}

impl SpanRecognizer for PhoneRecognizer {
    fn name(&self) -> &str {
        "phone"
    }

    fn entity_type(&self) -> EntityType {
        EntityType::PhoneNumber
    }

    fn recognize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Span> + 'a> {
        Box::new(self.prefixed_spans(text).chain(self.bare_spans(text)))
    }
}

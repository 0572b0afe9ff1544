//! Russian internal passport recognizer
//!
//! Three shapes are recognized:
//! - series cue: `серия 45 10 № 123456`, `серия 4510 номер 123456`
//! - spaced: `45 10 123456`
//! - keyword cue: `4510 123456` or `4510123456` within a short window after
//!   the word "паспорт", unless an "ИНН" label sits between the two
//!
//! When a series cue is present the span starts at the cue word; a leading
//! "паспорт" is never part of the span.

use super::{digit_bounded, SpanRecognizer};
use crate::anonymization::models::{EntityType, Span, SpanSource};
use anyhow::{Context, Result};
use regex::Regex;

const SERIES_CUE: &str = r"(?i:серия|сер\.)[ \t]*(?:№[ \t]*)?[0-9]{2}[ \t]?[0-9]{2}[ \t]*,?[ \t]*(?:(?i:номер|ном\.|№)[ \t]*)?[0-9]{6}";
const SPACED: &str = r"[0-9]{2} [0-9]{2} [0-9]{6}";
const COMPACT: &str = r"[0-9]{4} ?[0-9]{6}";

/// How far back, in characters, the word "паспорт" may appear
const KEYWORD_WINDOW_CHARS: usize = 40;

/// Recognizes passport series and number
pub struct PassportRecognizer {
    series_cue: Regex,
    spaced: Regex,
    compact: Regex,
}

impl PassportRecognizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            series_cue: Regex::new(SERIES_CUE).context("Invalid passport series pattern")?,
            spaced: Regex::new(SPACED).context("Invalid spaced passport pattern")?,
            compact: Regex::new(COMPACT).context("Invalid compact passport pattern")?,
        })
    }

    fn keyword_before(text: &str, start: usize) -> bool {
        let window: String = text[..start]
            .chars()
            .rev()
            .take(KEYWORD_WINDOW_CHARS)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let window = window.to_lowercase();
        let Some(cue) = window.rfind("паспорт") else {
            return false;
        };

        // A nearer INN label claims the digits
        !window[cue..]
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "инн")
    }

    fn spans<'a>(
        regex: &'a Regex,
        text: &'a str,
        confidence: f32,
        keyword_required: bool,
    ) -> impl Iterator<Item = Span> + 'a {
        regex
            .find_iter(text)
            .filter(move |m| digit_bounded(text, m.start(), m.end()))
            .filter(move |m| !keyword_required || Self::keyword_before(text, m.start()))
            .filter_map(move |m| {
                Span::from_text(
                    text,
                    m.start(),
                    m.end(),
                    EntityType::Passport,
                    confidence,
                    SpanSource::Pattern,
                )
                .ok()
            })
    }
}

impl SpanRecognizer for PassportRecognizer {
    fn name(&self) -> &str {
        "passport"
    }

    fn entity_type(&self) -> EntityType {
        EntityType::Passport
    }

    fn recognize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Span> + 'a> {
        Box::new(
            Self::spans(&self.series_cue, text, 0.95, false)
                .chain(Self::spans(&self.spaced, text, 0.9, false))
                .chain(Self::spans(&self.compact, text, 0.9, true)),
        )
    }
}

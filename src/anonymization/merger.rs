//! Span merging and conflict resolution
//!
//! Candidates from every recognizer are reduced to one ordered,
//! non-overlapping list:
//!
//! 1. Malformed spans (bad range, text that does not match the input) are
//!    dropped with a warning.
//! 2. PERSON spans that cut through a word, or that consist only of stop
//!    words, are dropped as false positives.
//! 3. Candidates are ordered by start, longest first, and swept left to
//!    right. On overlap the winner is picked by [`prefer`].

use crate::anonymization::models::{EntityType, Span};
use crate::anonymization::stop_words::StopWords;
use std::cmp::Ordering;

/// Whether `candidate` should replace `incumbent` when the two overlap
///
/// Structured types outrank PERSON; otherwise the longer span wins, then
/// the more confident one. Remaining ties keep the incumbent.
pub fn prefer(candidate: &Span, incumbent: &Span) -> bool {
    let structured = |s: &Span| s.entity_type().is_structured();

    match (structured(candidate), structured(incumbent)) {
        (true, false) => return true,
        (false, true) => return false,
        _ => {}
    }

    match candidate.len().cmp(&incumbent.len()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.confidence() > incumbent.confidence(),
    }
}

/// Resolves overlapping candidate spans
pub struct SpanMerger<'a> {
    stop_words: &'a StopWords,
}

impl<'a> SpanMerger<'a> {
    pub fn new(stop_words: &'a StopWords) -> Self {
        Self { stop_words }
    }

    /// Produce the final, sorted, non-overlapping span list for `text`
    pub fn resolve(&self, text: &str, candidates: Vec<Span>) -> Vec<Span> {
        let total = candidates.len();
        let mut spans: Vec<Span> = candidates
            .into_iter()
            .filter(|span| self.well_formed(text, span))
            .filter(|span| !self.is_false_positive(text, span))
            .collect();

        spans.sort_by(|a, b| {
            a.start()
                .cmp(&b.start())
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a.entity_type().cmp(&b.entity_type()))
        });

        // Accepted spans never start after a later candidate, so a candidate
        // can only ever overlap the most recently accepted span.
        let mut resolved: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match resolved.last_mut() {
                Some(last) if last.overlaps(&span) => {
                    if prefer(&span, last) {
                        *last = span;
                    }
                }
                _ => resolved.push(span),
            }
        }

        tracing::debug!(
            candidates = total,
            resolved = resolved.len(),
            "Span merge complete"
        );

        resolved
    }

    fn well_formed(&self, text: &str, span: &Span) -> bool {
        let ok = span.start() < span.end()
            && text.get(span.start()..span.end()) == Some(span.text());
        if !ok {
            tracing::warn!(
                entity_type = %span.entity_type(),
                start = span.start(),
                end = span.end(),
                "Dropping span that does not match the input text"
            );
        }
        ok
    }

    fn is_false_positive(&self, text: &str, span: &Span) -> bool {
        if span.entity_type() != EntityType::Person {
            return false;
        }

        let before = text[..span.start()].chars().next_back();
        let after = text[span.end()..].chars().next();
        let cuts_word = before.is_some_and(char::is_alphanumeric)
            || after.is_some_and(char::is_alphanumeric);

        let only_stop_words = span
            .text()
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .filter(|w| !w.is_empty())
            .all(|w| self.stop_words.contains(w));

        if cuts_word || only_stop_words {
            tracing::debug!(
                start = span.start(),
                end = span.end(),
                cuts_word,
                only_stop_words,
                "Discarding PERSON candidate"
            );
            return true;
        }
        false
    }
}

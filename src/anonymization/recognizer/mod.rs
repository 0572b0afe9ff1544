//! Person name recognition
//!
//! The statistical recognizer is an injected capability behind the
//! [`NameRecognizer`] trait. [`NameDetector`] wraps it with the guarantees
//! the engine relies on:
//!
//! - **Bulkhead**: at most `max_concurrency` calls are in flight; further
//!   callers wait for a permit, and the wait counts against their deadline
//! - **Timeout**: every call is bounded and surfaces
//!   [`RuanonError::RecognizerTimeout`] when exceeded
//! - **Validation**: matches with malformed offsets are dropped with a warning
//! - **Stop words**: leading stop words are trimmed, the match is cut at the
//!   first interior stop word or line break, and matches made only of stop
//!   words disappear

pub mod gazetteer;
pub mod http;

use crate::anonymization::models::{EntityType, Span, SpanSource};
use crate::anonymization::stop_words::StopWords;
use crate::domain::{Result, RuanonError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub use gazetteer::GazetteerNameRecognizer;
pub use http::HttpNameRecognizer;

/// Score used when a recognizer does not report one
const DEFAULT_SCORE: f32 = 0.8;

/// A person-name match reported by a recognizer
///
/// Offsets are UTF-8 byte offsets into the text passed to
/// [`NameRecognizer::recognize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl NameMatch {
    /// Build a match by slicing `source` at `[start, end)`
    pub fn from_text(source: &str, start: usize, end: usize, score: Option<f32>) -> Self {
        Self {
            start,
            end,
            text: source.get(start..end).unwrap_or_default().to_string(),
            score,
        }
    }
}

/// Trait for statistical person-name recognizers
#[async_trait]
pub trait NameRecognizer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Find person names in `text`
    ///
    /// # Errors
    ///
    /// Implementations report their own failures as
    /// [`RuanonError::RecognizerFailure`].
    async fn recognize(&self, text: &str) -> Result<Vec<NameMatch>>;
}

/// Which name recognizer the engine builds from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    /// Built-in offline gazetteer of Russian given names
    #[default]
    Gazetteer,
    /// External NER service over HTTP
    Http,
    /// No name recognition; PERSON spans only come from custom patterns
    None,
}

impl std::str::FromStr for RecognizerKind {
    type Err = RuanonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gazetteer" => Ok(Self::Gazetteer),
            "http" => Ok(Self::Http),
            "none" => Ok(Self::None),
            other => Err(RuanonError::Configuration(format!(
                "Unknown recognizer kind '{other}'. Must be one of: gazetteer, http, none"
            ))),
        }
    }
}

/// Bounded, validated access to a [`NameRecognizer`]
pub struct NameDetector {
    recognizer: Arc<dyn NameRecognizer>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl NameDetector {
    /// Wrap a recognizer with a concurrency limit and a default timeout
    pub fn new(recognizer: Arc<dyn NameRecognizer>, max_concurrency: usize, timeout: Duration) -> Self {
        Self {
            recognizer,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
        }
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Number of calls that could start right now
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Detect PERSON spans in `text`
    ///
    /// # Errors
    ///
    /// Returns [`RuanonError::RecognizerTimeout`] when the call (including
    /// the wait for a bulkhead permit) exceeds the timeout, and
    /// [`RuanonError::RecognizerFailure`] for any recognizer error.
    pub async fn detect(
        &self,
        text: &str,
        stop_words: &StopWords,
        timeout: Option<Duration>,
    ) -> Result<Vec<Span>> {
        let timeout = timeout.unwrap_or(self.timeout);
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        let call = async {
            let _permit = self.semaphore.acquire().await.map_err(|_| {
                RuanonError::RecognizerFailure("Recognizer bulkhead is closed".to_string())
            })?;
            self.recognizer.recognize(text).await
        };

        let matches = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(err)) if err.is_recognizer_error() => return Err(err),
            Ok(Err(err)) => return Err(RuanonError::RecognizerFailure(err.to_string())),
            Err(_) => {
                tracing::warn!(
                    recognizer = %self.recognizer.name(),
                    timeout_ms,
                    "Name recognizer timed out"
                );
                return Err(RuanonError::RecognizerTimeout { timeout_ms });
            }
        };

        let reported = matches.len();
        let spans: Vec<Span> = matches
            .into_iter()
            .filter_map(|m| self.to_span(text, &m, stop_words))
            .collect();

        tracing::debug!(
            recognizer = %self.recognizer.name(),
            reported,
            kept = spans.len(),
            "Name recognition complete"
        );

        Ok(spans)
    }

    fn to_span(&self, text: &str, m: &NameMatch, stop_words: &StopWords) -> Option<Span> {
        if m.start >= m.end
            || m.end > text.len()
            || !text.is_char_boundary(m.start)
            || !text.is_char_boundary(m.end)
        {
            tracing::warn!(
                recognizer = %self.recognizer.name(),
                start = m.start,
                end = m.end,
                text_len = text.len(),
                "Dropping name match with malformed offsets"
            );
            return None;
        }

        let (start, end) = refine_name(text, m.start, m.end, stop_words)?;
        let score = m.score.unwrap_or(DEFAULT_SCORE);

        Span::from_text(text, start, end, EntityType::Person, score, SpanSource::Model).ok()
    }
}

/// A word inside a candidate name, as byte offsets into the full text
#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '\''
}

fn words_in(text: &str, start: usize, end: usize) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<usize> = None;

    for (offset, ch) in text[start..end].char_indices() {
        let pos = start + offset;
        match (is_word_char(ch), current) {
            (true, None) => current = Some(pos),
            (false, Some(word_start)) => {
                words.push(Word {
                    start: word_start,
                    end: pos,
                });
                current = None;
            }
            _ => {}
        }
    }
    if let Some(word_start) = current {
        words.push(Word {
            start: word_start,
            end,
        });
    }

    words
}

/// Narrow a name match to the words that can belong to a name
///
/// Returns `None` when nothing is left.
pub(crate) fn refine_name(
    text: &str,
    start: usize,
    end: usize,
    stop_words: &StopWords,
) -> Option<(usize, usize)> {
    let mut kept: Option<(usize, usize)> = None;

    for word in words_in(text, start, end) {
        let token = &text[word.start..word.end];
        let is_stop = stop_words.contains(token) || !token.chars().any(char::is_alphabetic);

        match kept {
            None if is_stop => continue,
            None => kept = Some((word.start, word.end)),
            Some((_, kept_end)) => {
                if is_stop || text[kept_end..word.start].contains('\n') {
                    break;
                }
                kept = kept.map(|(s, _)| (s, word.end));
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRecognizer {
        matches: Vec<NameMatch>,
    }

    #[async_trait]
    impl NameRecognizer for FixedRecognizer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn recognize(&self, _text: &str) -> Result<Vec<NameMatch>> {
            Ok(self.matches.clone())
        }
    }

    struct SlowRecognizer {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl NameRecognizer for SlowRecognizer {
        fn name(&self) -> &str {
            "slow"
        }

        async fn recognize(&self, _text: &str) -> Result<Vec<NameMatch>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn detector(matches: Vec<NameMatch>) -> NameDetector {
        NameDetector::new(
            Arc::new(FixedRecognizer { matches }),
            4,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_trailing_stop_word_truncated() {
        let text = "Имя Варвара\nВремя 17:00";
        let end = text.find(" 17").unwrap();
        let spans = detector(vec![NameMatch::from_text(text, 0, end, Some(0.9))])
            .detect(text, &StopWords::default(), None)
            .await
            .unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(), "Варвара");
        assert_eq!(spans[0].source(), SpanSource::Model);
    }

    #[tokio::test]
    async fn test_stop_word_only_match_dropped() {
        let text = "Спасибо, до встречи";
        let spans = detector(vec![NameMatch::from_text(text, 0, "Спасибо".len(), None)])
            .detect(text, &StopWords::default(), None)
            .await
            .unwrap();
        assert!(spans.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_offsets_dropped() {
        let text = "Иван";
        let spans = detector(vec![
            NameMatch {
                start: 1,
                end: 4,
                text: String::new(),
                score: None,
            },
            NameMatch {
                start: 0,
                end: 100,
                text: String::new(),
                score: None,
            },
        ])
        .detect(text, &StopWords::default(), None)
        .await
        .unwrap();
        assert!(spans.is_empty());
    }

    #[tokio::test]
    async fn test_per_request_stop_words() {
        let text = "Встреча Иван";
        let matches = vec![NameMatch::from_text(text, 0, text.len(), None)];
        let extended = StopWords::default().extended(["встреча"]);

        let spans = detector(matches)
            .detect(text, &extended, None)
            .await
            .unwrap();
        assert_eq!(spans[0].text(), "Иван");
    }

    #[tokio::test]
    async fn test_timeout_reported() {
        let recognizer = Arc::new(SlowRecognizer {
            delay: Duration::from_millis(200),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let detector = NameDetector::new(recognizer, 1, Duration::from_millis(20));

        let err = detector
            .detect("Иван", &StopWords::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 20 }));
    }

    #[tokio::test]
    async fn test_bulkhead_limits_concurrency() {
        let recognizer = Arc::new(SlowRecognizer {
            delay: Duration::from_millis(30),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let detector = Arc::new(NameDetector::new(
            recognizer.clone(),
            2,
            Duration::from_secs(5),
        ));

        let stop_words = StopWords::default();
        let calls = (0..6).map(|_| detector.detect("Иван", &stop_words, None));
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert!(recognizer.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(detector.available_permits(), 2);
    }

    #[test]
    fn test_refine_name_keeps_multiword_name() {
        let text = "Иван Петров";
        assert_eq!(
            refine_name(text, 0, text.len(), &StopWords::default()),
            Some((0, text.len()))
        );
    }

    #[test]
    fn test_recognizer_kind_parse() {
        assert_eq!("HTTP".parse::<RecognizerKind>().unwrap(), RecognizerKind::Http);
        assert!("spacy".parse::<RecognizerKind>().is_err());
    }
}

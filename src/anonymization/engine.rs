//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] that turns a Russian
//! text into its anonymized form plus the mapping needed to restore it.
//!
//! # Pipeline
//!
//! 1. **Name detection**: the injected [`NameRecognizer`] runs behind a
//!    bulkhead and a timeout, and its matches are trimmed by stop words
//! 2. **Pattern detection**: phone, INN, passport, address and custom
//!    recognizers yield candidate spans
//! 3. **Merge**: overlapping candidates are resolved into one ordered list
//! 4. **Mapping**: every span gets a placeholder, reused for equal values
//! 5. **Substitution**: the text is rewritten in a single pass
//!
//! # Examples
//!
//! ```no_run
//! use ruanon::anonymization::{AnonymizationEngine, AnonymizationConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let result = engine
//!     .anonymize("Меня зовут Иван Петров, мой телефон 89161234567")
//!     .await?;
//! assert_eq!(
//!     result.anonymized_text,
//!     "Меня зовут <PERSON_1>, мой телефон <PHONE_NUMBER_1>"
//! );
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    audit::AuditLogger,
    config::AnonymizationConfig,
    detector::{builtin_recognizers, PatternRegistry, SpanRecognizer},
    mapping::MappingStore,
    merger::SpanMerger,
    models::{AnonymizationResult, Detection, EntityType, Span},
    recognizer::{
        GazetteerNameRecognizer, HttpNameRecognizer, NameDetector, NameRecognizer,
        RecognizerKind,
    },
    stop_words::StopWords,
    substitution,
};
use crate::domain::{Result, RuanonError};
use crate::{log_anonymization_complete, log_recognizer_fallback};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-call options for [`AnonymizationEngine::anonymize_with`]
#[derive(Debug, Clone, Default)]
pub struct AnonymizeOptions {
    /// Stop words added to the engine's list for this call only
    pub stop_words: Vec<String>,
    /// Restrict detection to these types; types the engine was not built
    /// for are ignored
    pub entity_types: Option<Vec<EntityType>>,
    /// Override the recognizer timeout for this call
    pub timeout: Option<Duration>,
}

impl AnonymizeOptions {
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn with_entity_types(mut self, entity_types: impl Into<Vec<EntityType>>) -> Self {
        self.entity_types = Some(entity_types.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Main anonymization engine
///
/// # Thread Safety
///
/// The engine holds no per-call state: stop words are frozen at
/// construction and each call builds its own mapping. Share it across
/// tasks with `Arc`.
///
/// # Examples
///
/// ```
/// use ruanon::anonymization::{AnonymizationEngine, AnonymizationConfig};
/// use ruanon::anonymization::recognizer::RecognizerKind;
///
/// let mut config = AnonymizationConfig::default();
/// config.recognizer.kind = RecognizerKind::None;
/// config.engine.stop_words.push("встреча".to_string());
///
/// let engine = AnonymizationEngine::new(config)?;
/// assert!(engine.name_recognizer().is_none());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct AnonymizationEngine {
    config: AnonymizationConfig,
    recognizers: Vec<Arc<dyn SpanRecognizer>>,
    name_detector: Option<NameDetector>,
    stop_words: StopWords,
    audit_logger: Option<AuditLogger>,
}

impl AnonymizationEngine {
    /// Create a new anonymization engine
    ///
    /// The name recognizer is chosen by `recognizer.kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - Pattern library file cannot be loaded
    /// - The HTTP recognizer client cannot be built
    /// - Audit logger initialization fails
    pub fn new(config: AnonymizationConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .context("Invalid anonymization configuration")?;

        let name_recognizer: Option<Arc<dyn NameRecognizer>> = match config.recognizer.kind {
            RecognizerKind::Gazetteer => Some(Arc::new(GazetteerNameRecognizer::new())),
            RecognizerKind::Http => {
                let endpoint = config
                    .recognizer
                    .endpoint
                    .clone()
                    .context("recognizer.endpoint is required for the http recognizer")?;
                Some(Arc::new(HttpNameRecognizer::new(
                    endpoint,
                    config.recognizer.api_token.clone(),
                    config.recognizer.timeout(),
                )?))
            }
            RecognizerKind::None => None,
        };

        Self::assemble(config, name_recognizer)
    }

    /// Create an engine around a caller-supplied name recognizer
    ///
    /// `recognizer.kind` is ignored; every other setting applies.
    pub fn with_name_recognizer(
        config: AnonymizationConfig,
        recognizer: Arc<dyn NameRecognizer>,
    ) -> anyhow::Result<Self> {
        let mut config = config;
        // The injected recognizer replaces whatever kind was configured
        config.recognizer.kind = RecognizerKind::Gazetteer;
        config
            .validate()
            .context("Invalid anonymization configuration")?;

        Self::assemble(config, Some(recognizer))
    }

    fn assemble(
        config: AnonymizationConfig,
        name_recognizer: Option<Arc<dyn NameRecognizer>>,
    ) -> anyhow::Result<Self> {
        let entity_types = &config.engine.entity_types;

        let mut recognizers = builtin_recognizers(entity_types)?;
        if let Some(ref pattern_path) = config.engine.pattern_library {
            let registry = PatternRegistry::from_file(pattern_path)?;
            recognizers.extend(registry.recognizers(entity_types));
        }

        let name_detector = name_recognizer
            .filter(|_| entity_types.contains(&EntityType::Person))
            .map(|r| {
                NameDetector::new(
                    r,
                    config.recognizer.max_concurrency,
                    config.recognizer.timeout(),
                )
            });

        let stop_words = if config.engine.use_default_stop_words {
            StopWords::default().extended(&config.engine.stop_words)
        } else {
            StopWords::new(&config.engine.stop_words)
        };

        let audit_logger = if config.audit.enabled {
            Some(AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                true,
            )?)
        } else {
            None
        };

        tracing::debug!(
            recognizers = recognizers.len(),
            name_recognizer = ?name_detector.as_ref().map(|d| d.recognizer_name()),
            stop_words = stop_words.len(),
            audit = audit_logger.is_some(),
            "Anonymization engine ready"
        );

        Ok(Self {
            config,
            recognizers,
            name_detector,
            stop_words,
            audit_logger,
        })
    }

    /// Anonymize a text with default options
    ///
    /// # Errors
    ///
    /// - [`RuanonError::InvalidInput`] when the text exceeds
    ///   `engine.max_input_chars`
    /// - [`RuanonError::RecognizerTimeout`] / [`RuanonError::RecognizerFailure`]
    ///   when name recognition fails and fallback is disabled
    /// - [`RuanonError::Audit`] when the audit entry cannot be written
    pub async fn anonymize(&self, text: &str) -> Result<AnonymizationResult> {
        self.anonymize_with(text, &AnonymizeOptions::default()).await
    }

    /// Anonymize a text with per-call options
    ///
    /// See [`anonymize`](Self::anonymize) for errors.
    pub async fn anonymize_with(
        &self,
        text: &str,
        options: &AnonymizeOptions,
    ) -> Result<AnonymizationResult> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Ok(AnonymizationResult::unchanged(text, elapsed_ms(start)));
        }

        let chars = text.chars().count();
        if chars > self.config.engine.max_input_chars {
            return Err(RuanonError::InvalidInput(format!(
                "Text has {chars} characters, limit is {}",
                self.config.engine.max_input_chars
            )));
        }

        let extended;
        let stop_words = if options.stop_words.is_empty() {
            &self.stop_words
        } else {
            extended = self.stop_words.extended(&options.stop_words);
            &extended
        };

        let enabled: Vec<EntityType> = match options.entity_types {
            Some(ref requested) => self
                .config
                .engine
                .entity_types
                .iter()
                .copied()
                .filter(|t| requested.contains(t))
                .collect(),
            None => self.config.engine.entity_types.clone(),
        };

        let mut candidates = self.name_spans(text, stop_words, &enabled, options).await?;
        candidates.extend(
            self.recognizers
                .iter()
                .filter(|r| enabled.contains(&r.entity_type()))
                .flat_map(|r| r.recognize(text)),
        );

        let spans = SpanMerger::new(stop_words).resolve(text, candidates);

        let mut store = MappingStore::new(
            &self.config.engine.normalization,
            self.config.engine.placeholder_style,
        );
        let detections: Vec<Detection> = spans
            .into_iter()
            .map(|span| {
                let placeholder = store.assign(&span);
                Detection { span, placeholder }
            })
            .collect();

        let anonymized_text = substitution::substitute(text, &detections);
        let result = AnonymizationResult::new(
            anonymized_text,
            store.into_entries(),
            detections,
            elapsed_ms(start),
        );

        log_anonymization_complete!(
            result.request_id,
            result.detections.len(),
            result.mapping.len(),
            result.processing_time_ms
        );

        if let Some(ref logger) = self.audit_logger {
            logger
                .log_anonymization(&result)
                .map_err(|e| RuanonError::Audit(format!("{e:#}")))?;
        }

        Ok(result)
    }

    /// Anonymize several texts concurrently
    ///
    /// Returns one result per input, in input order. A failing item does
    /// not affect the others.
    pub async fn anonymize_batch(&self, texts: &[String]) -> Vec<Result<AnonymizationResult>> {
        let results =
            futures::future::join_all(texts.iter().map(|text| self.anonymize(text))).await;

        for (index, result) in results.iter().enumerate() {
            if let Err(e) = result {
                tracing::error!(index, error_kind = e.kind(), error = %e, "Failed to anonymize batch item");
            }
        }

        results
    }

    async fn name_spans(
        &self,
        text: &str,
        stop_words: &StopWords,
        enabled: &[EntityType],
        options: &AnonymizeOptions,
    ) -> Result<Vec<Span>> {
        let Some(ref detector) = self.name_detector else {
            return Ok(Vec::new());
        };
        if !enabled.contains(&EntityType::Person) {
            return Ok(Vec::new());
        }

        match detector.detect(text, stop_words, options.timeout).await {
            Ok(spans) => Ok(spans),
            Err(e) if e.is_recognizer_error() && self.config.recognizer.fallback_to_patterns => {
                log_recognizer_fallback!(detector.recognizer_name(), &e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }

    /// Stop words applied to every call
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Name of the active name recognizer, if any
    pub fn name_recognizer(&self) -> Option<&str> {
        self.name_detector.as_ref().map(|d| d.recognizer_name())
    }

    /// Check if audit logging is active
    pub fn is_audited(&self) -> bool {
        self.audit_logger.is_some()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

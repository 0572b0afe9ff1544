//! Anonymization module for Ruanon
//!
//! This module detects personal data in Russian free text and replaces it
//! with typed placeholders, returning the mapping needed to restore it.
//!
//! # Architecture
//!
//! The anonymization pipeline consists of:
//! - **Recognition**: an injected statistical recognizer for person names,
//!   filtered by a stop-word list
//! - **Detection**: pattern recognizers for phones, INN, passports and
//!   addresses, plus an optional custom pattern library
//! - **Merging**: overlap resolution into one non-overlapping span list
//! - **Mapping**: placeholder assignment with value normalization
//! - **Substitution**: single-pass rewrite of the text
//! - **Audit**: structured logging with hashed values
//!
//! # Usage
//!
//! ```rust,ignore
//! use ruanon::anonymization::{AnonymizationEngine, AnonymizationConfig};
//!
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let result = engine.anonymize("Звонила Анна, номер 8 900 123 45 67").await?;
//! ```

pub mod audit;
pub mod config;
pub mod detector;
pub mod engine;
pub mod mapping;
pub mod merger;
pub mod models;
pub mod recognizer;
pub mod stop_words;
pub mod substitution;

// Re-export main types
pub use config::{AnonymizationConfig, AuditConfig, EngineConfig, RecognizerConfig};
pub use engine::{AnonymizationEngine, AnonymizeOptions};
pub use models::{AnonymizationResult, Detection, EntityType, MappingEntry, Span, SpanSource};
pub use recognizer::{NameMatch, NameRecognizer};
pub use stop_words::StopWords;

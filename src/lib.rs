// Ruanon - Anonymization of personal data in Russian text
// Copyright (c) 2025 Ruanon Contributors
// Licensed under the MIT License

//! # Ruanon - anonymization of personal data in Russian text
//!
//! Ruanon finds personal data in free-form Russian text (chat messages,
//! call transcripts, order notes) and replaces it with typed placeholders,
//! returning the mapping needed to restore the original.
//!
//! ## Overview
//!
//! Recognized entity types:
//! - **PERSON**: names, found by an injected statistical recognizer and
//!   cleaned up with a stop-word list
//! - **PHONE_NUMBER**: Russian phone numbers in their common spellings
//! - **INN**: 10- and 12-digit taxpayer numbers
//! - **PASSPORT**: passport series and number
//! - **ADDRESS**: street addresses with house, apartment, entrance and
//!   metro qualifiers
//!
//! ## Architecture
//!
//! - [`anonymization`] - Recognizers, span merger, mapping, substitution, engine
//! - [`domain`] - Error type and result alias
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ruanon::anonymization::{AnonymizationEngine, AnonymizationConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//!     let result = engine
//!         .anonymize("Меня зовут Иван Петров, мой телефон 89161234567")
//!         .await?;
//!
//!     println!("{}", result.anonymized_text);
//!     // Меня зовут <PERSON_1>, мой телефон <PHONE_NUMBER_1>
//!
//!     assert_eq!(result.restore(), "Меня зовут Иван Петров, мой телефон 89161234567");
//!     Ok(())
//! }
//! ```
//!
//! ## Bringing your own recognizer
//!
//! Any NER model can be plugged in through
//! [`anonymization::NameRecognizer`]:
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use ruanon::anonymization::{AnonymizationConfig, AnonymizationEngine, NameMatch, NameRecognizer};
//! use std::sync::Arc;
//!
//! struct MyModel;
//!
//! #[async_trait]
//! impl NameRecognizer for MyModel {
//!     fn name(&self) -> &str {
//!         "my-model"
//!     }
//!
//!     async fn recognize(&self, text: &str) -> ruanon::domain::Result<Vec<NameMatch>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let engine = AnonymizationEngine::with_name_recognizer(
//!     AnonymizationConfig::default(),
//!     Arc::new(MyModel),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Engine calls return [`domain::RuanonError`]. Recognizer timeouts and
//! failures are distinct kinds so a caller can map them separately.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;

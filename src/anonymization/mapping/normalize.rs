//! Value normalization for placeholder reuse
//!
//! Two spans of the same type whose normalized forms are equal receive the
//! same placeholder. Normalization never changes the substituted text, only
//! the key under which a value is remembered.

use crate::anonymization::models::EntityType;
use serde::{Deserialize, Serialize};

/// How a raw value is reduced to its comparison key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Compare raw text byte for byte
    Exact,
    /// Case-fold, fold `ё` into `е`, drop punctuation, collapse whitespace
    Text,
    /// Keep only the digits
    DigitsOnly,
    /// Digits only, with the Russian trunk prefix `8` rewritten to `7`
    PhoneCanonical,
}

impl Normalization {
    /// Compute the comparison key for `raw`
    ///
    /// Falls back to the raw text when the reduced form would be empty, so
    /// unrelated punctuation-only values never collapse into one key.
    pub fn apply(&self, raw: &str) -> String {
        let key = match self {
            Self::Exact => raw.to_string(),
            Self::Text => normalize_text(raw),
            Self::DigitsOnly => digits(raw),
            Self::PhoneCanonical => canonical_phone(raw),
        };

        if key.is_empty() {
            raw.to_string()
        } else {
            key
        }
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in ch.to_lowercase() {
                out.push(if lower == 'ё' { 'е' } else { lower });
            }
        } else {
            pending_space = true;
        }
    }

    out
}

fn canonical_phone(raw: &str) -> String {
    let digits = digits(raw);
    match digits.len() {
        11 if digits.starts_with('8') || digits.starts_with('7') => format!("7{}", &digits[1..]),
        10 => format!("7{digits}"),
        _ => digits,
    }
}

fn default_text() -> Normalization {
    Normalization::Text
}

fn default_phone() -> Normalization {
    Normalization::PhoneCanonical
}

fn default_digits() -> Normalization {
    Normalization::DigitsOnly
}

/// Normalization to use for each entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationPolicy {
    #[serde(default = "default_text")]
    pub person: Normalization,

    #[serde(default = "default_phone")]
    pub phone_number: Normalization,

    #[serde(default = "default_text")]
    pub address: Normalization,

    #[serde(default = "default_digits")]
    pub inn: Normalization,

    #[serde(default = "default_digits")]
    pub passport: Normalization,
}

impl NormalizationPolicy {
    /// Policy that compares every value verbatim
    pub fn exact() -> Self {
        Self {
            person: Normalization::Exact,
            phone_number: Normalization::Exact,
            address: Normalization::Exact,
            inn: Normalization::Exact,
            passport: Normalization::Exact,
        }
    }

    pub fn for_type(&self, entity_type: EntityType) -> Normalization {
        match entity_type {
            EntityType::Person => self.person,
            EntityType::PhoneNumber => self.phone_number,
            EntityType::Address => self.address,
            EntityType::Inn => self.inn,
            EntityType::Passport => self.passport,
        }
    }

    /// Comparison key of `raw` under this policy
    pub fn key(&self, entity_type: EntityType, raw: &str) -> String {
        self.for_type(entity_type).apply(raw)
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            person: default_text(),
            phone_number: default_phone(),
            address: default_text(),
            inn: default_digits(),
            passport: default_digits(),
        }
    }
}

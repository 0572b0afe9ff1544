//! Secret handling for credentials held in configuration
//!
//! The recognizer API token is the only secret Ruanon keeps in memory. It is
//! wrapped in [`secrecy::Secret`] so that it is zeroed on drop, redacted in
//! `Debug` output, and never written back out when a configuration is
//! serialized.
//!
//! ```rust
//! use ruanon::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("hf_example".to_string());
//! assert_eq!(token.expose_secret().as_str(), "hf_example");
//! assert!(!format!("{token:?}").contains("hf_example"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// Token text that is wiped from memory on drop
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl SecretValue {
    /// Borrow the token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self)
    }
}

/// A zeroizing, redacted string secret
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wrap an optional string, treating blank values as absent
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("token-123".to_string());
        assert_eq!(secret.expose_secret().as_str(), "token-123");
    }

    #[test]
    fn test_secret_string_opt_blank_is_none() {
        assert!(secret_string_opt(Some("   ".to_string())).is_none());
        assert!(secret_string_opt(None).is_none());
        assert!(secret_string_opt(Some("t".to_string())).is_some());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-token".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-token"));
    }

    #[test]
    fn test_secret_deserialize() {
        #[derive(serde::Deserialize)]
        struct Section {
            api_token: SecretString,
        }

        let section: Section = toml::from_str(r#"api_token = "abc""#).unwrap();
        assert_eq!(section.api_token.expose_secret().as_str(), "abc");
    }
}

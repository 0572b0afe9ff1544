//! Stop-word list for name filtering
//!
//! Statistical recognizers often tag capitalized common words that sit next
//! to a real name ("Время", "Спасибо"). Those words are never part of a
//! PERSON span. The list is immutable once built and is shared across
//! concurrent calls behind an `Arc`; per-request words produce a new list.

use std::collections::HashSet;

/// Words that are never treated as names
const DEFAULT_STOP_WORDS: &[&str] = &[
    "время",
    "место",
    "номер",
    "телефон",
    "адрес",
    "дата",
    "день",
    "месяц",
    "год",
    "лет",
    "часов",
    "минут",
    "квартира",
    "подъезд",
    "парадная",
    "этаж",
    "дом",
    "улица",
    "метро",
    "сообщу",
    "имя",
    "меня",
    "зовут",
    "здравствуйте",
    "добрый",
    "привет",
    "спасибо",
    "пожалуйста",
    "хорошо",
    "ок",
    "да",
    "нет",
];

/// Case-insensitive set of stop words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Build a list from arbitrary words
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| fold(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// An empty list
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Return a copy of this list with `extra` words added
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = self.words.clone();
        words.extend(
            extra
                .into_iter()
                .map(|w| fold(w.as_ref()))
                .filter(|w| !w.is_empty()),
        );
        Self { words }
    }

    /// Whether `word` is a stop word, ignoring case and surrounding punctuation
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&fold(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

fn fold(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
        .replace('ё', "е")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list_is_case_insensitive() {
        let stop_words = StopWords::default();
        assert!(stop_words.contains("Время"));
        assert!(stop_words.contains("СПАСИБО"));
        assert!(stop_words.contains("время:"));
        assert!(!stop_words.contains("Варвара"));
    }

    #[test]
    fn test_extended_does_not_mutate_original() {
        let base = StopWords::default();
        let extended = base.extended(["Встреча"]);

        assert!(extended.contains("встреча"));
        assert!(!base.contains("встреча"));
        assert_eq!(extended.len(), base.len() + 1);
    }

    #[test]
    fn test_yo_folding() {
        let stop_words = StopWords::new(["ещё"]);
        assert!(stop_words.contains("Еще"));
    }

    #[test]
    fn test_blank_words_ignored() {
        let stop_words = StopWords::new(["", "  ", "!"]);
        assert!(stop_words.is_empty());
    }
}

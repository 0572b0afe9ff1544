//! Offline gazetteer name recognizer
//!
//! Finds capitalized words that are common Russian given names (including
//! the usual oblique forms, "Анны" for "Анна") and grows the match over an
//! adjacent surname or patronymic on the same line.

use super::{NameMatch, NameRecognizer};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::HashSet;

const SCORE: f32 = 0.8;

const GIVEN_NAMES: &[&str] = &[
    "александр", "александра", "алексей", "алина", "алиса", "анастасия", "андрей", "анна",
    "антон", "арина", "артем", "артём", "борис", "вадим", "валентина", "валерий", "валерия",
    "варвара", "василий", "василиса", "вероника", "виктор", "виктория", "владимир",
    "владислав", "галина", "георгий", "глеб", "григорий", "даниил", "дарья", "денис",
    "диана", "дмитрий", "ева", "евгений", "евгения", "егор", "екатерина", "елена",
    "елизавета", "захар", "злата", "иван", "игорь", "илья", "ирина", "кирилл",
    "константин", "кристина", "ксения", "лариса", "леонид", "людмила", "максим",
    "маргарита", "марина", "мария", "матвей", "милана", "мирон", "михаил", "наталия",
    "наталья", "никита", "николай", "нина", "оксана", "олег", "ольга", "павел", "петр",
    "пётр", "полина", "савелий", "светлана", "семен", "семён", "сергей", "софия", "софья",
    "станислав", "степан", "таисия", "тамара", "татьяна", "тимофей", "ульяна", "федор",
    "фёдор", "юлия", "юрий", "яна", "ярослав",
];

const SURNAME_SUFFIXES: &[&str] = &[
    "ов", "ова", "ев", "ева", "ёв", "ёва", "ин", "ина", "ын", "ына", "ский", "ская",
    "цкий", "цкая", "енко", "ук", "юк", "их", "ых",
];

const PATRONYMIC_SUFFIXES: &[&str] = &["вич", "вна", "ична", "ьич"];

/// A capitalized word with byte offsets
#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
}

/// Built-in recognizer over a closed list of given names
pub struct GazetteerNameRecognizer {
    given_names: HashSet<String>,
}

impl GazetteerNameRecognizer {
    pub fn new() -> Self {
        Self::with_names(GIVEN_NAMES.iter().copied())
    }

    /// Use a custom list of given names (matched case-insensitively)
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            given_names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    fn is_given_name(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if self.given_names.contains(&lower) {
            return true;
        }

        // Oblique forms: Анны/Анне/Анну -> Анна, Ивана/Ивану -> Иван,
        // Сергея -> Сергей, Ильи -> Илья, Ольгой -> Ольга
        let chars: Vec<char> = lower.chars().collect();
        if chars.len() < 3 {
            return false;
        }
        let stem1: String = chars[..chars.len() - 1].iter().collect();
        let stem2: String = chars[..chars.len() - 2].iter().collect();

        [
            stem1.clone(),
            format!("{stem1}а"),
            format!("{stem1}я"),
            format!("{stem1}й"),
            format!("{stem2}а"),
            format!("{stem2}я"),
        ]
        .iter()
        .any(|candidate| self.given_names.contains(candidate))
    }

    fn capitalized_tokens(text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current: Option<usize> = None;

        for (pos, ch) in text.char_indices() {
            let in_word = ch.is_alphabetic() || ch == '-';
            match (in_word, current) {
                (true, None) => current = Some(pos),
                (false, Some(start)) => {
                    tokens.push(Token { start, end: pos });
                    current = None;
                }
                _ => {}
            }
        }
        if let Some(start) = current {
            tokens.push(Token {
                start,
                end: text.len(),
            });
        }

        tokens
            .into_iter()
            .filter(|t| text[t.start..t.end].starts_with(|c: char| c.is_uppercase()))
            .collect()
    }

    /// Whether only spaces or tabs separate the two tokens
    fn adjacent(text: &str, left: Token, right: Token) -> bool {
        let gap = &text[left.end..right.start];
        !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t')
    }

    fn has_suffix(word: &str, suffixes: &[&str]) -> bool {
        let lower = word.to_lowercase();
        lower.chars().count() >= 4 && suffixes.iter().any(|s| lower.ends_with(s))
    }

    fn is_surname(word: &str) -> bool {
        Self::has_suffix(word, SURNAME_SUFFIXES)
    }

    fn is_patronymic(word: &str) -> bool {
        Self::has_suffix(word, PATRONYMIC_SUFFIXES)
    }

    fn scan(&self, text: &str) -> Vec<NameMatch> {
        let tokens = Self::capitalized_tokens(text);
        let mut matches = Vec::new();
        let mut i = 0;
        // Tokens before this index already belong to an emitted match
        let mut consumed = 0;

        while i < tokens.len() {
            let token = tokens[i];
            if !self.is_given_name(&text[token.start..token.end]) {
                i += 1;
                continue;
            }

            let mut start = token.start;
            if i > consumed {
                let prev = tokens[i - 1];
                if Self::adjacent(text, prev, token) && Self::is_surname(&text[prev.start..prev.end])
                {
                    start = prev.start;
                }
            }

            let mut end = token.end;
            let mut j = i + 1;
            while j < tokens.len() && j <= i + 2 {
                let next = tokens[j];
                let word = &text[next.start..next.end];
                if !Self::adjacent(text, tokens[j - 1], next)
                    || self.is_given_name(word)
                    || !(Self::is_surname(word) || Self::is_patronymic(word))
                {
                    break;
                }
                end = next.end;
                j += 1;
            }

            matches.push(NameMatch::from_text(text, start, end, Some(SCORE)));
            consumed = j;
            i = j;
        }

        matches
    }
}

impl Default for GazetteerNameRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameRecognizer for GazetteerNameRecognizer {
    fn name(&self) -> &str {
        "gazetteer"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<NameMatch>> {
        Ok(self.scan(text))
    }
}

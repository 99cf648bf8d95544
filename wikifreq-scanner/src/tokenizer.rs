use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Word -> occurrence count.
pub type WordCount = HashMap<String, u64>;

/// Word counts of a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounts {
    /// Counts of every word not on the ignore list.
    pub words: WordCount,
    /// Number of word tokens in the document, ignored words included.
    pub total_words: u64,
}

/// Splits raw document text into a bag of words.
pub trait Tokenizer: Send + Sync {
    fn count(&self, text: &str, ignore: &HashSet<String>) -> DocumentCounts;
}

/// Default tokenizer: lower-cased alphanumeric runs, with inner apostrophes and
/// hyphens kept (`don't`, `well-known`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }

    pub fn split_words(text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_alphanumeric() {
                current.extend(c.to_lowercase());
            } else if is_joiner(c)
                && !current.is_empty()
                && chars.peek().is_some_and(|next| next.is_alphanumeric())
            {
                current.push(if c == '-' { '-' } else { '\'' });
            } else if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            words.push(current);
        }

        words
    }
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

impl Tokenizer for WordTokenizer {
    fn count(&self, text: &str, ignore: &HashSet<String>) -> DocumentCounts {
        let mut counts = DocumentCounts::default();

        for word in Self::split_words(text) {
            counts.total_words += 1;
            if ignore.contains(&word) {
                continue;
            }
            *counts.words.entry(word).or_insert(0) += 1;
        }

        counts
    }
}

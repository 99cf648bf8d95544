use crate::aggregate::AggregateState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Absolute and relative frequency of one word.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub count: u64,
    /// Share of all words in the corpus, in percent.
    pub percentage: f64,
}

/// Final word -> (count, percentage) mapping of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    entries: BTreeMap<String, FrequencyEntry>,
}

impl FrequencyTable {
    /// Converts raw counts to percentages of `state.total_words` and keeps only the
    /// words whose percentage is strictly greater than `threshold`.
    ///
    /// This is a flat frequency cutoff, not a percentile rank. An empty corpus yields
    /// an empty table.
    pub fn normalize(state: &AggregateState, threshold: f64) -> Self {
        if state.total_words == 0 {
            return Self::default();
        }

        let total = state.total_words as f64;
        let entries = state
            .words
            .iter()
            .filter_map(|(word, &count)| {
                let percentage = count as f64 * 100.0 / total;
                (percentage > threshold).then(|| (word.clone(), FrequencyEntry { count, percentage }))
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, word: &str) -> Option<&FrequencyEntry> {
        self.entries.get(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in word order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FrequencyEntry> {
        self.entries.iter()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries by descending count, ties broken alphabetically.
    pub fn ranked(&self) -> Vec<(&str, FrequencyEntry)> {
        let mut ranked: Vec<(&str, FrequencyEntry)> = self
            .entries
            .iter()
            .map(|(word, entry)| (word.as_str(), *entry))
            .collect();
        ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = (&'a String, &'a FrequencyEntry);
    type IntoIter = btree_map::Iter<'a, String, FrequencyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

use wikifreq_scanner::{DocumentCounts, WordCount};

/// Running word tally of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateState {
    pub words: WordCount,
    /// Sum of every document's full word count, ignored words included.
    pub total_words: u64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one document's counts into the tally.
    pub fn merge(&mut self, doc_counts: &WordCount, doc_word_total: u64) {
        for (word, count) in doc_counts {
            *self.words.entry(word.clone()).or_insert(0) += count;
        }
        self.total_words += doc_word_total;
    }

    pub fn merge_document(&mut self, counts: DocumentCounts) {
        for (word, count) in counts.words {
            *self.words.entry(word).or_insert(0) += count;
        }
        self.total_words += counts.total_words;
    }

    /// Folds another partial tally into this one.
    pub fn absorb(&mut self, other: AggregateState) {
        if self.words.is_empty() {
            self.words = other.words;
        } else {
            for (word, count) in other.words {
                *self.words.entry(word).or_insert(0) += count;
            }
        }
        self.total_words += other.total_words;
    }

    pub fn count(&self, word: &str) -> u64 {
        self.words.get(word).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total_words == 0
    }
}

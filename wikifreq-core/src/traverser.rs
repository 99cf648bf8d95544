//! Breadth-first expansion over the article link graph.
//!
//! The seed is fetched alone (round 0). Every later round fetches the whole frontier
//! concurrently, with at most `workers` requests in flight. Each fetch produces its own
//! partial tally; the partials are reduced once the round is complete, so the result
//! does not depend on the order in which fetches finish.

use crate::aggregate::AggregateState;
use crate::error::{AnalyzeError, Result};
use crate::frequency::FrequencyTable;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wikifreq_scanner::{
    Document, DocumentCounts, DocumentSource, ScanError, Tokenizer, WordTokenizer,
};

/// Called with `(round, title)` before every fetch attempt.
pub type ProgressCallback = Arc<dyn Fn(usize, &str) + Send + Sync>;

pub const DEFAULT_WORKERS: usize = 8;

/// Parameters of one `analyze` call, as received from a delivery layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub title: String,
    pub depth: i64,
    pub ignore: Vec<String>,
    /// Minimum percentage a word must exceed to be reported.
    pub threshold: f64,
}

impl AnalyzeRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            depth: 0,
            ignore: Vec::new(),
            threshold: 0.0,
        }
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_ignore<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Rejects empty titles, negative depths and thresholds outside [0, 100].
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AnalyzeError::InvalidParameter(
                "article title must not be empty".to_string(),
            ));
        }
        if self.depth < 0 {
            return Err(AnalyzeError::InvalidParameter(format!(
                "depth must be >= 0, got {}",
                self.depth
            )));
        }
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(AnalyzeError::InvalidParameter(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    /// Documents fetched and counted, seed included.
    pub documents_fetched: usize,
    /// Linked titles that were attempted but could not be fetched.
    pub titles_skipped: usize,
    /// Rounds run, seed round included. Always `depth + 1` on success.
    pub rounds: usize,
    /// Size of the visited set: every distinct title attempted.
    pub visited: usize,
    pub total_words: u64,
}

/// Raw outcome of a traversal, before normalization.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub aggregate: AggregateState,
    pub visited: HashSet<String>,
    pub stats: TraversalStats,
}

/// Result of `analyze`: the filtered table plus how it was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub table: FrequencyTable,
    pub stats: TraversalStats,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// What happened to one linked title in a round.
enum LinkOutcome {
    Counted {
        counts: DocumentCounts,
        links: BTreeSet<String>,
    },
    Skipped,
}

#[derive(Default)]
struct RoundOutcome {
    aggregate: AggregateState,
    links: BTreeSet<String>,
    fetched: usize,
    skipped: usize,
}

pub struct Traverser<S, T = WordTokenizer> {
    source: S,
    tokenizer: T,
    workers: usize,
    fetch_timeout: Option<Duration>,
    progress_callback: Option<ProgressCallback>,
}

impl<S: DocumentSource> Traverser<S, WordTokenizer> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tokenizer: WordTokenizer::new(),
            workers: DEFAULT_WORKERS,
            fetch_timeout: None,
            progress_callback: None,
        }
    }
}

impl<S: DocumentSource, T: Tokenizer> Traverser<S, T> {
    pub fn with_tokenizer<U: Tokenizer>(self, tokenizer: U) -> Traverser<S, U> {
        Traverser {
            source: self.source,
            tokenizer,
            workers: self.workers,
            fetch_timeout: self.fetch_timeout,
            progress_callback: self.progress_callback,
        }
    }

    /// Maximum number of fetches in flight per round. Clamped to at least 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis> {
        self.analyze_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Validates the request, traverses the link graph and normalizes the tally.
    ///
    /// Cancelling `cancel` aborts the in-flight round and yields
    /// [`AnalyzeError::Cancelled`]; no partial table is returned.
    pub async fn analyze_with_cancel(
        &self,
        request: &AnalyzeRequest,
        cancel: &CancellationToken,
    ) -> Result<Analysis> {
        request.validate()?;

        let start = Instant::now();
        let ignore: HashSet<String> = request.ignore.iter().cloned().collect();
        let depth = usize::try_from(request.depth).map_err(|_| {
            AnalyzeError::InvalidParameter(format!("depth out of range: {}", request.depth))
        })?;

        let traversal = self.traverse(&request.title, depth, &ignore, cancel).await?;
        let table = FrequencyTable::normalize(&traversal.aggregate, request.threshold);

        info!(
            "Analysis of {} complete: {} of {} words above {}%",
            request.title,
            table.len(),
            traversal.aggregate.words.len(),
            request.threshold
        );

        Ok(Analysis {
            table,
            stats: traversal.stats,
            elapsed: start.elapsed(),
        })
    }

    /// Runs the seed round plus `max_depth` expansion rounds and returns the raw tally.
    pub async fn traverse(
        &self,
        seed: &str,
        max_depth: usize,
        ignore: &HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<Traversal> {
        info!(
            "Starting traversal of {} to depth {} with {} workers",
            seed, max_depth, self.workers
        );

        let mut visited: HashSet<String> = HashSet::from([seed.to_string()]);
        let mut stats = TraversalStats::default();
        let mut aggregate = AggregateState::new();

        self.report_progress(0, seed);
        let document = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalyzeError::Cancelled),
            result = self.fetch(seed) => result.map_err(|e| AnalyzeError::from_seed(seed, e))?,
        };

        aggregate.merge_document(self.tokenizer.count(&document.text, ignore));
        stats.documents_fetched += 1;
        stats.rounds += 1;

        let mut frontier: BTreeSet<String> = document
            .links
            .into_iter()
            .filter(|title| !visited.contains(title))
            .collect();

        for round in 1..=max_depth {
            // Nothing left to expand; the remaining rounds would fetch nothing.
            if frontier.is_empty() {
                debug!("Frontier exhausted before round {}", round);
                stats.rounds = max_depth.saturating_add(1);
                break;
            }

            // Everything attempted this round is visited, whatever the outcome.
            let batch: Vec<String> = frontier
                .into_iter()
                .filter(|title| visited.insert(title.clone()))
                .collect();

            debug!("Round {}: {} titles to fetch", round, batch.len());

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Traversal of {} cancelled in round {}", seed, round);
                    return Err(AnalyzeError::Cancelled);
                }
                outcome = self.fetch_round(round, &batch, ignore) => outcome,
            };

            stats.documents_fetched += outcome.fetched;
            stats.titles_skipped += outcome.skipped;
            stats.rounds += 1;
            aggregate.absorb(outcome.aggregate);

            frontier = outcome
                .links
                .into_iter()
                .filter(|title| !visited.contains(title))
                .collect();

            info!(
                "Round {} done: {} fetched, {} skipped, {} new titles",
                round,
                outcome.fetched,
                outcome.skipped,
                frontier.len()
            );
        }

        stats.visited = visited.len();
        stats.total_words = aggregate.total_words;

        info!(
            "Traversal complete. Visited {} titles, counted {} words",
            stats.visited, stats.total_words
        );

        Ok(Traversal {
            aggregate,
            visited,
            stats,
        })
    }

    async fn fetch_round(
        &self,
        round: usize,
        batch: &[String],
        ignore: &HashSet<String>,
    ) -> RoundOutcome {
        let outcomes: Vec<LinkOutcome> = stream::iter(batch)
            .map(|title| self.fetch_link(round, title, ignore))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut round_outcome = RoundOutcome::default();
        for outcome in outcomes {
            match outcome {
                LinkOutcome::Counted { counts, links } => {
                    round_outcome.aggregate.merge_document(counts);
                    round_outcome.links.extend(links);
                    round_outcome.fetched += 1;
                }
                LinkOutcome::Skipped => round_outcome.skipped += 1,
            }
        }
        round_outcome
    }

    async fn fetch_link(&self, round: usize, title: &str, ignore: &HashSet<String>) -> LinkOutcome {
        self.report_progress(round, title);

        match self.fetch(title).await {
            Ok(document) => LinkOutcome::Counted {
                counts: self.tokenizer.count(&document.text, ignore),
                links: document.links,
            },
            Err(e) if e.is_not_found() => {
                warn!("Linked article {} does not exist, skipping", title);
                LinkOutcome::Skipped
            }
            Err(e) => {
                warn!("Failed to fetch linked article {}: {}", title, e);
                LinkOutcome::Skipped
            }
        }
    }

    async fn fetch(&self, title: &str) -> std::result::Result<Document, ScanError> {
        debug!("Fetching {}", title);

        match self.fetch_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.source.fetch(title))
                .await
                .map_err(|_| ScanError::Timeout(title.to_string()))?,
            None => self.source.fetch(title).await,
        }
    }

    fn report_progress(&self, round: usize, title: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(round, title);
        }
    }
}

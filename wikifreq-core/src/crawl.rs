use crate::error::{AnalyzeError, Result};
use crate::traverser::{Analysis, AnalyzeRequest, DEFAULT_WORKERS, ProgressCallback, Traverser};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use wikifreq_scanner::DocumentSource;

/// Options for running one analysis from a delivery layer
pub struct AnalyzeOptions {
    pub request: AnalyzeRequest,
    pub workers: usize,
    /// Per-document fetch timeout, on top of the source's own request timeout
    pub fetch_timeout: Option<Duration>,
    /// Overall time budget; the analysis is cancelled once it runs out
    pub deadline: Option<Duration>,
    pub show_progress_bars: bool,
}

impl AnalyzeOptions {
    pub fn new(request: AnalyzeRequest) -> Self {
        Self {
            request,
            workers: DEFAULT_WORKERS,
            fetch_timeout: None,
            deadline: None,
            show_progress_bars: false,
        }
    }
}

/// Execute an analysis against `source` with the given options
pub async fn execute_analysis<S: DocumentSource>(
    source: S,
    options: AnalyzeOptions,
    cancel: CancellationToken,
) -> Result<Analysis> {
    let AnalyzeOptions {
        request,
        workers,
        fetch_timeout,
        deadline,
        show_progress_bars,
    } = options;

    // Spinner for overall progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching {}...", request.title));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let mut traverser = Traverser::new(source).with_workers(workers);
    if let Some(timeout) = fetch_timeout {
        traverser = traverser.with_fetch_timeout(timeout);
    }
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let count_clone = processed_count.clone();
        let callback: ProgressCallback = Arc::new(move |round: usize, title: &str| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!(
                "Depth {} | {} articles requested | {}",
                round, count, title
            ));
        });
        traverser = traverser.with_progress_callback(callback);
    }

    let result = match deadline {
        Some(limit) => {
            match tokio::time::timeout(limit, traverser.analyze_with_cancel(&request, &cancel))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    warn!("Analysis of {} exceeded its {:?} deadline", request.title, limit);
                    cancel.cancel();
                    Err(AnalyzeError::Cancelled)
                }
            }
        }
        None => traverser.analyze_with_cancel(&request, &cancel).await,
    };

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        match &result {
            Ok(_) => pb.finish_with_message(format!("Analysis complete! {} articles requested", total)),
            Err(e) => pb.abandon_with_message(format!("Analysis failed: {}", e)),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wikifreq_scanner::{Document, ScanError, StaticSource};

    /// Answers the seed immediately and never answers anything else.
    struct StallingSource;

    #[async_trait]
    impl DocumentSource for StallingSource {
        async fn fetch(&self, title: &str) -> std::result::Result<Document, ScanError> {
            if title == "Seed" {
                return Ok(Document::new("Seed", "one two").with_links(["Slow"]));
            }
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_execute_analysis_without_progress() {
        let source = StaticSource::new().with_document(Document::new("Solo", "cat dog cat bird"));
        let analysis = execute_analysis(
            source,
            AnalyzeOptions::new(AnalyzeRequest::new("Solo")),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(analysis.table.len(), 3);
        assert_eq!(analysis.stats.total_words, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_stalled_round() {
        let mut options = AnalyzeOptions::new(AnalyzeRequest::new("Seed").with_depth(1));
        options.deadline = Some(Duration::from_secs(5));

        let cancel = CancellationToken::new();
        let result = execute_analysis(StallingSource, options, cancel.clone()).await;

        assert!(matches!(result, Err(AnalyzeError::Cancelled)));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_skips_stalled_link() {
        let mut options = AnalyzeOptions::new(AnalyzeRequest::new("Seed").with_depth(1));
        options.fetch_timeout = Some(Duration::from_secs(1));

        let analysis = execute_analysis(StallingSource, options, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(analysis.stats.titles_skipped, 1);
        assert_eq!(analysis.stats.documents_fetched, 1);
        assert_eq!(analysis.table.len(), 2);
    }

    #[tokio::test]
    async fn test_external_cancellation() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = execute_analysis(
            StallingSource,
            AnalyzeOptions::new(AnalyzeRequest::new("Seed").with_depth(3)),
            cancel,
        )
        .await;

        assert!(matches!(result, Err(AnalyzeError::Cancelled)));
    }
}

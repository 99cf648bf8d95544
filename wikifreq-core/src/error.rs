use thiserror::Error;
use wikifreq_scanner::ScanError;

/// Failures surfaced by an analysis. A missing *linked* article is never one of these;
/// the traverser skips it.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Could not get page titled {0}. Maybe the article you are looking for does not exist.")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Failed to fetch {title}: {source}")]
    Source {
        title: String,
        #[source]
        source: ScanError,
    },
}

impl AnalyzeError {
    /// Error for a failed seed fetch.
    pub fn from_seed(title: &str, error: ScanError) -> Self {
        if error.is_not_found() {
            return AnalyzeError::NotFound(title.to_string());
        }
        AnalyzeError::Source {
            title: title.to_string(),
            source: error,
        }
    }
}

/// Failures while rendering a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;

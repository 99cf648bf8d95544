use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} while fetching {title}")]
    Status { title: String, status: u16 },

    #[error("Timed out fetching {0}")]
    Timeout(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScanError {
    /// True when the source resolved the request but the title does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

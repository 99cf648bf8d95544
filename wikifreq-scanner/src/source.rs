use crate::document::{Document, is_discussion_title};
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Anything that can resolve an article title to its text and outbound links.
///
/// Implementations return [`ScanError::NotFound`] when the title does not resolve to a
/// real document. Every other error is a failure of the source itself.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, title: &str) -> Result<Document>;
}

/// In-memory link graph. Useful for offline runs and tests.
#[derive(Debug, Default)]
pub struct StaticSource {
    documents: HashMap<String, Document>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.insert(document);
        self
    }

    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.title.clone(), document);
    }

    /// How many times `title` has been requested, including misses.
    pub fn fetch_count(&self, title: &str) -> usize {
        self.fetches
            .lock()
            .map(|fetches| fetches.get(title).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .map(|fetches| fetches.values().sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, title: &str) -> Result<Document> {
        if let Ok(mut fetches) = self.fetches.lock() {
            *fetches.entry(title.to_string()).or_insert(0) += 1;
        }

        let mut document = self
            .documents
            .get(title)
            .cloned()
            .ok_or_else(|| ScanError::NotFound(title.to_string()))?;
        document.links.retain(|link| !is_discussion_title(link));
        Ok(document)
    }
}

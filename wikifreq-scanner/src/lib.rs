pub mod document;
pub mod error;
pub mod source;
pub mod tokenizer;
pub mod wiki;

pub use document::Document;
pub use error::ScanError;
pub use source::{DocumentSource, StaticSource};
pub use tokenizer::{DocumentCounts, Tokenizer, WordCount, WordTokenizer};
pub use wiki::{SourceConfig, WikiClient};

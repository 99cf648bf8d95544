pub mod aggregate;
pub mod crawl;
pub mod error;
pub mod frequency;
pub mod report;
pub mod traverser;

pub use aggregate::AggregateState;
pub use error::{AnalyzeError, ReportError};
pub use frequency::{FrequencyEntry, FrequencyTable};
pub use traverser::{Analysis, AnalyzeRequest, Traversal, TraversalStats, Traverser};

pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    collect_ignore_words, exit_code, expand_path, load_ignore_file, parse_ignore_line,
    source_config, write_report,
};

// Re-export analysis entry points from wikifreq-core
pub use wikifreq_core::crawl::{AnalyzeOptions, execute_analysis};
pub use wikifreq_core::report::{ReportData, ReportFormat, generate_report};

use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wikifreq_core::AnalyzeError;
use wikifreq_core::report::save_report;
use wikifreq_scanner::SourceConfig;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_PARAMETER: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_CANCELLED: i32 = 4;

/// Install the global tracing subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Process exit code for an analysis failure
pub fn exit_code(error: &AnalyzeError) -> i32 {
    match error {
        AnalyzeError::InvalidParameter(_) => EXIT_INVALID_PARAMETER,
        AnalyzeError::NotFound(_) => EXIT_NOT_FOUND,
        AnalyzeError::Cancelled => EXIT_CANCELLED,
        AnalyzeError::Source { .. } => EXIT_FAILURE,
    }
}

/// Parse one line of an ignore file. Blank lines and `#` comments yield nothing.
pub fn parse_ignore_line(line: &str) -> Option<String> {
    let word = line.trim();
    if word.is_empty() || word.starts_with('#') {
        return None;
    }
    Some(word.to_string())
}

/// Load a newline-delimited list of words to ignore
pub fn load_ignore_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ignore file {}", path.display()))?;

    Ok(content.lines().filter_map(parse_ignore_line).collect())
}

/// Union of `--ignore` values and the optional ignore file, sorted and deduplicated
pub fn collect_ignore_words(words: &[String], ignore_file: Option<&PathBuf>) -> Result<Vec<String>> {
    let mut ignore: BTreeSet<String> = words
        .iter()
        .filter_map(|word| parse_ignore_line(word))
        .collect();

    if let Some(path) = ignore_file {
        let expanded = expand_path(&path.to_string_lossy());
        ignore.extend(load_ignore_file(&expanded)?);
    }

    debug!("Ignoring {} words", ignore.len());
    Ok(ignore.into_iter().collect())
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Build the document source settings from CLI options. An explicit endpoint beats
/// a language code.
pub fn source_config(language: Option<&str>, endpoint: Option<&str>, timeout_secs: u64) -> Result<SourceConfig> {
    if timeout_secs == 0 {
        bail!("--timeout must be at least 1 second");
    }

    let config = match (endpoint, language) {
        (Some(endpoint), _) => SourceConfig::default().with_endpoint(endpoint),
        (None, Some(language)) => {
            if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                bail!("Invalid language code: {:?}", language);
            }
            SourceConfig::for_language(language)
        }
        (None, None) => SourceConfig::default(),
    };

    Ok(config.with_timeout(timeout_secs))
}

/// Write the rendered report to `output`, or stdout when no path is given.
/// Returns the path written to, if any.
pub fn write_report(report: &str, output: Option<&str>) -> Result<Option<PathBuf>> {
    match output {
        Some(path) => {
            let path = expand_path(path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            save_report(report, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Ok(Some(path))
        }
        None => {
            print!("{}", report);
            Ok(None)
        }
    }
}

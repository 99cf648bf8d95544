use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};
use wikifreq::handlers::*;
use wikifreq_core::AnalyzeError;
use wikifreq_scanner::ScanError;

#[test]
fn test_parse_ignore_line() {
    assert_eq!(parse_ignore_line("  the  "), Some("the".to_string()));
    assert_eq!(parse_ignore_line(""), None);
    assert_eq!(parse_ignore_line("   "), None);
    assert_eq!(parse_ignore_line("# stop words"), None);
}

#[test]
fn test_load_ignore_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "# common words")?;
    writeln!(temp_file, "the")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "  and ")?;

    let words = load_ignore_file(temp_file.path())?;
    assert_eq!(words, vec!["the".to_string(), "and".to_string()]);

    Ok(())
}

#[test]
fn test_load_ignore_file_missing() {
    let result = load_ignore_file(&PathBuf::from("/definitely/not/here.txt"));
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Failed to read ignore file"));
}

#[test]
fn test_collect_ignore_words_unions_and_dedups() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "is")?;
    writeln!(temp_file, "the")?;

    let path = PathBuf::from(temp_file.path());
    let words = collect_ignore_words(&["the".to_string(), "a".to_string()], Some(&path))?;

    assert_eq!(words, vec!["a".to_string(), "is".to_string(), "the".to_string()]);
    Ok(())
}

#[test]
fn test_collect_ignore_words_without_file() {
    let words = collect_ignore_words(&["x".to_string(), " ".to_string()], None).unwrap();
    assert_eq!(words, vec!["x".to_string()]);
}

#[test]
fn test_expand_path_plain() {
    assert_eq!(expand_path("/tmp/report.json"), PathBuf::from("/tmp/report.json"));
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/report.json");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("report.json"));
}

#[test]
fn test_exit_codes_are_distinct() {
    assert_eq!(exit_code(&AnalyzeError::InvalidParameter("x".into())), EXIT_INVALID_PARAMETER);
    assert_eq!(exit_code(&AnalyzeError::NotFound("x".into())), EXIT_NOT_FOUND);
    assert_eq!(exit_code(&AnalyzeError::Cancelled), EXIT_CANCELLED);
    assert_eq!(
        exit_code(&AnalyzeError::Source {
            title: "x".into(),
            source: ScanError::Timeout("x".into()),
        }),
        EXIT_FAILURE
    );
}

#[test]
fn test_source_config_default() {
    let config = source_config(None, None, 10).unwrap();
    assert_eq!(config.endpoint, "https://en.wikipedia.org/w/api.php");
    assert_eq!(config.timeout_secs, 10);
}

#[test]
fn test_source_config_language() {
    let config = source_config(Some("fr"), None, 5).unwrap();
    assert_eq!(config.endpoint, "https://fr.wikipedia.org/w/api.php");
    assert_eq!(config.timeout_secs, 5);
}

#[test]
fn test_source_config_endpoint_wins() {
    let config = source_config(Some("fr"), Some("http://localhost:8080/w/api.php"), 5).unwrap();
    assert_eq!(config.endpoint, "http://localhost:8080/w/api.php");
}

#[test]
fn test_source_config_rejects_bad_input() {
    assert!(source_config(Some("en/../x"), None, 5).is_err());
    assert!(source_config(None, None, 0).is_err());
}

#[test]
fn test_write_report_to_nested_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let target = dir.path().join("reports").join("out.csv");

    let target_str = target.to_string_lossy().into_owned();
    let written = write_report("word,count,percentage\n", Some(target_str.as_str()))?;

    assert_eq!(written, Some(target.clone()));
    assert_eq!(std::fs::read_to_string(target)?, "word,count,percentage\n");
    Ok(())
}

// Report generation from a finished analysis

use crate::error::ReportError;
use crate::traverser::{Analysis, AnalyzeRequest, TraversalStats};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRow {
    pub word: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub article: String,
    pub depth: i64,
    pub threshold: f64,
    pub ignored: Vec<String>,
    pub stats: TraversalStats,
    pub elapsed_ms: u64,
    /// Surviving words, most frequent first.
    pub words: Vec<WordRow>,
    /// Number of words that passed the threshold before any `top` limit.
    pub total_matches: usize,
}

impl ReportData {
    /// Builds the report view. `top` keeps only the N most frequent words.
    pub fn from_analysis(request: &AnalyzeRequest, analysis: &Analysis, top: Option<usize>) -> Self {
        let ranked = analysis.table.ranked();
        let total_matches = ranked.len();
        let words = ranked
            .into_iter()
            .take(top.unwrap_or(usize::MAX))
            .map(|(word, entry)| WordRow {
                word: word.to_string(),
                count: entry.count,
                percentage: entry.percentage,
            })
            .collect();

        let mut ignored = request.ignore.clone();
        ignored.sort();
        ignored.dedup();

        Self {
            article: request.title.clone(),
            depth: request.depth,
            threshold: request.threshold,
            ignored,
            stats: analysis.stats.clone(),
            elapsed_ms: u64::try_from(analysis.elapsed.as_millis()).unwrap_or(u64::MAX),
            words,
            total_matches,
        }
    }
}

pub fn generate_report(data: &ReportData, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => Ok(generate_json_report(data)?),
        ReportFormat::Csv => generate_csv_report(data),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                        WORD FREQUENCY REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Article:      {}\n", data.article));
    report.push_str(&format!("Depth:        {}\n", data.depth));
    report.push_str(&format!("Threshold:    {}%\n", data.threshold));
    if !data.ignored.is_empty() {
        report.push_str(&format!("Ignored:      {}\n", data.ignored.join(", ")));
    }
    report.push_str(&format!("Generated:    {}\n", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
    report.push('\n');

    report.push_str("# Summary:\n");
    report.push_str(&format!("  Articles counted: {}\n", data.stats.documents_fetched));
    report.push_str(&format!("  Articles skipped: {}\n", data.stats.titles_skipped));
    report.push_str(&format!("  Titles visited:   {}\n", data.stats.visited));
    report.push_str(&format!("  Words counted:    {}\n", data.stats.total_words));
    report.push_str(&format!("  Words reported:   {}", data.words.len()));
    if data.words.len() < data.total_matches {
        report.push_str(&format!(" (of {} above threshold)", data.total_matches));
    }
    report.push_str(&format!("\n  Duration:         {} ms\n\n", data.elapsed_ms));

    report.push_str(RULE);
    report.push_str("\n\n");

    if data.words.is_empty() {
        report.push_str("  No words above the threshold.\n\n");
        return report;
    }

    let width = data
        .words
        .iter()
        .map(|row| row.word.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    report.push_str(&format!("  {:<width$}  {:>10}  {:>10}\n", "WORD", "COUNT", "PERCENT", width = width));
    for row in &data.words {
        report.push_str(&format!(
            "  {:<width$}  {:>10}  {:>9.4}%\n",
            row.word,
            row.count,
            row.percentage,
            width = width
        ));
    }
    report.push('\n');

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    // Words keep the historical `word: [count, percentage]` shape
    let words: serde_json::Map<String, serde_json::Value> = data
        .words
        .iter()
        .map(|row| (row.word.clone(), serde_json::json!([row.count, row.percentage])))
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "wikifreq",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "request": {
                "article": data.article,
                "depth": data.depth,
                "threshold": data.threshold,
                "ignore_list": data.ignored
            },
            "summary": {
                "documents_fetched": data.stats.documents_fetched,
                "titles_skipped": data.stats.titles_skipped,
                "titles_visited": data.stats.visited,
                "rounds": data.stats.rounds,
                "total_words": data.stats.total_words,
                "words_reported": data.words.len(),
                "words_above_threshold": data.total_matches,
                "duration_ms": data.elapsed_ms
            },
            "words": words
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(data: &ReportData) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(["word", "count", "percentage"])?;
        for row in &data.words {
            writer.write_record([
                row.word.as_str(),
                &row.count.to_string(),
                &row.percentage.to_string(),
            ])?;
        }
        writer.flush()?;
    }

    Ok(String::from_utf8(buffer)?)
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Word frequency: {}\n\n", data.article));
    report.push_str(&format!(
        "- **Depth:** {}\n- **Threshold:** {}%\n- **Articles counted:** {}\n- **Articles skipped:** {}\n- **Words counted:** {}\n",
        data.depth,
        data.threshold,
        data.stats.documents_fetched,
        data.stats.titles_skipped,
        data.stats.total_words
    ));
    if !data.ignored.is_empty() {
        report.push_str(&format!("- **Ignored:** {}\n", data.ignored.join(", ")));
    }
    report.push('\n');

    if data.words.is_empty() {
        report.push_str("_No words above the threshold._\n");
        return report;
    }

    report.push_str("| Word | Count | Percent |\n");
    report.push_str("|------|------:|--------:|\n");
    for row in &data.words {
        report.push_str(&format!(
            "| {} | {} | {:.4}% |\n",
            row.word.replace('|', "\\|"),
            row.count,
            row.percentage
        ));
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with_words(words: &[&str]) -> ReportData {
        ReportData {
            article: "Seed".to_string(),
            depth: 0,
            threshold: 0.0,
            ignored: Vec::new(),
            stats: TraversalStats::default(),
            elapsed_ms: 0,
            words: words
                .iter()
                .map(|word| WordRow {
                    word: word.to_string(),
                    count: 1,
                    percentage: 12.5,
                })
                .collect(),
            total_matches: words.len(),
        }
    }

    #[test]
    fn test_csv_quotes_awkward_fields() {
        let csv = generate_csv_report(&data_with_words(&["plain", "a,b", "say \"hi\"", "cr\rlf"])).unwrap();

        assert_eq!(
            csv,
            "word,count,percentage\n\
             plain,1,12.5\n\
             \"a,b\",1,12.5\n\
             \"say \"\"hi\"\"\",1,12.5\n\
             \"cr\rlf\",1,12.5\n"
        );
    }

    #[test]
    fn test_csv_round_trips_through_reader() {
        let csv = generate_csv_report(&data_with_words(&["x,y\r\nz"])).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "x,y\r\nz");
        assert_eq!(&records[0][1], "1");
    }

    #[test]
    fn test_csv_empty_table_has_header_only() {
        let csv = generate_csv_report(&data_with_words(&[])).unwrap();
        assert_eq!(csv, "word,count,percentage\n");
    }
}

use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wikifreq::handlers::{
    EXIT_FAILURE, EXIT_INVALID_PARAMETER, collect_ignore_words, exit_code, init_logging,
    source_config, write_report,
};
use wikifreq_core::AnalyzeRequest;
use wikifreq_core::crawl::{AnalyzeOptions, execute_analysis};
use wikifreq_core::report::{ReportData, ReportFormat, generate_report};
use wikifreq_scanner::WikiClient;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_logging(verbose);

    match chosen_command.subcommand() {
        Some(("analyze", primary_command)) => handle_analyze(primary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

fn fail(message: impl std::fmt::Display, code: i32) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    process::exit(code);
}

async fn handle_analyze(sub_matches: &ArgMatches, quiet: bool) {
    let article = sub_matches
        .get_one::<String>("article")
        .cloned()
        .unwrap_or_default();
    let depth = *sub_matches.get_one::<i64>("depth").unwrap_or(&0);
    let percentile = *sub_matches.get_one::<f64>("percentile").unwrap_or(&0.0);
    let workers = *sub_matches.get_one::<usize>("workers").unwrap_or(&8);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let deadline = sub_matches.get_one::<u64>("deadline").copied();
    let top = sub_matches.get_one::<usize>("top").copied();
    let language = sub_matches.get_one::<String>("lang").map(String::as_str);
    let endpoint = sub_matches.get_one::<String>("endpoint").map(String::as_str);
    let output = sub_matches.get_one::<String>("output").map(String::as_str);
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let ignore_args: Vec<String> = sub_matches
        .get_many::<String>("ignore")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let ignore_file = sub_matches.get_one::<PathBuf>("ignore-file");

    let ignore = match collect_ignore_words(&ignore_args, ignore_file) {
        Ok(words) => words,
        Err(e) => fail(format!("{:#}", e), EXIT_INVALID_PARAMETER),
    };

    let config = match source_config(language, endpoint, timeout) {
        Ok(config) => config,
        Err(e) => fail(e, EXIT_INVALID_PARAMETER),
    };

    let source = match WikiClient::from_config(&config) {
        Ok(source) => source,
        Err(e) => fail(e, EXIT_INVALID_PARAMETER),
    };

    let request = AnalyzeRequest::new(article)
        .with_depth(depth)
        .with_ignore(ignore)
        .with_threshold(percentile);

    if !quiet {
        eprintln!("\n{} Analyzing {}", "→".blue(), request.title.bright_white());
        eprintln!("Source:     {}", source.endpoint());
        eprintln!("Depth:      {}", request.depth);
        eprintln!("Threshold:  {}%", request.threshold);
        eprintln!("Workers:    {}", workers);
        if !request.ignore.is_empty() {
            eprintln!("Ignoring:   {} words", request.ignore.len());
        }
        eprintln!();
    }

    // Ctrl-C aborts the running round
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling analysis");
            ctrl_c_token.cancel();
        }
    });

    let options = AnalyzeOptions {
        request: request.clone(),
        workers,
        fetch_timeout: None,
        deadline: deadline.map(Duration::from_secs),
        show_progress_bars: !quiet,
    };

    let analysis = match execute_analysis(source, options, cancel).await {
        Ok(analysis) => analysis,
        Err(e) => fail(&e, exit_code(&e)),
    };

    let data = ReportData::from_analysis(&request, &analysis, top);
    let report = match generate_report(&data, format) {
        Ok(report) => report,
        Err(e) => fail(format!("Failed to render report: {}", e), EXIT_FAILURE),
    };

    match write_report(&report, output) {
        Ok(Some(path)) => {
            if !quiet {
                eprintln!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        Ok(None) => {}
        Err(e) => fail(format!("{:#}", e), EXIT_FAILURE),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

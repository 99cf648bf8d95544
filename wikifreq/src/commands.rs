use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikifreq")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikifreq")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress progress and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log traversal progress to stderr").required(false))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("analyze")
                .about(
                    "Crawl an article and the articles it links to, and report how often \
                each word occurs across all of them.",
                )
                .arg(
                    arg!(-a --"article" <TITLE>)
                        .required(true)
                        .help("Title of the article to start from"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("How many rounds of links to follow beyond the article itself")
                        .value_parser(clap::value_parser!(i64))
                        .allow_negative_numbers(true)
                        .default_value("0"),
                )
                .arg(
                    arg!(-i --"ignore" <WORD>)
                        .required(false)
                        .help("Word to leave out of the counts (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"ignore-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of words to leave out")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-p --"percentile" <PERCENT>)
                        .required(false)
                        .help("Only report words making up more than this percentage of all words")
                        .value_parser(clap::value_parser!(f64))
                        .allow_negative_numbers(true)
                        .default_value("0"),
                )
                .arg(
                    arg!(-t --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("Maximum number of articles fetched concurrently")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("8"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"deadline" <SECONDS>)
                        .required(false)
                        .help("Give up on the whole analysis after this many seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-l --"lang" <CODE>)
                        .required(false)
                        .help("Wikipedia language edition (default: en)")
                        .conflicts_with("endpoint"),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint to query instead of Wikipedia")
                        .conflicts_with("lang"),
                )
                .arg(
                    arg!(--"top" <N>)
                        .required(false)
                        .help("Only show the N most frequent words")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<clap::ArgMatches, clap::Error> {
        command_argument_builder().try_get_matches_from(args)
    }

    #[test]
    fn test_command_is_well_formed() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_analyze_defaults() {
        let matches = parse(&["wikifreq", "analyze", "--article", "Seabrooke"]).unwrap();
        let (name, sub) = matches.subcommand().unwrap();

        assert_eq!(name, "analyze");
        assert_eq!(sub.get_one::<String>("article").unwrap(), "Seabrooke");
        assert_eq!(*sub.get_one::<i64>("depth").unwrap(), 0);
        assert_eq!(*sub.get_one::<f64>("percentile").unwrap(), 0.0);
        assert_eq!(*sub.get_one::<usize>("workers").unwrap(), 8);
        assert_eq!(sub.get_one::<String>("format").unwrap(), "text");
        assert!(sub.get_many::<String>("ignore").is_none());
    }

    #[test]
    fn test_analyze_repeated_ignore_and_negative_depth() {
        let matches = parse(&[
            "wikifreq", "analyze", "-a", "Data science", "-d", "-1", "-i", "the", "-i", "is",
        ])
        .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        assert_eq!(*sub.get_one::<i64>("depth").unwrap(), -1);
        let ignore: Vec<&String> = sub.get_many::<String>("ignore").unwrap().collect();
        assert_eq!(ignore, vec!["the", "is"]);
    }

    #[test]
    fn test_analyze_requires_article() {
        assert!(parse(&["wikifreq", "analyze", "--depth", "1"]).is_err());
    }

    #[test]
    fn test_depth_must_be_integer() {
        assert!(parse(&["wikifreq", "analyze", "-a", "X", "--depth", "deep"]).is_err());
    }

    #[test]
    fn test_lang_conflicts_with_endpoint() {
        assert!(
            parse(&[
                "wikifreq", "analyze", "-a", "X", "--lang", "de", "--endpoint", "http://localhost/w/api.php",
            ])
            .is_err()
        );
    }
}

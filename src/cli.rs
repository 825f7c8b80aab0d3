use crate::i18n::Locale;
use crate::output::OutputFormat;
use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Recursive plain-text word search", long_about = None)]
pub struct Cli {
    /// Word to search for. Prompted for when missing on a terminal.
    #[clap(value_name = "TERM", value_parser, conflicts_with = "term")]
    pub term_arg: Option<String>,

    #[clap(long, value_parser)]
    pub term: Option<String>,

    /// Directory to search, defaults to the current one.
    #[clap(long, value_parser)]
    pub root: Option<PathBuf>,

    #[clap(short = 'i', long, value_parser, default_value_t = false)]
    pub ignore_case: bool,

    /// Only scan files modified within the last N days.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub since: Option<u64>,

    /// Cap on files scanned at the same time. Unbounded when omitted.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_open_files: Option<u64>,

    /// Drop a file's matches when it cannot be read to the end.
    #[clap(long, value_parser, default_value_t = false)]
    pub strict_read: bool,

    #[clap(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[clap(long, value_enum)]
    pub lang: Option<Locale>,

    #[clap(long, value_parser, default_value_t = false)]
    pub copy: bool,

    /// Always ask for the term and options.
    #[clap(long, value_parser, default_value_t = false)]
    pub interactive: bool,

    /// Read settings from this file instead of the default locations.
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, value_enum)]
    pub completions: Option<Shell>,
}

impl Cli {
    pub fn search_term(&self) -> Option<&str> {
        self.term.as_deref().or(self.term_arg.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_flag_term() {
        let cli = Cli::parse_from(["wordfind", "needle"]);
        assert_eq!(cli.search_term(), Some("needle"));

        let cli = Cli::parse_from(["wordfind", "--term", "needle", "--since", "7", "-i"]);
        assert_eq!(cli.search_term(), Some("needle"));
        assert_eq!(cli.since, Some(7));
        assert!(cli.ignore_case);
    }

    #[test]
    fn test_zero_days_rejected() {
        assert!(Cli::try_parse_from(["wordfind", "x", "--since", "0"]).is_err());
        assert!(Cli::try_parse_from(["wordfind", "x", "--max-open-files", "0"]).is_err());
    }

    #[test]
    fn test_both_terms_conflict() {
        assert!(Cli::try_parse_from(["wordfind", "a", "--term", "b"]).is_err());
    }
}

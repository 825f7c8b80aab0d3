use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Result as WordfindResult, WordfindError};
use crate::i18n::{Locale, MessageKey, message};
use crate::interactive::prompt_search;
use crate::output::{OutputFormatterTrait, TextFormatter, formatter_for};
use crate::processor::ReadErrorPolicy;
use crate::progress::SearchSpinner;
use crate::search::{SearchConfig, SearchOutcome, search};
use clap::CommandFactory;
use colored::*;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// How a completed run ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    /// Results were printed but some directories could not be read.
    Partial,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::Partial => 2,
        }
    }
}

pub async fn run(cli: &Cli) -> WordfindResult<RunStatus> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "wordfind", &mut std::io::stdout());
        return Ok(RunStatus::Complete);
    }

    let config = load_config(cli)?;
    let locale = cli.lang.unwrap_or(config.display.lang);
    let format = cli.format.unwrap_or(config.display.format);

    let root = resolve_root(cli, locale).await?;
    let search_config = build_search_config(cli, &config, root, locale)?;

    let spinner = SearchSpinner::start(message(MessageKey::Searching, locale, &[]));
    let result = search(&search_config).await;
    spinner.finish();
    let mut outcome = result?;
    outcome.sort();

    let formatter = formatter_for(format, locale);
    debug!("Rendering with the {} formatter", formatter.name());
    print!("{}", formatter.format(&outcome, &search_config.term));
    report_errors(&outcome, locale);

    if cli.copy && !outcome.matches.is_empty() {
        copy_to_clipboard(&outcome, &search_config.term, locale)?;
    }

    Ok(if outcome.has_errors() {
        RunStatus::Partial
    } else {
        RunStatus::Complete
    })
}

fn load_config(cli: &Cli) -> WordfindResult<Config> {
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.map_err(|e| WordfindError::Config(format!("{e:#}")))
}

async fn resolve_root(cli: &Cli, locale: Locale) -> WordfindResult<PathBuf> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let is_dir = tokio::fs::metadata(&root)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);
    if !is_dir {
        let path = root.display().to_string();
        return Err(WordfindError::Input(message(
            MessageKey::NoRoot,
            locale,
            &[("path", &path)],
        )));
    }
    Ok(root)
}

/// Windows too large to represent saturate, which admits every file.
fn days_to_window(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY))
}

/// Merges flags, prompt answers and the config file, flags first.
pub fn build_search_config(
    cli: &Cli,
    config: &Config,
    root: PathBuf,
    locale: Locale,
) -> WordfindResult<SearchConfig> {
    let days = cli.since.or(config.search.since_days);
    let mut recency_window = days.map(days_to_window);
    let mut case_insensitive = cli.ignore_case || config.search.ignore_case;

    let stdin_is_terminal = is_terminal::is_terminal(&std::io::stdin());
    let term = match cli.search_term() {
        Some(term) if !cli.interactive => term.to_string(),
        given if stdin_is_terminal => {
            let answers = prompt_search(locale, given)?;
            case_insensitive = answers.case_insensitive;
            recency_window = answers.recency_window;
            answers.term
        }
        Some(term) => term.to_string(),
        None => {
            return Err(WordfindError::Input(message(
                MessageKey::NoTerm,
                locale,
                &[],
            )));
        }
    };

    let max_open_files = match cli.max_open_files {
        Some(n) => Some(usize::try_from(n).map_err(|e| WordfindError::Input(e.to_string()))?),
        None => config.search.max_open_files,
    };
    let read_policy = if cli.strict_read || config.search.strict_read {
        ReadErrorPolicy::Discard
    } else {
        ReadErrorPolicy::KeepPartial
    };

    let search_config = SearchConfig::new(root, term)
        .case_insensitive(case_insensitive)
        .recency_window(recency_window)
        .filters(config.filters.clone())
        .max_open_files(max_open_files)
        .read_policy(read_policy);
    search_config.validate()?;
    info!("Search configuration: {search_config:?}");
    Ok(search_config)
}

fn report_errors(outcome: &SearchOutcome, locale: Locale) {
    for err in &outcome.errors {
        let text = match err {
            WordfindError::Traversal { path, source } => {
                let path = path.display().to_string();
                let error = source.to_string();
                message(
                    MessageKey::ReadDirFailed,
                    locale,
                    &[("path", &path), ("error", &error)],
                )
            }
            other => other.to_string(),
        };
        eprintln!("{}", text.red());
    }
}

fn copy_to_clipboard(outcome: &SearchOutcome, term: &str, locale: Locale) -> WordfindResult<()> {
    let text = TextFormatter::plain(locale).format(outcome, term);
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)?;
    println!("\n{}", message(MessageKey::Copied, locale, &[]).green());
    Ok(())
}

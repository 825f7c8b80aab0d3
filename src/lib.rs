pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod interactive;
pub mod output;
pub mod processor;
mod progress;
pub mod search;
pub mod walker;

pub use crate::error::{Result, WordfindError};
pub use app::{RunStatus, run};
pub use clap::Parser;
pub use cli::Cli;
pub use filters::SearchFilters;
pub use processor::{FileMatch, LineMatcher, ReadErrorPolicy, search_file};
pub use search::{SearchConfig, SearchOutcome, search};
pub use walker::{ResultSet, walk_dir};

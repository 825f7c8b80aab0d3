use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WordfindError {
    #[error("Failed to read directory '{path}': {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("Search task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WordfindError>;

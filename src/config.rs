use crate::filters::SearchFilters;
use crate::i18n::Locale;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "wordfind";
const CONFIG_FILE_NAME: &str = ".wordfind.toml";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchSection,
    pub filters: SearchFilters,
    pub display: DisplaySection,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub ignore_case: bool,
    pub since_days: Option<u64>,
    pub max_open_files: Option<usize>,
    pub strict_read: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub lang: Locale,
    pub format: OutputFormat,
}

impl Config {
    /// Loads the first config file found, or the defaults when there is
    /// none.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join(CONFIG_DIR_NAME).join("config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(CONFIG_FILE_NAME);
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(CONFIG_FILE_NAME);
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }
}

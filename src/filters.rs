use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime};

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".txt", ".py", ".html", ".css", ".json", ".md", ".jsx", ".tsx", ".php", ".java",
    ".c", ".cpp", ".go", ".rb", ".swift", ".yml", ".xml", ".sh", ".bat", ".sql", ".ini",
];

pub const DEFAULT_IGNORED_FOLDERS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "vendor",
    "__pycache__",
];

/// Which directories are walked and which files are scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Literal path suffixes, leading dot included.
    pub extensions: Vec<String>,
    /// Directory basenames that are never entered.
    pub ignored_folders: Vec<String>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignored_folders: DEFAULT_IGNORED_FOLDERS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl SearchFilters {
    /// Exact basename equality, never a path or prefix test.
    pub fn is_ignored_folder(&self, name: &OsStr) -> bool {
        match name.to_str() {
            Some(name) => self.ignored_folders.iter().any(|f| f == name),
            None => false,
        }
    }

    /// Case-sensitive suffix test against the whole path, so
    /// `notes.txt.old` does not qualify as `.txt`.
    pub fn has_allowed_extension(&self, path: &Path) -> bool {
        let full = path.to_string_lossy();
        self.extensions.iter().any(|ext| full.ends_with(ext.as_str()))
    }
}

/// True when `modified` lies within `window` of `now`. A timestamp in the
/// future counts as age zero.
pub fn is_recent(modified: SystemTime, now: SystemTime, window: Duration) -> bool {
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    age <= window
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_suffix_match_is_literal() {
        let filters = SearchFilters::default();
        assert!(filters.has_allowed_extension(&PathBuf::from("src/index.html")));
        assert!(!filters.has_allowed_extension(&PathBuf::from("notes.txt.old")));
        assert!(!filters.has_allowed_extension(&PathBuf::from("foo.html.bak")));
        assert!(!filters.has_allowed_extension(&PathBuf::from("Makefile")));
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        let filters = SearchFilters::default();
        assert!(!filters.has_allowed_extension(&PathBuf::from("README.MD")));
        assert!(filters.has_allowed_extension(&PathBuf::from("README.md")));
    }

    #[test]
    fn test_ignored_folder_by_basename() {
        let filters = SearchFilters::default();
        assert!(filters.is_ignored_folder(OsStr::new(".git")));
        assert!(filters.is_ignored_folder(OsStr::new("node_modules")));
        assert!(!filters.is_ignored_folder(OsStr::new("git")));
        assert!(!filters.is_ignored_folder(OsStr::new("builds")));
    }

    #[test]
    fn test_recency_window() {
        let now = SystemTime::now();
        let eight_days_ago = now - 8 * DAY;
        assert!(!is_recent(eight_days_ago, now, 7 * DAY));
        assert!(is_recent(eight_days_ago, now, 30 * DAY));
        assert!(is_recent(now + DAY, now, 7 * DAY));
    }
}

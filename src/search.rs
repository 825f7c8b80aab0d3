use crate::error::{Result as WordfindResult, WordfindError};
use crate::filters::SearchFilters;
use crate::processor::{FileMatch, LineMatcher, ReadErrorPolicy};
use crate::walker::{ResultSet, WalkContext, WalkStats, walk_dir};
use log::{debug, info};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::Semaphore;

pub const SEVEN_DAYS: Duration = Duration::from_millis(7 * 24 * 60 * 60 * 1000);
pub const THIRTY_DAYS: Duration = Duration::from_millis(30 * 24 * 60 * 60 * 1000);

/// Inputs of one search. Immutable once the walk starts.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub root: PathBuf,
    pub term: String,
    pub case_insensitive: bool,
    /// Only files modified within this window are scanned.
    pub recency_window: Option<Duration>,
    pub filters: SearchFilters,
    /// `None` leaves file scans unbounded.
    pub max_open_files: Option<usize>,
    pub read_policy: ReadErrorPolicy,
}

impl SearchConfig {
    pub fn new(root: impl Into<PathBuf>, term: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            term: term.into(),
            case_insensitive: false,
            recency_window: None,
            filters: SearchFilters::default(),
            max_open_files: None,
            read_policy: ReadErrorPolicy::default(),
        }
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn recency_window(mut self, window: Option<Duration>) -> Self {
        self.recency_window = window;
        self
    }

    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn max_open_files(mut self, limit: Option<usize>) -> Self {
        self.max_open_files = limit;
        self
    }

    pub fn read_policy(mut self, policy: ReadErrorPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// Rejects a search before any traversal starts. The root itself is
    /// checked by [`search`].
    pub fn validate(&self) -> WordfindResult<()> {
        if self.term.is_empty() {
            return Err(WordfindError::Input("no search term given".to_string()));
        }
        if self.root.as_os_str().is_empty() {
            return Err(WordfindError::Input("no root directory given".to_string()));
        }
        if self.max_open_files == Some(0) {
            return Err(WordfindError::Input(
                "max open files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Final state of a search: every file with at least one hit, in no
/// particular order, plus the subtrees that could not be listed.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub matches: Vec<FileMatch>,
    pub errors: Vec<WordfindError>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn file_count(&self) -> usize {
        self.matches.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Orders files by path so rendering is stable between runs.
    pub fn sort(&mut self) {
        self.matches.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    pub directories: usize,
    pub files_scanned: usize,
    pub skipped: usize,
    pub time_taken: Duration,
}

/// Walks `config.root` and collects the matches. Fails only on invalid
/// input; unreadable directories end up in [`SearchOutcome::errors`].
pub async fn search(config: &SearchConfig) -> WordfindResult<SearchOutcome> {
    config.validate()?;
    let root_is_dir = tokio::fs::metadata(&config.root)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);
    if !root_is_dir {
        return Err(WordfindError::Input(format!(
            "'{}' is not a directory",
            config.root.display()
        )));
    }

    let start = Instant::now();
    info!(
        "Searching for {:?} under {} (ignore case: {}, window: {:?})",
        config.term,
        config.root.display(),
        config.case_insensitive,
        config.recency_window
    );

    let ctx = Arc::new(WalkContext {
        filters: config.filters.clone(),
        matcher: LineMatcher::new(&config.term, config.case_insensitive),
        recency_window: config.recency_window,
        now: SystemTime::now(),
        read_policy: config.read_policy,
        file_gate: config.max_open_files.map(|n| Arc::new(Semaphore::new(n))),
        results: ResultSet::default(),
        errors: Mutex::new(Vec::new()),
        stats: WalkStats::default(),
    });

    walk_dir(config.root.clone(), Arc::clone(&ctx)).await;

    let ctx = Arc::try_unwrap(ctx).map_err(|_| {
        WordfindError::Other("search tasks still hold the result set".to_string())
    })?;

    let stats = SearchStats {
        directories: ctx.stats.directories.load(Ordering::Relaxed),
        files_scanned: ctx.stats.files_scanned.load(Ordering::Relaxed),
        skipped: ctx.stats.skipped.load(Ordering::Relaxed),
        time_taken: start.elapsed(),
    };
    let outcome = SearchOutcome {
        matches: ctx.results.into_inner(),
        errors: ctx.errors.into_inner(),
        stats,
    };

    debug!("Search stats: {:?}", outcome.stats);
    info!(
        "Found {:?} in {} file(s), scanned {} file(s) in {:.2?}",
        config.term,
        outcome.file_count(),
        outcome.stats.files_scanned,
        outcome.stats.time_taken
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn age(path: &Path, by: Duration) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    fn as_set(outcome: &SearchOutcome) -> BTreeSet<(PathBuf, Vec<usize>)> {
        outcome
            .matches
            .iter()
            .map(|m| (m.path.clone(), m.lines.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_scenario_ignored_folder_and_no_match() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = write(root, "a.py", "x = 1\nimport os");
        write(root, "b/.git/config.md", "import everything");
        write(root, "b/c.md", "no match here");

        let outcome = search(&SearchConfig::new(root, "import")).await.unwrap();

        assert_eq!(outcome.matches, vec![FileMatch { path: a, lines: vec![2] }]);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_folders_at_any_depth() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "node_modules/pkg/index.js", "needle");
        write(root, "src/deep/build/out.js", "needle");
        write(root, "src/deep/__pycache__/m.py", "needle");
        let kept = write(root, "src/deep/keep.js", "needle");

        let outcome = search(&SearchConfig::new(root, "needle")).await.unwrap();

        assert_eq!(outcome.file_count(), 1);
        assert_eq!(outcome.matches[0].path, kept);
    }

    #[tokio::test]
    async fn test_extension_filter() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "notes.txt.old", "needle");
        write(root, "image.png", "needle");
        let txt = write(root, "notes.txt", "needle");

        let outcome = search(&SearchConfig::new(root, "needle")).await.unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].path, txt);
    }

    #[tokio::test]
    async fn test_case_insensitive_search() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "f.txt", "foo\nFOO\nfOo\nbar\n");

        let strict = search(&SearchConfig::new(root, "Foo")).await.unwrap();
        assert!(strict.matches.is_empty());

        let loose = search(&SearchConfig::new(root, "Foo").case_insensitive(true))
            .await
            .unwrap();
        assert_eq!(loose.matches[0].lines, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_recency_window() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let old = write(root, "old.md", "needle");
        age(&old, 8 * DAY);
        let fresh = write(root, "fresh.md", "needle");

        let week = search(&SearchConfig::new(root, "needle").recency_window(Some(SEVEN_DAYS)))
            .await
            .unwrap();
        assert_eq!(week.file_count(), 1);
        assert_eq!(week.matches[0].path, fresh);

        let month = search(&SearchConfig::new(root, "needle").recency_window(Some(THIRTY_DAYS)))
            .await
            .unwrap();
        assert_eq!(month.file_count(), 2);

        let all = search(&SearchConfig::new(root, "needle")).await.unwrap();
        assert_eq!(all.file_count(), 2);
    }

    #[tokio::test]
    async fn test_repeated_search_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..20 {
            write(root, &format!("d{}/f{}.rb", i % 4, i), "a\nneedle\nb\nneedle\n");
        }

        let first = search(&SearchConfig::new(root, "needle")).await.unwrap();
        let second = search(&SearchConfig::new(root, "needle")).await.unwrap();

        assert_eq!(first.file_count(), 20);
        assert_eq!(as_set(&first), as_set(&second));
    }

    #[tokio::test]
    async fn test_bounded_file_gate_gives_same_results() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..30 {
            write(root, &format!("s{}/f{}.go", i % 5, i), "package needle\n");
        }

        let unbounded = search(&SearchConfig::new(root, "needle")).await.unwrap();
        let bounded = search(&SearchConfig::new(root, "needle").max_open_files(Some(2)))
            .await
            .unwrap();

        assert_eq!(as_set(&unbounded), as_set(&bounded));
        assert_eq!(bounded.stats.files_scanned, 30);
    }

    #[tokio::test]
    async fn test_custom_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "node_modules/x.rs", "needle");
        let rs = write(root, "lib.rs", "needle");
        write(root, "skip/lib.rs", "needle");

        let filters = SearchFilters {
            extensions: vec![".rs".to_string()],
            ignored_folders: vec!["skip".to_string()],
        };
        let outcome = search(&SearchConfig::new(root, "needle").filters(filters))
            .await
            .unwrap();

        let paths: BTreeSet<_> = outcome.matches.iter().map(|m| m.path.clone()).collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&rs));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let temp_dir = TempDir::new().unwrap();

        let empty_term = search(&SearchConfig::new(temp_dir.path(), "")).await;
        assert!(matches!(empty_term, Err(WordfindError::Input(_))));

        let missing_root = search(&SearchConfig::new(temp_dir.path().join("nope"), "x")).await;
        assert!(matches!(missing_root, Err(WordfindError::Input(_))));

        let zero_gate =
            search(&SearchConfig::new(temp_dir.path(), "x").max_open_files(Some(0))).await;
        assert!(matches!(zero_gate, Err(WordfindError::Input(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_directory_does_not_abort_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let locked = root.join("locked");
        write(root, "locked/hidden.txt", "needle");
        let open = write(root, "open/visible.txt", "needle");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can list the directory anyway.
        let listable = fs::read_dir(&locked).is_ok();
        let outcome = search(&SearchConfig::new(root, "needle")).await.unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(outcome.matches.iter().any(|m| m.path == open));
        if !listable {
            assert_eq!(outcome.file_count(), 1);
            assert_eq!(outcome.errors.len(), 1);
            assert!(matches!(
                outcome.errors[0],
                WordfindError::Traversal { .. }
            ));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broken_symlink_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::os::unix::fs::symlink(root.join("missing.txt"), root.join("dangling.txt")).unwrap();
        write(root, "real.txt", "needle");

        let outcome = search(&SearchConfig::new(root, "needle")).await.unwrap();

        assert_eq!(outcome.file_count(), 1);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.stats.skipped, 1);
    }
}

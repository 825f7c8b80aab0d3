use crate::error::WordfindError;
use crate::filters::{SearchFilters, is_recent};
use crate::processor::{FileMatch, LineMatcher, ReadErrorPolicy, search_file};
use log::{debug, error, warn};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

type WalkFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared, append-only collection of per-file hits filled by concurrent
/// scans.
#[derive(Debug, Default)]
pub struct ResultSet {
    matches: Mutex<Vec<FileMatch>>,
}

impl ResultSet {
    pub fn push(&self, found: FileMatch) {
        self.matches.lock().push(found);
    }

    pub fn into_inner(self) -> Vec<FileMatch> {
        self.matches.into_inner()
    }
}

#[derive(Debug, Default)]
pub struct WalkStats {
    pub directories: AtomicUsize,
    pub files_scanned: AtomicUsize,
    pub skipped: AtomicUsize,
}

/// Everything a directory visit needs, shared by every task of one search.
pub struct WalkContext {
    pub filters: SearchFilters,
    pub matcher: LineMatcher,
    pub recency_window: Option<Duration>,
    /// Reference instant for the recency filter, fixed when the search
    /// starts.
    pub now: SystemTime,
    pub read_policy: ReadErrorPolicy,
    /// Caps concurrently open files when set.
    pub file_gate: Option<Arc<Semaphore>>,
    pub results: ResultSet,
    pub errors: Mutex<Vec<WordfindError>>,
    pub stats: WalkStats,
}

/// Visits `dir` and everything below it. Every entry of one level runs as
/// its own task; the returned future resolves once all of them are done.
/// A directory that cannot be listed records a traversal error and aborts
/// only its own subtree.
pub fn walk_dir(dir: PathBuf, ctx: Arc<WalkContext>) -> WalkFuture {
    Box::pin(async move {
        ctx.stats.directories.fetch_add(1, Ordering::Relaxed);

        let entries = match list_entries(&dir).await {
            Ok(entries) => entries,
            Err(source) => {
                warn!("Failed to read {}: {}", dir.display(), source);
                ctx.errors
                    .lock()
                    .push(WordfindError::Traversal { path: dir, source });
                return;
            }
        };

        let mut tasks = JoinSet::new();
        for (name, path) in entries {
            let ctx = Arc::clone(&ctx);
            tasks.spawn(async move { visit_entry(name, path, ctx).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Task under {} failed: {}", dir.display(), e);
                ctx.errors.lock().push(WordfindError::Join(e));
            }
        }
    })
}

async fn list_entries(dir: &Path) -> std::io::Result<Vec<(OsString, PathBuf)>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push((entry.file_name(), entry.path()));
    }
    Ok(entries)
}

async fn visit_entry(name: OsString, path: PathBuf, ctx: Arc<WalkContext>) {
    // Follows symlinks, like the listing itself.
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            ctx.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    if metadata.is_dir() {
        if ctx.filters.is_ignored_folder(&name) {
            debug!("Skipping ignored folder: {}", path.display());
            ctx.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        walk_dir(path, ctx).await;
        return;
    }

    if !ctx.filters.has_allowed_extension(&path) {
        ctx.stats.skipped.fetch_add(1, Ordering::Relaxed);
        return;
    }

    if let Some(window) = ctx.recency_window {
        // No modification time on this platform: the file cannot prove it
        // is recent.
        let recent = metadata
            .modified()
            .map(|modified| is_recent(modified, ctx.now, window))
            .unwrap_or(false);
        if !recent {
            debug!("Skipping file outside recency window: {}", path.display());
            ctx.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
    }

    let _permit = match &ctx.file_gate {
        Some(gate) => match gate.acquire().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                error!("File gate closed while scanning {}: {}", path.display(), e);
                return;
            }
        },
        None => None,
    };

    ctx.stats.files_scanned.fetch_add(1, Ordering::Relaxed);
    if let Some(found) = search_file(&path, &ctx.matcher, ctx.read_policy).await {
        debug!("{} line(s) matched in {}", found.count(), path.display());
        ctx.results.push(found);
    }
}

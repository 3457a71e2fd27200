//! Filesystem change source.
//!
//! Bridges raw notify events onto a tokio channel the host loop can
//! consume. Bursts are passed through intact here; the engine's debounce
//! window does the coalescing.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::Result;

/// A change reported by the filesystem watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File content was modified.
    Modified(PathBuf),
    /// File was created.
    Created(PathBuf),
    /// File was removed.
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Recursive watcher over a session root.
///
/// Dropping the watcher stops the event stream, so it must outlive the
/// session it feeds.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Watch `root` recursively. Returns the watcher and the change event
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or `root` does
    /// not exist.
    pub fn new(root: PathBuf) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(100);
        let watch_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };

            // mtime and permission churn would loop forever on some
            // platforms; only content-level events matter here.
            if let EventKind::Modify(modify) = &event.kind {
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
            }

            for path in &event.paths {
                if Self::skip(path, &watch_root) {
                    continue;
                }
                let change = match event.kind {
                    EventKind::Create(_) => FileChange::Created(path.clone()),
                    EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };
                let _ = tx.blocking_send(change);
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Paths the watcher never reports: anything outside the root and
    /// hidden files (editor swap files, `.git` churn).
    fn skip(path: &Path, root: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(root) else {
            return true;
        };
        rel.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
        })
    }

    /// Root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

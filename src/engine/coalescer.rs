//! Trailing-edge coalescing of edit events.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Default quiet window between the last edit to a document and its
/// broadcast. Short enough to feel immediate, long enough to swallow a
/// typing burst.
pub const DEFAULT_DEBOUNCE_MS: u64 = 140;

/// File extensions whose edits are eligible for broadcast.
const WATCHED_EXTENSIONS: [&str; 3] = ["html", "htm", "css"];

/// Check whether a path is one of the watched document kinds.
pub fn watched_kind(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| WATCHED_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

struct PendingEdit {
    generation: u64,
    timer: JoinHandle<()>,
}

/// Per-document pending timers, keyed by path.
///
/// At most one timer exists per document. A newer edit aborts and replaces
/// the older timer together with its content snapshot, so the broadcast
/// that eventually fires carries the last edit's content. Generations tell
/// a fired timer's cleanup apart from a replacement that has already taken
/// its slot.
pub(crate) struct ChangeCoalescer {
    window: Duration,
    next_gen: AtomicU64,
    pending: Mutex<HashMap<PathBuf, PendingEdit>>,
}

impl ChangeCoalescer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            next_gen: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Quiet window between the last edit and its broadcast.
    pub(crate) fn window(&self) -> Duration {
        self.window
    }

    /// Claim a generation number for a timer about to be scheduled.
    pub(crate) fn next_generation(&self) -> u64 {
        self.next_gen.fetch_add(1, Ordering::Relaxed)
    }

    /// Install `timer` as the pending broadcast for `path`, aborting any
    /// older timer for the same document.
    pub(crate) fn schedule(&self, path: PathBuf, generation: u64, timer: JoinHandle<()>) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(old) = pending.insert(path, PendingEdit { generation, timer }) {
                old.timer.abort();
            }
        }
    }

    /// Remove the entry for `path` once its timer has fired. A no-op when a
    /// newer edit has already replaced the entry.
    pub(crate) fn finished(&self, path: &Path, generation: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            if pending.get(path).is_some_and(|p| p.generation == generation) {
                pending.remove(path);
            }
        }
    }

    /// Abort every outstanding timer and empty the map. Runs on session
    /// stop, before the hub is torn down.
    pub(crate) fn flush_all(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            for (_, entry) in pending.drain() {
                entry.timer.abort();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn test_watched_kind_accepts_documents() {
        assert!(watched_kind(Path::new("index.html")));
        assert!(watched_kind(Path::new("page.htm")));
        assert!(watched_kind(Path::new("css/site.css")));
        assert!(watched_kind(Path::new("UPPER.HTML")));
    }

    #[test]
    fn test_watched_kind_rejects_everything_else() {
        assert!(!watched_kind(Path::new("notes.txt")));
        assert!(!watched_kind(Path::new("app.js")));
        assert!(!watched_kind(Path::new("logo.png")));
        assert!(!watched_kind(Path::new("no_extension")));
    }

    #[tokio::test]
    async fn test_schedule_replaces_older_timer() {
        let coalescer = ChangeCoalescer::new(Duration::from_millis(50));
        let first_fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&first_fired);
        let gen_a = coalescer.next_generation();
        let timer_a = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        coalescer.schedule(PathBuf::from("a.html"), gen_a, timer_a);

        let gen_b = coalescer.next_generation();
        let timer_b = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
        });
        coalescer.schedule(PathBuf::from("a.html"), gen_b, timer_b);

        assert_eq!(coalescer.pending_count(), 1);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!first_fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_documents_coalesce_independently() {
        let coalescer = ChangeCoalescer::new(Duration::from_millis(50));
        for name in ["a.html", "b.html", "c.css"] {
            let generation = coalescer.next_generation();
            let timer = tokio::spawn(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
            });
            coalescer.schedule(PathBuf::from(name), generation, timer);
        }
        assert_eq!(coalescer.pending_count(), 3);
        coalescer.flush_all();
        assert_eq!(coalescer.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_flush_all_aborts_timers() {
        let coalescer = ChangeCoalescer::new(Duration::from_millis(40));
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        let generation = coalescer.next_generation();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            flag.store(true, Ordering::SeqCst);
        });
        coalescer.schedule(PathBuf::from("a.html"), generation, timer);
        coalescer.flush_all();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_finished_ignores_stale_generation() {
        let coalescer = ChangeCoalescer::new(Duration::from_millis(50));

        let gen_a = coalescer.next_generation();
        let timer_a = tokio::spawn(async {});
        coalescer.schedule(PathBuf::from("a.html"), gen_a, timer_a);

        let gen_b = coalescer.next_generation();
        let timer_b = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        coalescer.schedule(PathBuf::from("a.html"), gen_b, timer_b);

        // Cleanup from the replaced timer must not evict the live entry.
        coalescer.finished(Path::new("a.html"), gen_a);
        assert_eq!(coalescer.pending_count(), 1);

        coalescer.finished(Path::new("a.html"), gen_b);
        assert_eq!(coalescer.pending_count(), 0);
        coalescer.flush_all();
    }
}

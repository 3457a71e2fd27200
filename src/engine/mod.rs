//! Preview engine: session lifecycle and the change-broadcast pipeline.
//!
//! The engine owns all session state behind one cloneable handle: the
//! lifecycle state machine, the live session (listener plus hub), and the
//! per-document debounce map. Hosts report changes with [`Engine::notify_edit`]
//! and [`Engine::notify_save`] and drive the lifecycle with start, stop,
//! pause, and resume.

mod coalescer;
mod session;
mod state;

pub use coalescer::{watched_kind, DEFAULT_DEBOUNCE_MS};
pub use state::PreviewState;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{PreviewError, Result};
use crate::server::{port, ChangeMessage};
use coalescer::ChangeCoalescer;
use session::PreviewSession;

/// Default preferred port for the preview listener.
pub const DEFAULT_PORT: u16 = 3000;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// First port tried when allocating the listener; taken ports are
    /// skipped by walking upward.
    pub preferred_port: u16,
    /// Quiet window between the last edit to a document and its broadcast.
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preferred_port: DEFAULT_PORT,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Handle to the preview engine. Cheap to clone; every clone shares the
/// same session.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<EngineShared>,
}

struct EngineShared {
    preferred_port: u16,
    inner: Mutex<EngineInner>,
    coalescer: ChangeCoalescer,
}

/// State behind the engine lock. `session` is `Some` exactly while `state`
/// is running.
#[derive(Default)]
struct EngineInner {
    state: PreviewState,
    session: Option<PreviewSession>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                preferred_port: config.preferred_port,
                inner: Mutex::new(EngineInner::default()),
                coalescer: ChangeCoalescer::new(config.debounce),
            }),
        }
    }

    /// Start a session serving `root` and return the listening port.
    ///
    /// Idempotent: when a session is already running (live or paused) this
    /// returns its port without touching the listener.
    pub async fn start(&self, root: impl Into<PathBuf>) -> Result<u16> {
        if let Some(port) = self.port() {
            return Ok(port);
        }

        let root = root.into();
        let port = port::allocate(self.shared.preferred_port).await?;
        let session = PreviewSession::spawn(root, port).await?;

        let mut inner = self.lock_inner()?;
        if let Some(existing) = &inner.session {
            // Lost a start race; keep the first session and fold ours.
            let existing_port = existing.port;
            drop(inner);
            session.teardown().await;
            return Ok(existing_port);
        }
        match inner.state.transition_to(PreviewState::LiveEditing) {
            Ok(()) => {
                inner.session = Some(session);
                drop(inner);
                info!(port, "live preview session started");
                Ok(port)
            }
            Err(err) => {
                drop(inner);
                session.teardown().await;
                Err(err)
            }
        }
    }

    /// Stop the session: cancel pending timers, close every client
    /// connection, release the listener. Safe to call when already stopped.
    pub async fn stop(&self) -> Result<()> {
        // Timers go first so nothing fires into a hub being torn down.
        self.shared.coalescer.flush_all();

        let session = {
            let mut inner = self.lock_inner()?;
            if !inner.state.is_running() {
                return Ok(());
            }
            inner.state.transition_to(PreviewState::Stopped)?;
            inner.session.take()
        };
        if let Some(session) = session {
            session.teardown().await;
        }
        info!("live preview session stopped");
        Ok(())
    }

    /// Suspend broadcasting. Clients stay connected; updates arriving
    /// while paused are dropped, not queued.
    pub fn pause(&self) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.state.transition_to(PreviewState::Paused)?;
        info!("live preview paused");
        Ok(())
    }

    /// Resume broadcasting after a pause.
    pub fn resume(&self) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.state.transition_to(PreviewState::LiveEditing)?;
        info!("live preview resumed");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PreviewState {
        self.shared.inner.lock().map(|i| i.state).unwrap_or_default()
    }

    /// Port of the running session, if any.
    pub fn port(&self) -> Option<u16> {
        self.shared
            .inner
            .lock()
            .ok()?
            .session
            .as_ref()
            .map(|s| s.port)
    }

    /// Record an in-progress edit of `path` with its full current content.
    ///
    /// The broadcast is deferred by the quiet window; further edits to the
    /// same document within the window replace both the timer and the
    /// content snapshot, so only the last edit of a burst is sent. Paths
    /// that are not watched document kinds are ignored.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn notify_edit(&self, path: &Path, content: String) {
        if !watched_kind(path) {
            return;
        }
        let path = path.to_path_buf();
        let key = path.clone();
        let shared = Arc::clone(&self.shared);
        let generation = shared.coalescer.next_generation();
        let window = shared.coalescer.window();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            shared.coalescer.finished(&path, generation);
            shared.send_current(&path, content);
        });
        self.shared.coalescer.schedule(key, generation, timer);
    }

    /// Record a save of `path`; broadcasts immediately, bypassing the
    /// quiet window. A pending edit timer for the same document is left to
    /// fire on its own schedule; full-content updates make the repeat
    /// harmless.
    pub fn notify_save(&self, path: &Path, content: String) {
        if !watched_kind(path) {
            return;
        }
        self.shared.send_current(path, content);
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, EngineInner>> {
        self.shared.inner.lock().map_err(|_| PreviewError::LockPoisoned)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineShared {
    /// Send one full-content update if the session is live right now.
    ///
    /// The gate is evaluated here, at the moment of send. An update
    /// scheduled while live but arriving while paused or stopped is
    /// dropped.
    fn send_current(&self, path: &Path, content: String) {
        let hub = {
            let Ok(inner) = self.inner.lock() else {
                return;
            };
            if !inner.state.may_broadcast() {
                debug!(file = %path.display(), "update suppressed while not live");
                return;
            }
            match &inner.session {
                Some(session) => Arc::clone(&session.hub),
                None => return,
            }
        };
        let message = ChangeMessage::new(path.to_string_lossy(), content);
        let reached = hub.broadcast(&message);
        debug!(file = %message.file, clients = reached, "update broadcast");
    }
}

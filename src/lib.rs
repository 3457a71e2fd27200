//! # live-preview
//!
//! Ultra-lightweight live preview for static HTML and CSS.
//!
//! This crate serves a directory over loopback HTTP, injects a small
//! bootstrap script into every HTML page it serves, and pushes
//! full-content updates to connected browsers over a WebSocket whenever
//! watched documents change. In the browser, CSS is swapped in place and
//! HTML is reconciled into the live DOM, so the page keeps its state
//! instead of reloading.
//!
//! ## Features
//!
//! - **One listener**: static files and the update socket share a port
//! - **Coalesced updates**: a typing burst collapses into one broadcast
//! - **Pausable**: broadcasting can be suspended without dropping clients
//! - **Lightweight**: minimal dependencies, no build step, no disk cache
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use live_preview::{Engine, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> live_preview::Result<()> {
//!     // Initialize logging
//!     live_preview::logging::try_init().ok();
//!
//!     // Start a session serving ./site
//!     let engine = Engine::new(EngineConfig::default());
//!     let port = engine.start("./site").await?;
//!     println!("previewing at http://127.0.0.1:{port}/");
//!
//!     // The host reports changes; the engine coalesces and broadcasts.
//!     engine.notify_save(Path::new("index.html"), "<h1>hello</h1>".to_string());
//!
//!     engine.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod server;
pub mod watch;

// Re-export commonly used types
pub use engine::{
    watched_kind, Engine, EngineConfig, PreviewState, DEFAULT_DEBOUNCE_MS, DEFAULT_PORT,
};
pub use error::{PreviewError, Result};
pub use server::{BroadcastHub, ChangeMessage, BOOTSTRAP_PATH, SOCKET_PATH};
pub use watch::{FileChange, FileWatcher};

//! Error types for live-preview.

use thiserror::Error;

/// Main error type for live-preview operations.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: crate::engine::PreviewState,
        to: crate::engine::PreviewState,
    },

    /// Every loopback port from the preferred one upward is taken.
    #[error("no free loopback port at or above {preferred}")]
    PortsExhausted { preferred: u16 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem watcher error.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for live-preview operations.
pub type Result<T> = std::result::Result<T, PreviewError>;

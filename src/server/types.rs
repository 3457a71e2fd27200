//! Wire types for the update socket.

use serde::{Deserialize, Serialize};

/// A content update pushed to every connected preview client.
///
/// Carries the complete current text of the changed file, never a diff.
/// Applying the same update twice, or a stale update followed by a fresh
/// one, always converges on the fresh content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeMessage {
    /// Path of the changed file, as reported by the host.
    pub file: String,
    /// Full text of the file at the moment of send.
    pub content: String,
}

impl ChangeMessage {
    /// Create a new change message.
    pub fn new(file: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            content: content.into(),
        }
    }

    /// Serialize to the JSON text frame sent over the socket.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

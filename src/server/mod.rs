//! HTTP and WebSocket layer for a preview session.
//!
//! One loopback listener serves three things: the static file tree under
//! the session root (with bootstrap injection into HTML), the embedded
//! bootstrap client script, and the update socket at [`SOCKET_PATH`].

pub mod files;
pub mod hub;
pub mod inject;
pub mod port;
pub mod router;
pub mod socket;
pub mod types;

pub use hub::BroadcastHub;
pub use inject::{inject_bootstrap, BOOTSTRAP_PATH};
pub use router::{build_router, ServerContext, SOCKET_PATH};
pub use types::ChangeMessage;

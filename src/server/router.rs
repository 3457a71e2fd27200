//! Router wiring: static files, bootstrap script, update socket.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::files::serve_path;
use super::hub::BroadcastHub;
use super::inject::BOOTSTRAP_PATH;
use super::socket::socket_handler;

/// URL path of the update socket.
pub const SOCKET_PATH: &str = "/socket";

/// The browser-side patch runtime, embedded at build time and served from
/// memory at the bootstrap path.
const CLIENT_SCRIPT: &str = include_str!("../../assets/preview-client.js");

/// Shared state for one preview session's routes.
#[derive(Clone)]
pub struct ServerContext {
    /// Directory the session serves from.
    pub root: PathBuf,
    /// Port the session listens on. Baked into injected script tags.
    pub port: u16,
    /// Connection set for update fan-out.
    pub hub: Arc<BroadcastHub>,
}

/// Build the router for one preview session.
///
/// A single listener serves all three surfaces: the bootstrap script is
/// answered from memory before any filesystem resolution, the update
/// socket lives at a fixed path, and everything else falls through to the
/// static file tree.
pub fn build_router(ctx: ServerContext) -> Router {
    Router::new()
        .route(&format!("/{BOOTSTRAP_PATH}"), get(bootstrap_script))
        .route(SOCKET_PATH, any(socket_handler))
        .fallback(serve_path)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(ctx)
}

/// Serve the embedded client script. Never cached, never touches disk.
async fn bootstrap_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        CLIENT_SCRIPT,
    )
}

//! Static file resolution and response building.

use std::path::Path;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::warn;

use super::inject::inject_bootstrap;
use super::router::ServerContext;

/// How a served file is handled once its extension is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    /// Read as text and passed through bootstrap injection.
    Html,
    /// Read and returned as text.
    Text(&'static str),
    /// Streamed from disk without buffering.
    Binary(&'static str),
}

/// Classify a request path by file extension (case-insensitive).
pub(crate) fn classify(path: &Path) -> FileKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => FileKind::Html,
        "css" => FileKind::Text("text/css"),
        "js" => FileKind::Text("application/javascript"),
        "json" => FileKind::Text("application/json"),
        "png" => FileKind::Binary("image/png"),
        "jpg" | "jpeg" => FileKind::Binary("image/jpeg"),
        "svg" => FileKind::Binary("image/svg+xml"),
        _ => FileKind::Binary("application/octet-stream"),
    }
}

/// Fallback handler: resolve the request path under the session root.
///
/// An empty path serves `index.html`. The path joins the root as-is; the
/// listener only ever binds loopback, so the served tree is as private as
/// the machine it runs on.
pub async fn serve_path(State(ctx): State<ServerContext>, uri: Uri) -> Response {
    let rel = uri.path().trim_start_matches('/');
    let rel = if rel.is_empty() { "index.html" } else { rel };
    let full = ctx.root.join(rel);

    if tokio::fs::metadata(&full).await.is_err() {
        return not_found(rel);
    }

    match classify(&full) {
        FileKind::Html => match tokio::fs::read_to_string(&full).await {
            Ok(html) => {
                let page = inject_bootstrap(&html, ctx.port);
                (
                    [
                        (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                        (header::CACHE_CONTROL, "no-store"),
                    ],
                    page,
                )
                    .into_response()
            }
            Err(err) => internal_error(rel, &err),
        },
        FileKind::Text(mime) => match tokio::fs::read_to_string(&full).await {
            Ok(text) => (
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "no-store"),
                ],
                text,
            )
                .into_response(),
            Err(err) => internal_error(rel, &err),
        },
        FileKind::Binary(mime) => match tokio::fs::File::open(&full).await {
            Ok(file) => {
                let stream = ReaderStream::new(file);
                (
                    [(header::CONTENT_TYPE, mime)],
                    Body::from_stream(stream),
                )
                    .into_response()
            }
            Err(err) => internal_error(rel, &err),
        },
    }
}

fn not_found(rel: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("File not found: {rel}"),
    )
        .into_response()
}

fn internal_error(rel: &str, err: &std::io::Error) -> Response {
    warn!("failed to read {rel}: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain")],
        "Internal server error",
    )
        .into_response()
}

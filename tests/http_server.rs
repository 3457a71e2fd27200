//! HTTP surface integration tests.
//!
//! These tests drive the session router directly with axum's test
//! utilities; no listener is bound, so the port baked into the context is
//! only ever observed in injected markup.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use live_preview::server::{build_router, BroadcastHub, ServerContext};
use live_preview::BOOTSTRAP_PATH;
use tempfile::TempDir;
use tower::ServiceExt;

/// Port baked into test routers; nothing binds it.
const TEST_PORT: u16 = 3000;

/// Helper to build a session router over a directory.
fn router_for(root: &Path) -> axum::Router {
    build_router(ServerContext {
        root: root.to_path_buf(),
        port: TEST_PORT,
        hub: Arc::new(BroadcastHub::new()),
    })
}

/// Helper to create a GET request.
fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to extract body as string.
async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Helper to read a header as a string, empty when absent.
fn header_str(response: &axum::response::Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// HTML Serving & Injection Tests
// ============================================================================

#[tokio::test]
async fn test_root_serves_index_with_bootstrap() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<html><head></head><body><h1>hi</h1></body></html>",
    )
    .unwrap();

    let response = router_for(dir.path()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_str(&response, header::CONTENT_TYPE).starts_with("text/html"));
    assert_eq!(header_str(&response, header::CACHE_CONTROL), "no-store");

    let body = response_text(response).await;
    assert!(body.contains("<h1>hi</h1>"));
    assert!(body.contains("http://127.0.0.1:3000/__live_preview__.js"));
}

#[tokio::test]
async fn test_html_served_by_name() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("about.htm"), "<body>about</body>").unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/about.htm"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_text(response).await;
    assert!(body.contains("about"));
    assert!(body.contains(BOOTSTRAP_PATH));
}

#[tokio::test]
async fn test_injection_is_not_duplicated() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        format!("<html><head><script src=\"/{BOOTSTRAP_PATH}\"></script></head><body></body></html>"),
    )
    .unwrap();

    let response = router_for(dir.path()).oneshot(get("/")).await.unwrap();

    let body = response_text(response).await;
    assert_eq!(body.matches(BOOTSTRAP_PATH).count(), 1);
}

#[tokio::test]
async fn test_nested_paths_resolve_under_root() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/page.html"), "<body>docs</body>").unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/docs/page.html"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_text(response).await;
    assert!(body.contains("docs"));
    assert!(body.contains(BOOTSTRAP_PATH));
}

// ============================================================================
// Error Response Tests
// ============================================================================

#[tokio::test]
async fn test_missing_file_is_plain_404() {
    let dir = TempDir::new().unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/missing.html"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "text/plain");
    assert_eq!(response_text(response).await, "File not found: missing.html");
}

#[tokio::test]
async fn test_root_without_index_is_404() {
    let dir = TempDir::new().unwrap();

    let response = router_for(dir.path()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_text(response).await, "File not found: index.html");
}

#[tokio::test]
async fn test_unreadable_html_is_500() {
    let dir = TempDir::new().unwrap();
    // A directory with a document name exists but cannot be read as text.
    std::fs::create_dir(dir.path().join("broken.html")).unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/broken.html"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response_text(response).await, "Internal server error");
}

// ============================================================================
// Content Type & Caching Tests
// ============================================================================

#[tokio::test]
async fn test_css_served_as_text_without_injection() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("site.css"), "body { margin: 0 }").unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/site.css"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "text/css");
    assert_eq!(header_str(&response, header::CACHE_CONTROL), "no-store");
    assert_eq!(response_text(response).await, "body { margin: 0 }");
}

#[tokio::test]
async fn test_js_and_json_content_types() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
    std::fs::write(dir.path().join("data.json"), "{\"a\":1}").unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/app.js"))
        .await
        .unwrap();
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/javascript"
    );

    let response = router_for(dir.path())
        .oneshot(get("/data.json"))
        .await
        .unwrap();
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/json"
    );
}

#[tokio::test]
async fn test_binary_files_stream_verbatim() {
    let dir = TempDir::new().unwrap();
    let bytes = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01];
    std::fs::write(dir.path().join("logo.png"), bytes).unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/logo.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/png");
    // Binary responses are not marked no-store; only live documents are.
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), bytes);
}

#[tokio::test]
async fn test_unknown_extension_is_octet_stream() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("blob.bin"), [1u8, 2, 3]).unwrap();

    let response = router_for(dir.path())
        .oneshot(get("/blob.bin"))
        .await
        .unwrap();

    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/octet-stream"
    );
}

// ============================================================================
// Bootstrap Script Route Tests
// ============================================================================

#[tokio::test]
async fn test_bootstrap_script_served_from_memory() {
    // Deliberately empty root: the script must not come from disk.
    let dir = TempDir::new().unwrap();

    let response = router_for(dir.path())
        .oneshot(get(&format!("/{BOOTSTRAP_PATH}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/javascript"
    );
    assert_eq!(header_str(&response, header::CACHE_CONTROL), "no-store");

    let body = response_text(response).await;
    assert!(body.contains("/socket"));
    assert!(body.contains("WebSocket"));
}

#[tokio::test]
async fn test_bootstrap_route_shadows_files_on_disk() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(BOOTSTRAP_PATH), "alert('impostor')").unwrap();

    let response = router_for(dir.path())
        .oneshot(get(&format!("/{BOOTSTRAP_PATH}")))
        .await
        .unwrap();

    let body = response_text(response).await;
    assert!(!body.contains("impostor"));
}

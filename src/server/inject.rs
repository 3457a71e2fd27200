//! Bootstrap script injection for served HTML.

/// URL path (without leading slash) the bootstrap client script is served
/// from. Unusual on purpose so it never collides with a real file.
pub const BOOTSTRAP_PATH: &str = "__live_preview__.js";

/// Script tag referencing the bootstrap client on a given port.
fn bootstrap_tag(port: u16) -> String {
    format!(r#"<script defer src="http://127.0.0.1:{port}/{BOOTSTRAP_PATH}"></script>"#)
}

/// Inject the bootstrap script tag into an HTML document.
///
/// Idempotent: a document that already references the bootstrap script is
/// returned unchanged, so a page served twice (or authored with the tag by
/// hand) never loads the client twice. Insertion prefers the end of
/// `<head>` so the client connects as early as possible, falls back to the
/// end of `<body>`, and appends to fragments that have neither.
pub fn inject_bootstrap(html: &str, port: u16) -> String {
    if html.contains(BOOTSTRAP_PATH) {
        return html.to_string();
    }

    let tag = bootstrap_tag(port);

    let insert_at = html.rfind("</head>").or_else(|| html.rfind("</body>"));
    match insert_at {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push_str(&html[pos..]);
            out
        }
        None => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(html);
            out.push_str(&tag);
            out
        }
    }
}

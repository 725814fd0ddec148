//! Development server with live reload over Server-Sent Events.
//!
//! Serves the build output directory and pushes reload events to connected
//! clients after each successful rebuild. HTML responses get the reload
//! client script injected; while a build is failed, every page request shows
//! the failure instead of stale output.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response, Sse},
    routing::get,
    Router,
};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

use crate::dev::{DevEvent, SharedState};
use crate::error::{CliError, Result};

/// Script served at `/__skiff_reload__.js`; reloads the page when a rebuild
/// completes and logs failures to the console.
const RELOAD_SCRIPT: &str = r#"(function () {
  var source = new EventSource('/__skiff_sse__');
  source.onmessage = function (event) {
    var data = JSON.parse(event.data);
    if (data.type === 'build-completed') {
      window.location.reload();
    } else if (data.type === 'build-failed') {
      console.error('[skiff] build failed for ' + data.target + ':\n' + data.error);
    }
  };
})();
"#;

pub struct DevServer {
    addr: SocketAddr,
    state: SharedState,
}

impl DevServer {
    pub fn new(addr: SocketAddr, state: SharedState) -> Self {
        Self { addr, state }
    }

    /// Bind and serve until the task is dropped.
    pub async fn start(self) -> Result<()> {
        let addr = self.addr;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("failed to bind to {addr}: {e}")))?;

        crate::ui::success(&format!("Development server running at http://{addr}"));

        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }

    fn router(self) -> Router {
        Router::new()
            .route("/__skiff_sse__", get(handle_sse))
            .route("/__skiff_reload__.js", get(handle_reload_script))
            .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
            .fallback(handle_request)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state)
    }
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl tokio_stream::Stream<Item = std::result::Result<axum::response::sse::Event, std::convert::Infallible>>>
{
    use axum::response::sse::Event;

    let (id, rx) = state.register_client();
    tracing::debug!(client = id, "live-reload client connected");
    state.broadcast(&DevEvent::ClientConnected { id }).await;

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));
    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}

async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();

    // A failed pass takes over every page until the next successful build.
    if let Some((target, error)) = state.first_failure() {
        return html_response(failure_page(&target, &error));
    }

    if path == "/" {
        return serve_index(&state).await;
    }

    let Some(relative) = sanitize_path(path) else {
        return (StatusCode::NOT_FOUND, format!("File not found: {path}")).into_response();
    };
    let file_path = state.serve_root().join(relative);
    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let content_type = content_type_for(path);
            if content_type.starts_with("text/html") {
                return html_response(inject_reload_script(&String::from_utf8_lossy(&content)));
            }
            file_response(content, content_type)
        }
        Err(_) => (
            StatusCode::NOT_FOUND,
            format!("File not found: {path}"),
        )
            .into_response(),
    }
}

/// Serve `index.html` from the output root, or synthesize a shell page that
/// loads the first bundle found.
async fn serve_index(state: &SharedState) -> Response {
    let index_path = state.serve_root().join("index.html");
    if let Ok(content) = tokio::fs::read_to_string(&index_path).await {
        return html_response(inject_reload_script(&content));
    }

    let entry = find_entry_bundle(state.serve_root());
    let body = match entry {
        Some(entry) => format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n\
             <script src=\"/{entry}\"></script>\n\
             <script src=\"/__skiff_reload__.js\"></script>\n</body>\n</html>\n"
        ),
        None => "<!DOCTYPE html>\n<html>\n<body>\n<p>No bundle built yet.</p>\n\
                 <script src=\"/__skiff_reload__.js\"></script>\n</body>\n</html>\n"
            .to_string(),
    };
    html_response(body)
}

/// Normalize a request path into a path relative to the serve root. Requests
/// whose components reach for a parent directory are refused, so nothing
/// above the serve root is readable.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    use std::path::Component;

    let mut clean = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(clean)
}

/// First `.js` bundle under the serve root, as a root-relative path.
fn find_entry_bundle(root: &Path) -> Option<String> {
    for entry in walk_sorted(root) {
        let name = entry.strip_prefix(root).ok()?.to_string_lossy().into_owned();
        if name.ends_with(".js") && !name.ends_with(".map") && !name.starts_with("__") {
            return Some(name.replace('\\', "/"));
        }
    }
    None
}

fn walk_sorted(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Add the reload client script just before `</body>`, or append it when the
/// page has no body close tag.
fn inject_reload_script(html: &str) -> String {
    let script_tag = r#"<script src="/__skiff_reload__.js"></script>"#;
    if html.contains(script_tag) {
        return html.to_string();
    }

    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + script_tag.len() + 8);
            out.push_str(&html[..pos]);
            out.push_str("  ");
            out.push_str(script_tag);
            out.push('\n');
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}\n{script_tag}\n"),
    }
}

fn failure_page(target: &str, error: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Build failed</title></head>\n\
         <body style=\"background:#1e1e1e;color:#f48771;font-family:monospace;padding:2em\">\n\
         <h1>Build failed: {target}</h1>\n<pre>{}</pre>\n\
         <script src=\"/__skiff_reload__.js\"></script>\n</body>\n</html>\n",
        html_escape(error)
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn html_response(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn file_response(content: Vec<u8>, content_type: &'static str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(content))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "wasm" => "application/wasm",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

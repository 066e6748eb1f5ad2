//! Request handlers for client assets, hot updates and status.

use crate::host::SharedState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use std::convert::Infallible;
use std::path::Component;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

/// Serve a client build output file from memory.
///
/// Mounted under the client `publicPath`; `asset_path` is relative to the
/// output directory.
pub async fn handle_asset(
    State(state): State<SharedState>,
    Path(asset_path): Path<String>,
) -> Response {
    let relative = std::path::Path::new(&asset_path);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return not_found(&asset_path);
    }

    let file_path = state.output_dir().join(relative);
    match state.client_fs().read(&file_path).await {
        Ok(content) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, determine_content_type(&asset_path)),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            content,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => not_found(&asset_path),
        Err(e) => {
            tracing::error!("Error reading asset {}: {}", file_path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read asset").into_response()
        }
    }
}

/// Relay hot-update events to the browser as Server-Sent Events.
///
/// Each connection gets its own subscription. A client that falls behind
/// skips the events it missed.
pub async fn handle_hot(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Hot-update client connected");

    let stream = BroadcastStream::new(state.subscribe()).filter_map(|event| {
        let event = event.ok()?;
        match Event::default().json_data(&event) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::warn!("Failed to encode hot event: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.heartbeat()).text("heartbeat"))
}

/// Report readiness, dispatch count and slot presence.
pub async fn handle_status(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.status())
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("Asset not found: {}", path),
    )
        .into_response()
}

fn determine_content_type(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

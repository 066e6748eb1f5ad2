//! HTTP host mounting the client middleware next to the status route.

use crate::error::{CliError, Result};
use crate::host::{handle_asset, handle_hot, handle_status, SharedState};
use axum::{routing::get, Router};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Route of the status endpoint.
pub const STATUS_PATH: &str = "/__ssr_dev/status";

/// Routes served by the dev host.
#[derive(Debug, Clone)]
pub struct HostRoutes {
    /// URL prefix of client assets, with leading and trailing `/`
    pub public_path: String,
    /// Route of the hot-update event stream
    pub hmr_path: String,
}

/// Build the axum router.
///
/// - `{public_path}{*path}`: client build output from memory
/// - `{hmr_path}`: hot-update Server-Sent Events
/// - `/__ssr_dev/status`: readiness as JSON
pub fn build_router(routes: &HostRoutes, state: SharedState) -> Router {
    let assets = format!("{}{{*path}}", routes.public_path);

    Router::new()
        .route(&assets, get(handle_asset))
        .route(&routes.hmr_path, get(handle_hot))
        .route(STATUS_PATH, get(handle_status))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`CliError::Server`] if the server stops with an I/O error.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CliError::Server(format!("Server error: {}", e)))
}

/// Bind the dev host address.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
}

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use super::api::{self, AppState, SharedState};
use super::hub::Hub;
use super::ws;
use crate::board::{IdSource, UuidIds};
use crate::config::TaskboardConfig;

/// Build the full application router: read-only API plus the `/ws` endpoint.
pub fn build_router(state: SharedState, dev_mode: bool) -> Router {
    let app = api::api_router()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    if dev_mode {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Shared state for a fresh hub seeded with the configured initial board.
pub fn app_state(config: &TaskboardConfig, ids: &dyn IdSource) -> SharedState {
    let board = config.initial_board(ids);
    Arc::new(AppState {
        hub: Arc::new(Hub::new(board, config.server.broadcast_capacity)),
        keepalive: config.server.keepalive(),
    })
}

/// Serve `router` on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

/// Start the coordination point and run until Ctrl+C.
pub async fn start_server(config: &TaskboardConfig) -> Result<()> {
    config.validate().context("Invalid server configuration")?;

    let state = app_state(config, &UuidIds);
    let app = build_router(state, config.server.dev_mode);

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        dev_mode = config.server.dev_mode,
        columns = config.board.initial_columns.len(),
        "taskboard listening on ws://{}/ws",
        local_addr
    );

    serve(listener, app, shutdown_signal()).await?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            warn!(error = %e, "failed to install Ctrl+C handler; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use super::hub::Hub;
use super::ws::Keepalive;
use crate::errors::SyncError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub hub: Arc<Hub>,
    pub keepalive: Keepalive,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub connected: usize,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    Internal(String),
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/board", get(get_board))
        .route("/api/presence", get(get_presence))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_board(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let board = state.hub.snapshot()?;
    Ok(Json(board))
}

async fn get_presence(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let connected = state.hub.presence()?;
    Ok(Json(PresenceResponse { connected }))
}

// ── Tests ─────────────────────────────────────────────────────────────

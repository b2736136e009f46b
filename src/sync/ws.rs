use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::api::AppState;
use super::hub::{ClientId, Connection};
use super::protocol::ClientMessage;

/// How often to send WebSocket Ping frames.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a Pong response before considering the connection dead.
pub const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct Keepalive {
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
}

impl Default for Keepalive {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
        }
    }
}

// ── WebSocket handler ────────────────────────────────────────────────

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = match state.hub.connect() {
        Ok(connection) => connection,
        Err(e) => {
            warn!(error = %e, "rejecting websocket: hub unavailable");
            return;
        }
    };
    let id = connection.id;
    let (sender, receiver) = socket.split();
    run_socket_loop(sender, receiver, connection, &state).await;
    if let Err(e) = state.hub.disconnect(id) {
        warn!(client = id, error = %e, "failed to deregister client");
    }
}

/// Core WebSocket loop with ping/pong keepalive.
///
/// Sends the connection's initial `boardState`, then combines broadcast
/// forwarding, client `updateBoard` handling, and periodic ping/pong health
/// checking into a single select loop. If no Pong is received within the
/// pong timeout after a Ping is sent, the connection is considered dead and
/// the loop exits.
async fn run_socket_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    connection: Connection,
    state: &AppState,
) {
    let Connection { id, initial, mut rx } = connection;
    if sender.send(Message::Text(initial.into())).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(state.keepalive.ping_interval);
    // The first tick completes immediately; consume it so the first real
    // ping fires after one interval has elapsed.
    ping_interval.tick().await;

    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            // ── Periodic ping ───────────────────────────────────────
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > state.keepalive.pong_timeout {
                    debug!(client = id, "pong timeout");
                    break;
                }
                if sender.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }

            // ── Broadcast forwarding ────────────────────────────────
            result = rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Newer full boards are still queued
                        debug!(client = id, skipped, "subscriber lagged");
                        continue;
                    }
                }
            }

            // ── Client messages ─────────────────────────────────────
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_client_text(id, text.as_str(), state),
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Ignore Binary and Ping (axum answers pings)
                    }
                    Some(Err(e)) => {
                        debug!(client = id, error = %e, "websocket receive error");
                        break;
                    }
                }
            }
        }
    }

    // Best-effort close frame
    let _ = sender.send(Message::Close(None)).await;
}

fn handle_client_text(id: ClientId, text: &str, state: &AppState) {
    match ClientMessage::from_json(text) {
        Ok(ClientMessage::UpdateBoard(board)) => {
            if let Err(e) = state.hub.update(id, board) {
                warn!(client = id, error = %e, "failed to adopt board");
            }
        }
        Err(e) => warn!(client = id, error = %e, "ignoring malformed client message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, SequentialIds};
    use crate::sync::hub::Hub;

    fn state() -> AppState {
        let board = Board::with_columns(&["A"], &SequentialIds::new("c"));
        AppState {
            hub: Arc::new(Hub::new(board, 16)),
            keepalive: Keepalive::default(),
        }
    }

    #[test]
    fn test_keepalive_defaults() {
        // A fresh connection must not be considered dead immediately
        let keepalive = Keepalive::default();
        assert!(keepalive.pong_timeout > keepalive.ping_interval);
        assert_eq!(keepalive.ping_interval, Duration::from_secs(30));
        assert_eq!(keepalive.pong_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_client_update_is_adopted() {
        let state = state();
        let board = Board::with_columns(&["X", "Y"], &SequentialIds::new("n"));
        let json = ClientMessage::UpdateBoard(board.clone()).to_json().unwrap();
        handle_client_text(1, &json, &state);
        assert_eq!(state.hub.snapshot().unwrap(), board);
    }

    #[test]
    fn test_malformed_client_text_is_ignored() {
        let state = state();
        let before = state.hub.snapshot().unwrap();
        handle_client_text(1, "not json", &state);
        handle_client_text(1, r#"{"event":"presence","payload":9}"#, &state);
        assert_eq!(state.hub.snapshot().unwrap(), before);
    }
}

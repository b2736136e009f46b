//! Synchronization channel handles.
//!
//! A [`Connector`] opens a [`Transport`] for one session; the session owns it
//! and closes it when done. Two implementations:
//!
//! - [`WsConnector`]: a WebSocket client to a running `taskboard serve`
//! - [`LocalConnector`]: in-process, subscribed directly to a [`Hub`]

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::hub::{ClientId, Hub};
use super::protocol::{ClientMessage, ServerMessage};
use crate::errors::SyncError;

/// An open, ordered, bidirectional message channel to the coordination point.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, message: &ClientMessage) -> Result<(), SyncError>;

    /// The next message, in order of arrival. `Ok(None)` once the peer has
    /// closed the channel.
    async fn recv(&mut self) -> Result<Option<ServerMessage>, SyncError>;

    async fn close(&mut self) -> Result<(), SyncError>;
}

/// Opens transports. One call per session (or reconnect).
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn open(&self) -> Result<Self::Transport, SyncError>;
}

// ── WebSocket ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn open(&self) -> Result<WsTransport, SyncError> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| SyncError::Transport(format!("connect to {} failed: {}", self.url, e)))?;
        debug!(url = %self.url, "websocket connected");
        Ok(WsTransport { stream })
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, message: &ClientMessage) -> Result<(), SyncError> {
        let json = message.to_json()?;
        self.stream
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<ServerMessage>, SyncError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return ServerMessage::from_json(text.as_str()).map(Some),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Ping/Pong are answered by tungstenite itself
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SyncError::Transport(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SyncError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))
    }
}

// ── In-process ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LocalConnector {
    hub: Arc<Hub>,
}

impl LocalConnector {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Connector for LocalConnector {
    type Transport = LocalTransport;

    async fn open(&self) -> Result<LocalTransport, SyncError> {
        let connection = self.hub.connect()?;
        Ok(LocalTransport {
            hub: Arc::clone(&self.hub),
            id: connection.id,
            initial: Some(connection.initial),
            rx: connection.rx,
            open: true,
        })
    }
}

/// Talks to a [`Hub`] without a network in between. Dropping it disconnects.
pub struct LocalTransport {
    hub: Arc<Hub>,
    id: ClientId,
    initial: Option<String>,
    rx: broadcast::Receiver<String>,
    open: bool,
}

impl LocalTransport {
    pub fn client_id(&self) -> ClientId {
        self.id
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&mut self, message: &ClientMessage) -> Result<(), SyncError> {
        if !self.open {
            return Err(SyncError::Closed);
        }
        let ClientMessage::UpdateBoard(board) = message;
        self.hub.update(self.id, board.clone())
    }

    async fn recv(&mut self) -> Result<Option<ServerMessage>, SyncError> {
        if !self.open {
            return Ok(None);
        }
        if let Some(json) = self.initial.take() {
            return ServerMessage::from_json(&json).map(Some);
        }
        loop {
            match self.rx.recv().await {
                Ok(json) => return ServerMessage::from_json(&json).map(Some),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(client = self.id, skipped, "local transport lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(None),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SyncError> {
        if std::mem::replace(&mut self.open, false) {
            self.hub.disconnect(self.id)?;
        }
        Ok(())
    }
}

impl Drop for LocalTransport {
    fn drop(&mut self) {
        if self.open {
            let _ = self.hub.disconnect(self.id);
        }
    }
}

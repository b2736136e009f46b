//! Client side of the synchronization protocol.
//!
//! A [`Session`] owns the client's [`BoardState`] and the transport it was
//! opened with. It moves through three states:
//!
//! ```text
//!   Disconnected ──open()──> Connecting ──ok──> Synced
//!        ^                       │                │
//!        └──────── failure ──────┘   send/recv    │
//!        └─────────────── failure / close() ──────┘
//! ```
//!
//! Every `boardState` message replaces the local board outright; every local
//! mutation is applied immediately and then sent whole. Nothing is merged,
//! versioned or acknowledged, so the last board the hub relays is the one
//! every client ends up with, and a concurrent edit computed from an older
//! board can be lost.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::protocol::{ClientMessage, ServerMessage};
use super::transport::{Connector, Transport};
use crate::board::{Board, BoardOp, BoardState, Clock, IdSource};
use crate::errors::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Synced,
}

/// What handling one incoming message (or its absence) did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    BoardReplaced,
    PresenceChanged(usize),
    Disconnected,
}

pub struct Session<C: Connector> {
    connector: C,
    transport: Option<C::Transport>,
    status: ConnectionStatus,
    state: BoardState,
    presence: usize,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn Clock>,
}

impl<C: Connector> Session<C> {
    pub fn new(connector: C, ids: Arc<dyn IdSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            connector,
            transport: None,
            status: ConnectionStatus::Disconnected,
            state: BoardState::new(),
            presence: 0,
            ids,
            clock,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn board(&self) -> Option<&Board> {
        self.state.current()
    }

    /// Connected clients as last reported by the hub.
    pub fn presence(&self) -> usize {
        self.presence
    }

    /// Whether a local mutation would be accepted right now.
    pub fn can_mutate(&self) -> bool {
        self.status == ConnectionStatus::Synced && self.state.is_initialized()
    }

    /// Open the channel. Any board held from an earlier connection is
    /// dropped; the hub's next `boardState` becomes the local board.
    pub async fn open(&mut self) -> Result<(), SyncError> {
        if let Some(mut old) = self.transport.take() {
            if let Err(e) = old.close().await {
                debug!(error = %e, "failed to close previous channel");
            }
        }
        self.status = ConnectionStatus::Connecting;
        match self.connector.open().await {
            Ok(transport) => {
                self.transport = Some(transport);
                self.state.clear();
                self.status = ConnectionStatus::Synced;
                info!("session synced, awaiting board");
                Ok(())
            }
            Err(e) => {
                self.status = ConnectionStatus::Disconnected;
                warn!(error = %e, "failed to open synchronization channel");
                Err(e)
            }
        }
    }

    /// Close the channel. The local board stays readable.
    pub async fn close(&mut self) -> Result<(), SyncError> {
        self.status = ConnectionStatus::Disconnected;
        match self.transport.take() {
            Some(mut transport) => transport.close().await,
            None => Ok(()),
        }
    }

    /// Apply `op` to the local board, adopt the result immediately and send
    /// it to the hub.
    ///
    /// Rejected with [`SyncError::NotConnected`] unless synced and with
    /// [`SyncError::Uninitialized`] before the first board arrives. If the
    /// send fails the new board is kept locally, the session becomes
    /// disconnected and the error is returned.
    pub async fn apply(&mut self, op: BoardOp) -> Result<&Board, SyncError> {
        if self.status != ConnectionStatus::Synced {
            return Err(SyncError::NotConnected);
        }
        let next = op.apply(self.state.require()?, self.ids.as_ref(), self.clock.as_ref());
        let message = ClientMessage::UpdateBoard(next.clone());
        self.state.replace(next);
        debug!(op = op.name(), "applied local mutation");

        let sent = match self.transport.as_mut() {
            Some(transport) => transport.send(&message).await,
            None => Err(SyncError::NotConnected),
        };
        if let Err(e) = sent {
            warn!(op = op.name(), error = %e, "send failed, marking session disconnected");
            self.mark_disconnected();
            return Err(e);
        }
        self.state.require()
    }

    /// Apply one incoming message.
    pub fn handle(&mut self, message: ServerMessage) -> SessionEvent {
        match message {
            ServerMessage::BoardState(board) => {
                if let Err(violations) = board.validate() {
                    warn!(violations = violations.len(), "received board violates invariants");
                }
                self.state.replace(board);
                SessionEvent::BoardReplaced
            }
            ServerMessage::Presence(count) => {
                self.presence = count;
                SessionEvent::PresenceChanged(count)
            }
        }
    }

    /// Wait for and handle the next incoming message.
    ///
    /// Returns `None` when there is no open channel. A receive error or the
    /// peer closing the channel yields [`SessionEvent::Disconnected`] once.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let received = self.transport.as_mut()?.recv().await;
        match received {
            Ok(Some(message)) => {
                debug!(event = message.event_name(), "received");
                Some(self.handle(message))
            }
            Ok(None) => {
                info!("synchronization channel closed by peer");
                self.mark_disconnected();
                Some(SessionEvent::Disconnected)
            }
            Err(e) => {
                warn!(error = %e, "receive failed");
                self.mark_disconnected();
                Some(SessionEvent::Disconnected)
            }
        }
    }

    /// Handle messages until a board is held. Returns `false` if the channel
    /// went away first.
    pub async fn wait_for_board(&mut self) -> bool {
        while !self.state.is_initialized() {
            match self.next_event().await {
                Some(SessionEvent::Disconnected) | None => return false,
                Some(_) => {}
            }
        }
        true
    }

    fn mark_disconnected(&mut self) {
        self.transport = None;
        self.status = ConnectionStatus::Disconnected;
    }
}

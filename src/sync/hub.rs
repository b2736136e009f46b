//! The coordination point: one canonical board, relayed to every client.
//!
//! The hub is transport independent. The WebSocket server (`ws.rs`) and the
//! in-process transport (`transport.rs`) both drive it through
//! [`Hub::connect`], [`Hub::update`] and [`Hub::disconnect`].
//!
//! All mutations of the canonical board happen under one mutex and the
//! corresponding broadcast is published before the lock is released, so
//! every subscriber sees adopted boards in the same total order.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::protocol::ServerMessage;
use crate::board::Board;
use crate::errors::SyncError;

/// Identifies one connected client for the lifetime of its connection.
pub type ClientId = u64;

struct Canonical {
    board: Board,
    connected: BTreeSet<ClientId>,
    next_client: ClientId,
}

pub struct Hub {
    inner: Mutex<Canonical>,
    tx: broadcast::Sender<String>,
}

/// A freshly registered client.
///
/// `initial` is the `boardState` message carrying the canonical board at the
/// moment of connection; send it before anything read from `rx`.
pub struct Connection {
    pub id: ClientId,
    pub initial: String,
    pub rx: broadcast::Receiver<String>,
}

impl Hub {
    /// `capacity` bounds how many relayed messages a slow subscriber may fall
    /// behind before it starts skipping the oldest ones. Zero is raised to one.
    pub fn new(board: Board, capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            inner: Mutex::new(Canonical {
                board,
                connected: BTreeSet::new(),
                next_client: 1,
            }),
            tx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Canonical>, SyncError> {
        self.inner.lock().map_err(|_| SyncError::LockPoisoned)
    }

    /// Register a client. Everyone, the new client included, is sent the
    /// updated presence count.
    pub fn connect(&self) -> Result<Connection, SyncError> {
        let mut inner = self.lock()?;
        let id = inner.next_client;
        inner.next_client += 1;
        inner.connected.insert(id);

        let initial = ServerMessage::BoardState(inner.board.clone()).to_json()?;
        let rx = self.tx.subscribe();
        let count = inner.connected.len();
        self.publish(&ServerMessage::Presence(count))?;

        info!(client = id, connected = count, "client connected");
        Ok(Connection { id, initial, rx })
    }

    /// Adopt `board` as canonical and relay it to every client, including
    /// the one that sent it.
    pub fn update(&self, origin: ClientId, board: Board) -> Result<(), SyncError> {
        if let Err(violations) = board.validate() {
            warn!(
                client = origin,
                violations = violations.len(),
                first = %violations[0],
                "adopting board that violates invariants"
            );
        }
        let message = ServerMessage::BoardState(board);
        let json = message.to_json()?;

        let mut inner = self.lock()?;
        if let ServerMessage::BoardState(board) = message {
            inner.board = board;
        }
        let receivers = self.tx.send(json).unwrap_or(0);
        debug!(client = origin, receivers, "board adopted");
        Ok(())
    }

    /// Forget a client and tell the rest. Unknown ids are ignored.
    pub fn disconnect(&self, id: ClientId) -> Result<(), SyncError> {
        let mut inner = self.lock()?;
        if !inner.connected.remove(&id) {
            return Ok(());
        }
        let count = inner.connected.len();
        self.publish(&ServerMessage::Presence(count))?;
        info!(client = id, connected = count, "client disconnected");
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Board, SyncError> {
        Ok(self.lock()?.board.clone())
    }

    pub fn presence(&self) -> Result<usize, SyncError> {
        Ok(self.lock()?.connected.len())
    }

    // Callers hold the lock.
    fn publish(&self, message: &ServerMessage) -> Result<(), SyncError> {
        let json = message.to_json()?;
        // No subscribers is not an error
        let _ = self.tx.send(json);
        Ok(())
    }
}

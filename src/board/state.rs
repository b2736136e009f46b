use super::models::Board;
use crate::errors::SyncError;

/// The board a client currently holds, or nothing before the first
/// `boardState` message of a session.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    current: Option<Board>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Board> {
        self.current.as_ref()
    }

    /// The board, or [`SyncError::Uninitialized`] if none has arrived yet.
    pub fn require(&self) -> Result<&Board, SyncError> {
        self.current.as_ref().ok_or(SyncError::Uninitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Total replacement; nothing from the previous board survives.
    pub fn replace(&mut self, board: Board) {
        self.current = Some(board);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

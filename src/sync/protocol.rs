use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::errors::SyncError;

// ── Message types ────────────────────────────────────────────────────
//
// Every frame is a JSON text frame of the form
// `{"event": "<name>", "payload": <value>}`. Boards always travel whole.

/// Client → coordination point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    UpdateBoard(Board),
}

/// Coordination point → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    BoardState(Board),
    Presence(usize),
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::BoardState(_) => "boardState",
            Self::Presence(_) => "presence",
        }
    }
}

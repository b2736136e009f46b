//! Typed error hierarchy for the task board.
//!
//! Three enums cover the three seams:
//! - `SyncError`: session, transport and coordination-point failures
//! - `ConfigError`: loading and validating `taskboard.toml`
//! - `InvariantViolation`: a board that breaks the structural invariants

use std::path::PathBuf;

use thiserror::Error;

use crate::board::{ColumnId, TaskId};

/// Errors from the synchronization layer (client session, transports, hub).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No board has been received yet")]
    Uninitialized,

    #[error("Not connected to the coordination point")]
    NotConnected,

    #[error("Synchronization channel closed")]
    Closed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to encode or decode message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Board lock poisoned")]
    LockPoisoned,
}

/// Errors from loading the configuration file and environment overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for environment variable {var}")]
    InvalidEnv { var: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A structural invariant of [`Board`](crate::board::Board) that does not hold.
///
/// Always a defect in whatever produced the board; never recovered from at
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Column {0} is listed in columnOrder but missing from columns")]
    UnknownColumnInOrder(ColumnId),

    #[error("Column {0} is missing from columnOrder")]
    ColumnNotOrdered(ColumnId),

    #[error("Column {column} appears {count} times in columnOrder")]
    DuplicateColumnInOrder { column: ColumnId, count: usize },

    #[error("Column {column} references unknown task {task}")]
    UnknownTask { column: ColumnId, task: TaskId },

    #[error("Task {task} is referenced {count} times across columns")]
    TaskReferencedMultipleTimes { task: TaskId, count: usize },

    #[error("Task {0} is not referenced by any column")]
    OrphanTask(TaskId),

    #[error("Column stored under key {key} carries id {id}")]
    ColumnKeyMismatch { key: ColumnId, id: ColumnId },

    #[error("Task stored under key {key} carries id {id}")]
    TaskKeyMismatch { key: TaskId, id: TaskId },
}

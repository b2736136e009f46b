//! Board mutation operations.
//!
//! Every operation borrows the current [`Board`] and returns a new one; the
//! input is never modified. A reference to an id that is not on the board, or a
//! source index past the end of its list, leaves the result equal to the input.
//! Destination indices past the end append.

use tracing::debug;

use super::ids::{Clock, IdSource};
use super::models::{Board, Column, ColumnId, Task, TaskId};

pub const DEFAULT_COLUMN_TITLE: &str = "New Column";
pub const DEFAULT_TASK_TITLE: &str = "New Task";

/// Move the column at `from_index` in `column_order` to `to_index`.
///
/// `to_index` is interpreted against the order with the moved column already
/// removed.
pub fn move_column(board: &Board, from_index: usize, to_index: usize) -> Board {
    let mut next = board.clone();
    if from_index >= next.column_order.len() {
        debug!(from_index, len = next.column_order.len(), "move_column: source index out of range");
        return next;
    }
    let id = next.column_order.remove(from_index);
    let at = to_index.min(next.column_order.len());
    next.column_order.insert(at, id);
    next
}

/// Move the task at `source_index` of `source_column` to `dest_index` of
/// `dest_column`.
///
/// Within one column the destination index applies to the list with the task
/// already removed. Across columns it applies to the destination's list as it
/// was.
pub fn move_task(
    board: &Board,
    source_column: &ColumnId,
    source_index: usize,
    dest_column: &ColumnId,
    dest_index: usize,
) -> Board {
    let mut next = board.clone();
    if !next.columns.contains_key(dest_column) {
        debug!(column = %dest_column, "move_task: unknown destination column");
        return next;
    }
    let Some(source) = next.columns.get_mut(source_column) else {
        debug!(column = %source_column, "move_task: unknown source column");
        return next;
    };
    if source_index >= source.task_ids.len() {
        debug!(column = %source_column, source_index, "move_task: source index out of range");
        return next;
    }
    let task = source.task_ids.remove(source_index);

    if let Some(dest) = next.columns.get_mut(dest_column) {
        let at = dest_index.min(dest.task_ids.len());
        dest.task_ids.insert(at, task);
    }
    next
}

/// Append a new empty column titled [`DEFAULT_COLUMN_TITLE`].
pub fn add_column(board: &Board, ids: &dyn IdSource) -> Board {
    let mut next = board.clone();
    let id = ColumnId::new(ids.next_id());
    next.columns.insert(
        id.clone(),
        Column {
            id: id.clone(),
            title: DEFAULT_COLUMN_TITLE.to_string(),
            task_ids: Vec::new(),
        },
    );
    next.column_order.push(id);
    next
}

/// Append a new task titled [`DEFAULT_TASK_TITLE`] to `column`.
pub fn add_task(board: &Board, column: &ColumnId, ids: &dyn IdSource, clock: &dyn Clock) -> Board {
    let mut next = board.clone();
    let Some(target) = next.columns.get_mut(column) else {
        debug!(column = %column, "add_task: unknown column");
        return next;
    };
    let id = TaskId::new(ids.next_id());
    let now = clock.now();
    target.task_ids.push(id.clone());
    next.tasks.insert(
        id.clone(),
        Task {
            id,
            title: DEFAULT_TASK_TITLE.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        },
    );
    next
}

/// Remove `task` from `column` and from the task map.
///
/// Nothing changes unless `column` actually lists `task`.
pub fn delete_task(board: &Board, column: &ColumnId, task: &TaskId) -> Board {
    let mut next = board.clone();
    let Some(owner) = next.columns.get_mut(column) else {
        debug!(column = %column, "delete_task: unknown column");
        return next;
    };
    let Some(position) = owner.position_of(task) else {
        debug!(column = %column, task = %task, "delete_task: task not in column");
        return next;
    };
    owner.task_ids.remove(position);
    next.tasks.remove(task);
    next
}

/// Remove `column` and every task it lists.
pub fn delete_column(board: &Board, column: &ColumnId) -> Board {
    let mut next = board.clone();
    let Some(removed) = next.columns.remove(column) else {
        debug!(column = %column, "delete_column: unknown column");
        return next;
    };
    for task in &removed.task_ids {
        next.tasks.remove(task);
    }
    next.column_order.retain(|id| id != column);
    next
}

/// Retitle `task` and bump its `updated_at`. `created_at` is untouched.
pub fn update_task_title(board: &Board, task: &TaskId, title: &str, clock: &dyn Clock) -> Board {
    let mut next = board.clone();
    let Some(target) = next.tasks.get_mut(task) else {
        debug!(task = %task, "update_task_title: unknown task");
        return next;
    };
    target.title = title.to_string();
    touch(target, clock);
    next
}

/// Replace the description of `task` and bump its `updated_at`.
pub fn update_task_description(
    board: &Board,
    task: &TaskId,
    description: &str,
    clock: &dyn Clock,
) -> Board {
    let mut next = board.clone();
    let Some(target) = next.tasks.get_mut(task) else {
        debug!(task = %task, "update_task_description: unknown task");
        return next;
    };
    target.description = description.to_string();
    touch(target, clock);
    next
}

/// Retitle `column`. Columns carry no timestamps.
pub fn update_column_title(board: &Board, column: &ColumnId, title: &str) -> Board {
    let mut next = board.clone();
    match next.columns.get_mut(column) {
        Some(target) => target.title = title.to_string(),
        None => debug!(column = %column, "update_column_title: unknown column"),
    }
    next
}

// updated_at never goes backwards, even if the clock does.
fn touch(task: &mut Task, clock: &dyn Clock) {
    task.updated_at = clock.now().max(task.updated_at);
}

// ── Operation descriptors ─────────────────────────────────────────────

/// A mutation together with its parameters.
///
/// Used by [`Session::apply`](crate::sync::Session::apply) to run any
/// operation the same way. Never sent over the wire; only whole boards are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardOp {
    MoveColumn {
        from_index: usize,
        to_index: usize,
    },
    MoveTask {
        source_column: ColumnId,
        source_index: usize,
        dest_column: ColumnId,
        dest_index: usize,
    },
    AddColumn,
    AddTask {
        column: ColumnId,
    },
    DeleteTask {
        column: ColumnId,
        task: TaskId,
    },
    DeleteColumn {
        column: ColumnId,
    },
    UpdateTaskTitle {
        task: TaskId,
        title: String,
    },
    UpdateTaskDescription {
        task: TaskId,
        description: String,
    },
    UpdateColumnTitle {
        column: ColumnId,
        title: String,
    },
}

impl BoardOp {
    pub fn apply(&self, board: &Board, ids: &dyn IdSource, clock: &dyn Clock) -> Board {
        match self {
            Self::MoveColumn {
                from_index,
                to_index,
            } => move_column(board, *from_index, *to_index),
            Self::MoveTask {
                source_column,
                source_index,
                dest_column,
                dest_index,
            } => move_task(board, source_column, *source_index, dest_column, *dest_index),
            Self::AddColumn => add_column(board, ids),
            Self::AddTask { column } => add_task(board, column, ids, clock),
            Self::DeleteTask { column, task } => delete_task(board, column, task),
            Self::DeleteColumn { column } => delete_column(board, column),
            Self::UpdateTaskTitle { task, title } => update_task_title(board, task, title, clock),
            Self::UpdateTaskDescription { task, description } => {
                update_task_description(board, task, description, clock)
            }
            Self::UpdateColumnTitle { column, title } => update_column_title(board, column, title),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveColumn { .. } => "move_column",
            Self::MoveTask { .. } => "move_task",
            Self::AddColumn => "add_column",
            Self::AddTask { .. } => "add_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::DeleteColumn { .. } => "delete_column",
            Self::UpdateTaskTitle { .. } => "update_task_title",
            Self::UpdateTaskDescription { .. } => "update_task_description",
            Self::UpdateColumnTitle { .. } => "update_column_title",
        }
    }
}

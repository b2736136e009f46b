use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::IdSource;

/// Opaque identifier of a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

/// Opaque identifier of a [`Column`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(TaskId);
opaque_id!(ColumnId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub task_ids: Vec<TaskId>,
}

impl Column {
    pub fn position_of(&self, task: &TaskId) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task)
    }
}

/// The full synchronized state: tasks, columns and the column ordering.
///
/// Boards are values. Every mutation produces a new `Board`
/// (see [`ops`](super::ops)) and every message on the wire carries a whole one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub tasks: HashMap<TaskId, Task>,
    pub columns: HashMap<ColumnId, Column>,
    pub column_order: Vec<ColumnId>,
}

impl Board {
    /// Build a board with one empty column per title, in order.
    pub fn with_columns<S: AsRef<str>>(titles: &[S], ids: &dyn IdSource) -> Self {
        let mut board = Self::default();
        for title in titles {
            let id = ColumnId::new(ids.next_id());
            board.columns.insert(
                id.clone(),
                Column {
                    id: id.clone(),
                    title: title.as_ref().to_string(),
                    task_ids: Vec::new(),
                },
            );
            board.column_order.push(id);
        }
        board
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Columns in display order. Ids in `column_order` without a column are skipped.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|id| self.columns.get(id))
    }

    /// The column whose `task_ids` holds `task`, if any.
    pub fn column_of(&self, task: &TaskId) -> Option<&Column> {
        self.columns.values().find(|c| c.task_ids.contains(task))
    }

    /// Sum of `task_ids` lengths across all columns.
    pub fn placed_task_count(&self) -> usize {
        self.columns.values().map(|c| c.task_ids.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ids::SequentialIds;
    use chrono::TimeZone;

    fn sample_task(id: &str) -> Task {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Task {
            id: TaskId::from(id),
            title: "Write docs".to_string(),
            description: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_board_serializes_with_camel_case_fields() {
        let mut board = Board::default();
        let task = sample_task("t1");
        board.tasks.insert(task.id.clone(), task);
        board.columns.insert(
            ColumnId::from("c1"),
            Column {
                id: ColumnId::from("c1"),
                title: "To Do".to_string(),
                task_ids: vec![TaskId::from("t1")],
            },
        );
        board.column_order.push(ColumnId::from("c1"));

        let json: serde_json::Value = serde_json::to_value(&board).unwrap();
        assert_eq!(json["columnOrder"], serde_json::json!(["c1"]));
        assert_eq!(json["columns"]["c1"]["taskIds"], serde_json::json!(["t1"]));
        assert_eq!(json["tasks"]["t1"]["title"], "Write docs");
        assert_eq!(json["tasks"]["t1"]["createdAt"], "2024-01-01T12:00:00Z");
        assert!(json["tasks"]["t1"].get("updatedAt").is_some());
    }

    #[test]
    fn test_board_deserializes_from_client_json() {
        let json = serde_json::json!({
            "tasks": {
                "a": {
                    "id": "a",
                    "title": "New Task",
                    "description": "",
                    "createdAt": "2024-05-01T08:30:00.000Z",
                    "updatedAt": "2024-05-01T08:31:00.000Z"
                }
            },
            "columns": {
                "x": { "id": "x", "title": "Doing", "taskIds": ["a"] }
            },
            "columnOrder": ["x"]
        });
        let board: Board = serde_json::from_value(json).unwrap();
        let task = board.task(&TaskId::from("a")).unwrap();
        assert!(task.updated_at > task.created_at);
        assert_eq!(board.column(&ColumnId::from("x")).unwrap().title, "Doing");
        assert_eq!(board.placed_task_count(), 1);
    }

    #[test]
    fn test_with_columns_preserves_order() {
        let ids = SequentialIds::new("col");
        let board = Board::with_columns(&["To Do", "In Progress", "Done"], &ids);
        let titles: Vec<&str> = board.ordered_columns().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
        assert!(board.tasks.is_empty());
        assert!(board.is_valid());
    }

    #[test]
    fn test_column_of_finds_owner() {
        let mut board = Board::default();
        board.columns.insert(
            ColumnId::from("c1"),
            Column {
                id: ColumnId::from("c1"),
                title: "A".into(),
                task_ids: vec![TaskId::from("t1"), TaskId::from("t2")],
            },
        );
        let owner = board.column_of(&TaskId::from("t2")).unwrap();
        assert_eq!(owner.id, ColumnId::from("c1"));
        assert_eq!(owner.position_of(&TaskId::from("t2")), Some(1));
        assert!(board.column_of(&TaskId::from("t3")).is_none());
    }

    #[test]
    fn test_opaque_id_display() {
        assert_eq!(TaskId::new("abc").to_string(), "abc");
        assert_eq!(ColumnId::from(String::from("xyz")).as_str(), "xyz");
    }
}

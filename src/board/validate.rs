use std::collections::HashMap;

use super::models::{Board, ColumnId, TaskId};
use crate::errors::InvariantViolation;

impl Board {
    /// Check the structural invariants and report every one that fails.
    ///
    /// - `column_order` holds exactly the keys of `columns`, each once
    /// - every referenced task exists and is referenced exactly once
    /// - no task exists without a column referencing it
    /// - map keys match the ids of their values
    pub fn validate(&self) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        let mut order_counts: HashMap<&ColumnId, usize> = HashMap::new();
        for id in &self.column_order {
            *order_counts.entry(id).or_default() += 1;
        }
        for (id, count) in &order_counts {
            if !self.columns.contains_key(*id) {
                violations.push(InvariantViolation::UnknownColumnInOrder((*id).clone()));
            }
            if *count > 1 {
                violations.push(InvariantViolation::DuplicateColumnInOrder {
                    column: (*id).clone(),
                    count: *count,
                });
            }
        }

        let mut task_refs: HashMap<&TaskId, usize> = HashMap::new();
        for (key, column) in &self.columns {
            if key != &column.id {
                violations.push(InvariantViolation::ColumnKeyMismatch {
                    key: key.clone(),
                    id: column.id.clone(),
                });
            }
            if !order_counts.contains_key(key) {
                violations.push(InvariantViolation::ColumnNotOrdered(key.clone()));
            }
            for task in &column.task_ids {
                *task_refs.entry(task).or_default() += 1;
                if !self.tasks.contains_key(task) {
                    violations.push(InvariantViolation::UnknownTask {
                        column: key.clone(),
                        task: task.clone(),
                    });
                }
            }
        }

        for (task, count) in &task_refs {
            if *count > 1 {
                violations.push(InvariantViolation::TaskReferencedMultipleTimes {
                    task: (*task).clone(),
                    count: *count,
                });
            }
        }

        for (key, task) in &self.tasks {
            if key != &task.id {
                violations.push(InvariantViolation::TaskKeyMismatch {
                    key: key.clone(),
                    id: task.id.clone(),
                });
            }
            if !task_refs.contains_key(key) {
                violations.push(InvariantViolation::OrphanTask(key.clone()));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

//! Fully loaded hierarchy shapes consumed by the rollup layer.

use crate::model::{Project, Subtask, Task};

/// One subtask with every task it owns, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskTree {
    pub subtask: Subtask,
    pub tasks: Vec<Task>,
}

/// One project with every subtask (and their tasks) it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    pub project: Project,
    pub subtasks: Vec<SubtaskTree>,
}

impl ProjectTree {
    /// Iterates every task reachable through any subtask.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.subtasks.iter().flat_map(|subtask| subtask.tasks.iter())
    }
}

//! Rollup aggregation over loaded project/subtask trees.
//!
//! # Responsibility
//! - Derive `total_time` and `total_tasks` for subtasks and projects.
//! - Attach fresh rollups to read models returned to callers.
//!
//! # Invariants
//! - Pure functions of the supplied tree; no storage access.
//! - Project `total_tasks` counts tasks, never subtasks.
//! - An entity without tasks yields `{ total_time_ms: 0, total_tasks: 0 }`.
//! - Time sums saturate at `i64::MAX` instead of wrapping.

use crate::model::{Project, ProjectTree, Subtask, SubtaskTree, Task};
use serde::{Deserialize, Serialize};

/// Derived totals over every task reachable from one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    #[serde(rename = "totalTime")]
    pub total_time_ms: i64,
    pub total_tasks: u64,
}

/// Project read model with recomputed rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    #[serde(flatten)]
    pub rollup: Rollup,
}

/// Subtask read model with recomputed rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskSummary {
    #[serde(flatten)]
    pub subtask: Subtask,
    #[serde(flatten)]
    pub rollup: Rollup,
}

/// Aggregates a flat task sequence.
pub fn rollup_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Rollup {
    tasks.into_iter().fold(Rollup::default(), |acc, task| Rollup {
        total_time_ms: acc.total_time_ms.saturating_add(task.total_time_ms),
        total_tasks: acc.total_tasks + 1,
    })
}

pub fn rollup_subtask(tree: &SubtaskTree) -> Rollup {
    rollup_tasks(&tree.tasks)
}

pub fn rollup_project(tree: &ProjectTree) -> Rollup {
    rollup_tasks(tree.tasks())
}

/// Consumes a loaded subtask tree into its summary.
pub fn summarize_subtask(tree: SubtaskTree) -> SubtaskSummary {
    let rollup = rollup_subtask(&tree);
    SubtaskSummary {
        subtask: tree.subtask,
        rollup,
    }
}

/// Consumes a loaded project tree into its summary.
pub fn summarize_project(tree: ProjectTree) -> ProjectSummary {
    let rollup = rollup_project(&tree);
    ProjectSummary {
        project: tree.project,
        rollup,
    }
}

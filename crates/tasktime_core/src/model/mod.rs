//! Tracker domain model.
//!
//! # Responsibility
//! - Define the Project → Subtask → Task records shared by repositories and services.
//! - Own the input normalization rules every write path goes through.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID assigned on insert.
//! - Task time is the only authoritative duration; parent totals are derived.

pub mod project;
pub mod subtask;
pub mod task;
pub mod tree;
pub mod validation;

pub use project::{Project, ProjectId};
pub use subtask::{Subtask, SubtaskId};
pub use task::{Task, TaskId};
pub use tree::{ProjectTree, SubtaskTree};
pub use validation::{EntityDetails, ValidationError, MAX_NAME_CHARS};

use std::fmt::{Display, Formatter};

/// Typed reference to one stored entity, used by not-found and lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Project(ProjectId),
    Subtask(SubtaskId),
    Task(TaskId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project {id}"),
            Self::Subtask(id) => write!(f, "subtask {id}"),
            Self::Task(id) => write!(f, "task {id}"),
        }
    }
}

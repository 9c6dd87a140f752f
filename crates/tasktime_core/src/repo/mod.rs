//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes re-check `EntityDetails::validate()` before SQL.
//! - Update/delete of a missing row returns `RepoError::NotFound`, not a no-op.
//! - Reads reject invalid persisted state instead of masking it.

pub mod error;
pub mod project_repo;
pub mod sqlite;
pub mod subtask_repo;
pub mod task_repo;

pub use error::{RepoError, RepoResult};
pub use project_repo::ProjectRepository;
pub use sqlite::SqliteTrackerRepository;
pub use subtask_repo::SubtaskRepository;
pub use task_repo::TaskRepository;

/// Full storage surface required by the tracker service.
pub trait TrackerRepository: ProjectRepository + SubtaskRepository + TaskRepository {}

impl<T: ProjectRepository + SubtaskRepository + TaskRepository> TrackerRepository for T {}

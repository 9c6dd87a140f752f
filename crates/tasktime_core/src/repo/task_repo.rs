//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - `tasks.total_time` is the only authoritative duration in the store.
//! - Update with `total_time_ms = None` keeps the stored duration untouched.

use crate::model::task::validate_time;
use crate::model::{EntityDetails, EntityRef, SubtaskId, Task, TaskId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite::{query_optional, query_rows, uuid_column, SqliteTrackerRepository};
use rusqlite::{params, Row};
use uuid::Uuid;

pub(crate) const TASK_SELECT_SQL: &str = "SELECT
    id,
    subtask_id,
    name,
    description,
    total_time
FROM tasks";

/// Repository interface for task persistence.
pub trait TaskRepository {
    /// Inserts one task under `subtask_id` and returns the stored row.
    fn create_task(
        &self,
        subtask_id: SubtaskId,
        details: &EntityDetails,
        total_time_ms: i64,
    ) -> RepoResult<Task>;
    /// Replaces name/description and, when provided, the duration.
    fn update_task(
        &self,
        id: TaskId,
        details: &EntityDetails,
        total_time_ms: Option<i64>,
    ) -> RepoResult<Task>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists tasks of one subtask in insertion order.
    fn list_tasks(&self, subtask_id: SubtaskId) -> RepoResult<Vec<Task>>;
}

impl TaskRepository for SqliteTrackerRepository<'_> {
    fn create_task(
        &self,
        subtask_id: SubtaskId,
        details: &EntityDetails,
        total_time_ms: i64,
    ) -> RepoResult<Task> {
        details.validate()?;
        validate_time(total_time_ms)?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (id, subtask_id, name, description, total_time)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                subtask_id.to_string(),
                details.name.as_str(),
                details.description.as_deref(),
                total_time_ms,
            ],
        )?;
        load_required_task(self, id)
    }

    fn update_task(
        &self,
        id: TaskId,
        details: &EntityDetails,
        total_time_ms: Option<i64>,
    ) -> RepoResult<Task> {
        details.validate()?;
        if let Some(value) = total_time_ms {
            validate_time(value)?;
        }

        let changed = self.conn.execute(
            "UPDATE tasks
             SET name = ?2,
                 description = ?3,
                 total_time = COALESCE(?4, total_time)
             WHERE id = ?1;",
            params![
                id.to_string(),
                details.name.as_str(),
                details.description.as_deref(),
                total_time_ms,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Task(id)));
        }
        load_required_task(self, id)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Task(id)));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        query_optional(
            self.conn,
            &format!("{TASK_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
            parse_task_row,
        )
    }

    fn list_tasks(&self, subtask_id: SubtaskId) -> RepoResult<Vec<Task>> {
        query_rows(
            self.conn,
            &format!("{TASK_SELECT_SQL} WHERE subtask_id = ?1 ORDER BY rowid ASC;"),
            [subtask_id.to_string()],
            parse_task_row,
        )
    }
}

fn load_required_task(repo: &SqliteTrackerRepository<'_>, id: TaskId) -> RepoResult<Task> {
    repo.get_task(id)?
        .ok_or(RepoError::NotFound(EntityRef::Task(id)))
}

pub(crate) fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let task = Task {
        id: uuid_column(row, "id")?,
        subtask_id: uuid_column(row, "subtask_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        total_time_ms: row.get("total_time")?,
    };
    task.validate()
        .map_err(|err| RepoError::InvalidData(format!("task {}: {err}", task.id)))?;
    Ok(task)
}

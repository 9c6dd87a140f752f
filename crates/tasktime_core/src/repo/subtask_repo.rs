//! Subtask repository contract and SQLite implementation.
//!
//! # Invariants
//! - The legacy `subtasks.total_time` column is never selected; rollups come
//!   from the owned task rows only.
//! - Listing order is insertion order (`rowid ASC`).

use crate::model::{EntityDetails, EntityRef, ProjectId, Subtask, SubtaskId, SubtaskTree, Task};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite::{query_optional, query_rows, uuid_column, SqliteTrackerRepository};
use crate::repo::task_repo::{parse_task_row, TASK_SELECT_SQL};
use rusqlite::{params, Row};
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) const SUBTASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    name,
    description
FROM subtasks";

/// Repository interface for subtask persistence.
pub trait SubtaskRepository {
    /// Inserts one subtask under `project_id` and returns its generated id.
    fn create_subtask(&self, project_id: ProjectId, details: &EntityDetails)
        -> RepoResult<SubtaskId>;
    /// Replaces name and description.
    fn update_subtask(&self, id: SubtaskId, details: &EntityDetails) -> RepoResult<()>;
    /// Deletes one subtask; owned tasks cascade.
    fn delete_subtask(&self, id: SubtaskId) -> RepoResult<()>;
    /// Loads one subtask record without its tasks.
    fn get_subtask(&self, id: SubtaskId) -> RepoResult<Option<Subtask>>;
    /// Loads one subtask with its tasks.
    fn get_subtask_tree(&self, id: SubtaskId) -> RepoResult<Option<SubtaskTree>>;
    /// Loads every subtask of one project with their tasks.
    fn list_subtask_trees(&self, project_id: ProjectId) -> RepoResult<Vec<SubtaskTree>>;
}

impl SubtaskRepository for SqliteTrackerRepository<'_> {
    fn create_subtask(
        &self,
        project_id: ProjectId,
        details: &EntityDetails,
    ) -> RepoResult<SubtaskId> {
        details.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO subtasks (id, project_id, name, description)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                project_id.to_string(),
                details.name.as_str(),
                details.description.as_deref(),
            ],
        )?;
        Ok(id)
    }

    fn update_subtask(&self, id: SubtaskId, details: &EntityDetails) -> RepoResult<()> {
        details.validate()?;

        let changed = self.conn.execute(
            "UPDATE subtasks
             SET name = ?2,
                 description = ?3
             WHERE id = ?1;",
            params![
                id.to_string(),
                details.name.as_str(),
                details.description.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Subtask(id)));
        }
        Ok(())
    }

    fn delete_subtask(&self, id: SubtaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subtasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Subtask(id)));
        }
        Ok(())
    }

    fn get_subtask(&self, id: SubtaskId) -> RepoResult<Option<Subtask>> {
        query_optional(
            self.conn,
            &format!("{SUBTASK_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
            parse_subtask_row,
        )
    }

    fn get_subtask_tree(&self, id: SubtaskId) -> RepoResult<Option<SubtaskTree>> {
        let Some(subtask) = self.get_subtask(id)? else {
            return Ok(None);
        };
        let tasks = query_rows(
            self.conn,
            &format!("{TASK_SELECT_SQL} WHERE subtask_id = ?1 ORDER BY rowid ASC;"),
            [id.to_string()],
            parse_task_row,
        )?;
        Ok(Some(SubtaskTree { subtask, tasks }))
    }

    fn list_subtask_trees(&self, project_id: ProjectId) -> RepoResult<Vec<SubtaskTree>> {
        let subtasks = query_rows(
            self.conn,
            &format!("{SUBTASK_SELECT_SQL} WHERE project_id = ?1 ORDER BY rowid ASC;"),
            [project_id.to_string()],
            parse_subtask_row,
        )?;
        let tasks = query_rows(
            self.conn,
            "SELECT
                t.id AS id,
                t.subtask_id AS subtask_id,
                t.name AS name,
                t.description AS description,
                t.total_time AS total_time
             FROM tasks t
             INNER JOIN subtasks s ON s.id = t.subtask_id
             WHERE s.project_id = ?1
             ORDER BY t.rowid ASC;",
            [project_id.to_string()],
            parse_task_row,
        )?;
        Ok(assemble_subtask_trees(subtasks, tasks))
    }
}

/// Groups tasks under their subtasks, keeping both input orders.
///
/// Tasks whose subtask is not in `subtasks` are dropped.
pub(crate) fn assemble_subtask_trees(subtasks: Vec<Subtask>, tasks: Vec<Task>) -> Vec<SubtaskTree> {
    let mut tasks_by_subtask: HashMap<SubtaskId, Vec<Task>> = HashMap::new();
    for task in tasks {
        tasks_by_subtask
            .entry(task.subtask_id)
            .or_default()
            .push(task);
    }

    subtasks
        .into_iter()
        .map(|subtask| {
            let tasks = tasks_by_subtask.remove(&subtask.id).unwrap_or_default();
            SubtaskTree { subtask, tasks }
        })
        .collect()
}

pub(crate) fn parse_subtask_row(row: &Row<'_>) -> RepoResult<Subtask> {
    Ok(Subtask {
        id: uuid_column(row, "id")?,
        project_id: uuid_column(row, "project_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}

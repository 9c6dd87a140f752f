//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - `created_at` is assigned by the store default and never updated.
//! - Deleting a project relies on `ON DELETE CASCADE` to remove descendants.
//! - Listing order is insertion order (`rowid ASC`).

use crate::model::{EntityDetails, EntityRef, Project, ProjectId, ProjectTree, SubtaskTree};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite::{query_optional, query_rows, uuid_column, SqliteTrackerRepository};
use crate::repo::subtask_repo::{
    assemble_subtask_trees, parse_subtask_row, SubtaskRepository, SUBTASK_SELECT_SQL,
};
use crate::repo::task_repo::{parse_task_row, TASK_SELECT_SQL};
use rusqlite::{params, Row};
use std::collections::HashMap;
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    created_at
FROM projects";

/// Repository interface for project persistence.
pub trait ProjectRepository {
    /// Inserts one project and returns its generated id.
    fn create_project(&self, details: &EntityDetails) -> RepoResult<ProjectId>;
    /// Replaces name and description.
    fn update_project(&self, id: ProjectId, details: &EntityDetails) -> RepoResult<()>;
    /// Deletes one project; subtasks and tasks cascade.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn project_exists(&self, id: ProjectId) -> RepoResult<bool>;
    /// Loads one project with its full subtask/task tree.
    fn get_project_tree(&self, id: ProjectId) -> RepoResult<Option<ProjectTree>>;
    /// Loads every project with its full subtask/task tree.
    fn list_project_trees(&self) -> RepoResult<Vec<ProjectTree>>;
}

impl ProjectRepository for SqliteTrackerRepository<'_> {
    fn create_project(&self, details: &EntityDetails) -> RepoResult<ProjectId> {
        details.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (id, name, description) VALUES (?1, ?2, ?3);",
            params![
                id.to_string(),
                details.name.as_str(),
                details.description.as_deref(),
            ],
        )?;
        Ok(id)
    }

    fn update_project(&self, id: ProjectId, details: &EntityDetails) -> RepoResult<()> {
        details.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
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
            return Err(RepoError::NotFound(EntityRef::Project(id)));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Project(id)));
        }
        Ok(())
    }

    fn project_exists(&self, id: ProjectId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_project_tree(&self, id: ProjectId) -> RepoResult<Option<ProjectTree>> {
        let Some(project) = query_optional(
            self.conn,
            &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
            parse_project_row,
        )?
        else {
            return Ok(None);
        };
        let subtasks = self.list_subtask_trees(id)?;
        Ok(Some(ProjectTree { project, subtasks }))
    }

    fn list_project_trees(&self) -> RepoResult<Vec<ProjectTree>> {
        let projects = query_rows(
            self.conn,
            &format!("{PROJECT_SELECT_SQL} ORDER BY rowid ASC;"),
            [],
            parse_project_row,
        )?;
        let subtasks = query_rows(
            self.conn,
            &format!("{SUBTASK_SELECT_SQL} ORDER BY rowid ASC;"),
            [],
            parse_subtask_row,
        )?;
        let tasks = query_rows(
            self.conn,
            &format!("{TASK_SELECT_SQL} ORDER BY rowid ASC;"),
            [],
            parse_task_row,
        )?;

        let mut trees_by_project: HashMap<ProjectId, Vec<SubtaskTree>> = HashMap::new();
        for tree in assemble_subtask_trees(subtasks, tasks) {
            trees_by_project
                .entry(tree.subtask.project_id)
                .or_default()
                .push(tree);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let subtasks = trees_by_project.remove(&project.id).unwrap_or_default();
                ProjectTree { project, subtasks }
            })
            .collect())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: uuid_column(row, "id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

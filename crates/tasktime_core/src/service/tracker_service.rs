//! Project/subtask/task use-case service.
//!
//! # Responsibility
//! - Provide the CRUD surface consumed by the presentation boundary.
//! - Attach freshly computed rollups to every project/subtask read.
//! - Report stale views and navigation targets after successful writes.
//!
//! # Invariants
//! - Lenient reads (`list_*`, `get_*`) log store failures and degrade to
//!   empty/absent; their `try_*` twins surface the failure instead.
//! - Writes log failures and return them; nothing is retried.
//! - Write paths on unknown ids fail with `ServiceError::NotFound`.
//! - View refresh runs only after the store write succeeded.

use crate::model::{
    EntityDetails, EntityRef, ProjectId, SubtaskId, Task, TaskId, ValidationError,
};
use crate::repo::{RepoError, TrackerRepository};
use crate::rollup::{summarize_project, summarize_subtask, ProjectSummary, SubtaskSummary};
use crate::service::error::{Operation, ServiceError, ServiceResult};
use crate::service::view_refresh::{NoopViewRefresh, ViewPath, ViewRefresh};
use log::{error, info, warn};
use std::error::Error;

/// Input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Input for replacing a project's name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating a subtask under an existing project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubtaskRequest {
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
}

/// Input for replacing a subtask's name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSubtaskRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating a task under an existing subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub subtask_id: SubtaskId,
    pub name: String,
    pub description: Option<String>,
    /// Milliseconds; `None` stores 0.
    pub total_time_ms: Option<i64>,
}

/// Input for updating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub name: String,
    pub description: Option<String>,
    /// `None` keeps the stored duration; `Some` replaces it.
    pub total_time_ms: Option<i64>,
}

/// Tracker service facade over one repository and one view refresh sink.
pub struct TrackerService<R: TrackerRepository, V: ViewRefresh = NoopViewRefresh> {
    repo: R,
    views: V,
}

impl<R: TrackerRepository> TrackerService<R> {
    /// Creates a service that discards view refresh requests.
    pub fn new(repo: R) -> Self {
        Self::with_view_refresh(repo, NoopViewRefresh)
    }
}

impl<R: TrackerRepository, V: ViewRefresh> TrackerService<R, V> {
    pub fn with_view_refresh(repo: R, views: V) -> Self {
        Self { repo, views }
    }

    pub fn view_refresh(&self) -> &V {
        &self.views
    }

    // Projects

    /// Lists every project with rollups; empty when the store fails.
    pub fn list_projects(&self) -> Vec<ProjectSummary> {
        degrade(Operation::ListProjects, self.try_list_projects()).unwrap_or_default()
    }

    pub fn try_list_projects(&self) -> ServiceResult<Vec<ProjectSummary>> {
        self.repo
            .list_project_trees()
            .map(|trees| trees.into_iter().map(summarize_project).collect())
            .map_err(|err| ServiceError::from_repo(Operation::ListProjects, err))
    }

    /// Loads one project with rollups; absent when missing or the store fails.
    pub fn get_project(&self, id: ProjectId) -> Option<ProjectSummary> {
        degrade(Operation::GetProject, self.try_get_project(id)).flatten()
    }

    pub fn try_get_project(&self, id: ProjectId) -> ServiceResult<Option<ProjectSummary>> {
        self.repo
            .get_project_tree(id)
            .map(|tree| tree.map(summarize_project))
            .map_err(|err| ServiceError::from_repo(Operation::GetProject, err))
    }

    pub fn create_project(&self, request: &CreateProjectRequest) -> ServiceResult<ProjectId> {
        let op = Operation::CreateProject;
        let id = record_write(op, self.insert_project(request))?;
        info!("event={} module=service status=ok project_id={id}", op.event());
        self.views.revalidate(&ViewPath::Overview);
        Ok(id)
    }

    pub fn update_project(
        &self,
        id: ProjectId,
        request: &UpdateProjectRequest,
    ) -> ServiceResult<()> {
        let op = Operation::UpdateProject;
        let result = EntityDetails::new(request.name.as_str(), request.description.clone())
            .map_err(ServiceError::from)
            .and_then(|details| {
                self.repo
                    .update_project(id, &details)
                    .map_err(|err| ServiceError::from_repo(op, err))
            });
        record_write(op, result)?;
        info!("event={} module=service status=ok project_id={id}", op.event());
        self.views.revalidate(&ViewPath::Overview);
        self.views.revalidate(&ViewPath::Project(id));
        Ok(())
    }

    /// Deletes one project with all descendants and redirects to the listing.
    pub fn delete_project(&self, id: ProjectId) -> ServiceResult<()> {
        let op = Operation::DeleteProject;
        let result = self
            .repo
            .delete_project(id)
            .map_err(|err| ServiceError::from_repo(op, err));
        record_write(op, result)?;
        info!("event={} module=service status=ok project_id={id}", op.event());
        self.views.revalidate(&ViewPath::Overview);
        self.views.revalidate(&ViewPath::Project(id));
        self.views.redirect(&ViewPath::Overview);
        Ok(())
    }

    // Subtasks

    /// Lists subtasks of one project with rollups; empty when the store fails.
    pub fn list_subtasks(&self, project_id: ProjectId) -> Vec<SubtaskSummary> {
        degrade(Operation::ListSubtasks, self.try_list_subtasks(project_id)).unwrap_or_default()
    }

    pub fn try_list_subtasks(&self, project_id: ProjectId) -> ServiceResult<Vec<SubtaskSummary>> {
        self.repo
            .list_subtask_trees(project_id)
            .map(|trees| trees.into_iter().map(summarize_subtask).collect())
            .map_err(|err| ServiceError::from_repo(Operation::ListSubtasks, err))
    }

    /// Loads one subtask with rollups; absent when missing or the store fails.
    pub fn get_subtask(&self, id: SubtaskId) -> Option<SubtaskSummary> {
        degrade(Operation::GetSubtask, self.try_get_subtask(id)).flatten()
    }

    pub fn try_get_subtask(&self, id: SubtaskId) -> ServiceResult<Option<SubtaskSummary>> {
        self.repo
            .get_subtask_tree(id)
            .map(|tree| tree.map(summarize_subtask))
            .map_err(|err| ServiceError::from_repo(Operation::GetSubtask, err))
    }

    pub fn create_subtask(&self, request: &CreateSubtaskRequest) -> ServiceResult<SubtaskId> {
        let op = Operation::CreateSubtask;
        let id = record_write(op, self.insert_subtask(request))?;
        info!(
            "event={} module=service status=ok project_id={} subtask_id={id}",
            op.event(),
            request.project_id
        );
        self.views.revalidate(&ViewPath::Project(request.project_id));
        Ok(id)
    }

    /// Replaces name/description and returns the subtask with a fresh rollup.
    pub fn update_subtask(
        &self,
        id: SubtaskId,
        request: &UpdateSubtaskRequest,
    ) -> ServiceResult<SubtaskSummary> {
        let op = Operation::UpdateSubtask;
        let summary = record_write(op, self.rewrite_subtask(id, request))?;
        let project_id = summary.subtask.project_id;
        info!(
            "event={} module=service status=ok project_id={project_id} subtask_id={id}",
            op.event()
        );
        self.views.revalidate(&ViewPath::Project(project_id));
        self.views.revalidate(&ViewPath::Subtask {
            project_id,
            subtask_id: id,
        });
        Ok(summary)
    }

    /// Deletes one subtask with its tasks.
    ///
    /// `project_id` is taken from the caller and only scopes the refresh; it
    /// is not re-derived from the deleted row.
    pub fn delete_subtask(&self, id: SubtaskId, project_id: ProjectId) -> ServiceResult<()> {
        let op = Operation::DeleteSubtask;
        let result = self
            .repo
            .delete_subtask(id)
            .map_err(|err| ServiceError::from_repo(op, err));
        record_write(op, result)?;
        info!(
            "event={} module=service status=ok project_id={project_id} subtask_id={id}",
            op.event()
        );
        self.views.revalidate(&ViewPath::Overview);
        self.views.revalidate(&ViewPath::Project(project_id));
        self.views.redirect(&ViewPath::Project(project_id));
        Ok(())
    }

    // Tasks

    /// Lists tasks of one subtask as stored; empty when the store fails.
    pub fn list_tasks(&self, subtask_id: SubtaskId) -> Vec<Task> {
        degrade(Operation::ListTasks, self.try_list_tasks(subtask_id)).unwrap_or_default()
    }

    pub fn try_list_tasks(&self, subtask_id: SubtaskId) -> ServiceResult<Vec<Task>> {
        self.repo
            .list_tasks(subtask_id)
            .map_err(|err| ServiceError::from_repo(Operation::ListTasks, err))
    }

    pub fn get_task(&self, id: TaskId) -> Option<Task> {
        degrade(Operation::GetTask, self.try_get_task(id)).flatten()
    }

    pub fn try_get_task(&self, id: TaskId) -> ServiceResult<Option<Task>> {
        self.repo
            .get_task(id)
            .map_err(|err| ServiceError::from_repo(Operation::GetTask, err))
    }

    pub fn create_task(&self, request: &CreateTaskRequest) -> ServiceResult<Task> {
        let op = Operation::CreateTask;
        let task = record_write(op, self.insert_task(request))?;
        info!(
            "event={} module=service status=ok subtask_id={} task_id={}",
            op.event(),
            task.subtask_id,
            task.id
        );
        self.refresh_task_views(task.subtask_id);
        Ok(task)
    }

    pub fn update_task(&self, id: TaskId, request: &UpdateTaskRequest) -> ServiceResult<Task> {
        let op = Operation::UpdateTask;
        let result = EntityDetails::new(request.name.as_str(), request.description.clone())
            .map_err(ServiceError::from)
            .and_then(|details| {
                self.repo
                    .update_task(id, &details, request.total_time_ms)
                    .map_err(|err| ServiceError::from_repo(op, err))
            });
        let task = record_write(op, result)?;
        info!(
            "event={} module=service status=ok subtask_id={} task_id={id} time_replaced={}",
            op.event(),
            task.subtask_id,
            request.total_time_ms.is_some()
        );
        self.refresh_task_views(task.subtask_id);
        Ok(task)
    }

    /// Deletes one task; its owners are looked up for the refresh scope.
    pub fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        let op = Operation::DeleteTask;
        let subtask_id = record_write(op, self.remove_task(id))?;
        info!(
            "event={} module=service status=ok subtask_id={subtask_id} task_id={id}",
            op.event()
        );
        self.refresh_task_views(subtask_id);
        Ok(())
    }

    fn insert_project(&self, request: &CreateProjectRequest) -> ServiceResult<ProjectId> {
        let details = EntityDetails::new(request.name.as_str(), request.description.clone())?;
        self.repo
            .create_project(&details)
            .map_err(|err| ServiceError::from_repo(Operation::CreateProject, err))
    }

    fn insert_subtask(&self, request: &CreateSubtaskRequest) -> ServiceResult<SubtaskId> {
        let op = Operation::CreateSubtask;
        let details = EntityDetails::new(request.name.as_str(), request.description.clone())?;
        let unknown_project = ValidationError::UnknownProject(request.project_id);

        let exists = self
            .repo
            .project_exists(request.project_id)
            .map_err(|err| ServiceError::from_repo(op, err))?;
        if !exists {
            return Err(unknown_project.into());
        }

        self.repo
            .create_subtask(request.project_id, &details)
            .map_err(|err| match err {
                RepoError::ForeignKeyViolation => unknown_project.into(),
                other => ServiceError::from_repo(op, other),
            })
    }

    fn rewrite_subtask(
        &self,
        id: SubtaskId,
        request: &UpdateSubtaskRequest,
    ) -> ServiceResult<SubtaskSummary> {
        let op = Operation::UpdateSubtask;
        let details = EntityDetails::new(request.name.as_str(), request.description.clone())?;
        self.repo
            .update_subtask(id, &details)
            .map_err(|err| ServiceError::from_repo(op, err))?;
        self.repo
            .get_subtask_tree(id)
            .map_err(|err| ServiceError::from_repo(op, err))?
            .map(summarize_subtask)
            .ok_or(ServiceError::NotFound(EntityRef::Subtask(id)))
    }

    fn insert_task(&self, request: &CreateTaskRequest) -> ServiceResult<Task> {
        let op = Operation::CreateTask;
        let details = EntityDetails::new(request.name.as_str(), request.description.clone())?;
        let total_time_ms = request.total_time_ms.unwrap_or(0);
        let unknown_subtask = ValidationError::UnknownSubtask(request.subtask_id);

        let parent = self
            .repo
            .get_subtask(request.subtask_id)
            .map_err(|err| ServiceError::from_repo(op, err))?;
        if parent.is_none() {
            return Err(unknown_subtask.into());
        }

        self.repo
            .create_task(request.subtask_id, &details, total_time_ms)
            .map_err(|err| match err {
                RepoError::ForeignKeyViolation => unknown_subtask.into(),
                other => ServiceError::from_repo(op, other),
            })
    }

    fn remove_task(&self, id: TaskId) -> ServiceResult<SubtaskId> {
        let op = Operation::DeleteTask;
        let task = self
            .repo
            .get_task(id)
            .map_err(|err| ServiceError::from_repo(op, err))?
            .ok_or(ServiceError::NotFound(EntityRef::Task(id)))?;
        self.repo
            .delete_task(id)
            .map_err(|err| ServiceError::from_repo(op, err))?;
        Ok(task.subtask_id)
    }

    /// Revalidates every view showing rollups that include `subtask_id`.
    fn refresh_task_views(&self, subtask_id: SubtaskId) {
        self.views.revalidate(&ViewPath::Overview);
        match self.repo.get_subtask(subtask_id) {
            Ok(Some(subtask)) => {
                self.views.revalidate(&ViewPath::Project(subtask.project_id));
                self.views.revalidate(&ViewPath::Subtask {
                    project_id: subtask.project_id,
                    subtask_id,
                });
            }
            Ok(None) => {
                warn!(
                    "event=view_refresh module=service status=skipped reason=subtask_missing subtask_id={subtask_id}"
                );
            }
            Err(err) => {
                warn!(
                    "event=view_refresh module=service status=error subtask_id={subtask_id} error={err}"
                );
            }
        }
    }
}

fn record_write<T>(op: Operation, result: ServiceResult<T>) -> ServiceResult<T> {
    if let Err(err) = &result {
        match err {
            ServiceError::Store { source, .. } => error!(
                "event={} module=service status=error error_code={} error={}",
                op.event(),
                err.code(),
                source
            ),
            _ => warn!(
                "event={} module=service status=rejected error_code={} error={}",
                op.event(),
                err.code(),
                err
            ),
        }
    }
    result
}

fn degrade<T>(op: Operation, result: ServiceResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!(
                "event={} module=service status=degraded error_code={} error={}",
                op.event(),
                err.code(),
                err.source().map_or_else(|| err.to_string(), ToString::to_string)
            );
            None
        }
    }
}

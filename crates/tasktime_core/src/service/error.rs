use crate::model::{EntityRef, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Tracker use-case identifiers, used in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListProjects,
    GetProject,
    CreateProject,
    UpdateProject,
    DeleteProject,
    ListSubtasks,
    GetSubtask,
    CreateSubtask,
    UpdateSubtask,
    DeleteSubtask,
    ListTasks,
    GetTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    /// Stable `event=` value for logs.
    pub fn event(self) -> &'static str {
        match self {
            Self::ListProjects => "project_list",
            Self::GetProject => "project_get",
            Self::CreateProject => "project_create",
            Self::UpdateProject => "project_update",
            Self::DeleteProject => "project_delete",
            Self::ListSubtasks => "subtask_list",
            Self::GetSubtask => "subtask_get",
            Self::CreateSubtask => "subtask_create",
            Self::UpdateSubtask => "subtask_update",
            Self::DeleteSubtask => "subtask_delete",
            Self::ListTasks => "task_list",
            Self::GetTask => "task_get",
            Self::CreateTask => "task_create",
            Self::UpdateTask => "task_update",
            Self::DeleteTask => "task_delete",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::ListProjects => "fetch projects",
            Self::GetProject => "fetch project",
            Self::CreateProject => "create project",
            Self::UpdateProject => "update project",
            Self::DeleteProject => "delete project",
            Self::ListSubtasks => "fetch subtasks",
            Self::GetSubtask => "fetch subtask",
            Self::CreateSubtask => "create subtask",
            Self::UpdateSubtask => "update subtask",
            Self::DeleteSubtask => "delete subtask",
            Self::ListTasks => "fetch tasks",
            Self::GetTask => "fetch task",
            Self::CreateTask => "create task",
            Self::UpdateTask => "update task",
            Self::DeleteTask => "delete task",
        }
    }
}

/// Errors from tracker service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Bad input: blank/oversized name, negative time, or unknown parent.
    Validation(ValidationError),
    /// Target entity does not exist.
    NotFound(EntityRef),
    /// Underlying persistence failure for one operation.
    Store {
        operation: Operation,
        source: RepoError,
    },
}

impl ServiceError {
    /// Classifies a repository failure raised while running `operation`.
    pub(crate) fn from_repo(operation: Operation, err: RepoError) -> Self {
        match err {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(entity) => Self::NotFound(entity),
            other => Self::Store {
                operation,
                source: other,
            },
        }
    }

    /// Stable `error_code=` value for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Store { .. } => "store_failed",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Store { operation, .. } => write!(f, "failed to {}", operation.description()),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Store { source, .. } => Some(source),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

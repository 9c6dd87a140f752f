//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose project/subtask/task CRUD to Dart via FRB as flat envelopes.
//! - Carry view refresh targets back so the host can revalidate and navigate.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids cross the boundary as UUID strings; times as raw integer milliseconds.
//!   Display formatting is left to the host (`format_duration_label`).
//! - Failures become `ok = false` (or an empty list) with a diagnostic message.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use tasktime_core::db::open_db;
use tasktime_core::{
    core_version as core_version_inner, format_duration, from_hours_minutes,
    init_logging as init_logging_inner, ping as ping_inner, split_hours_minutes,
    CreateProjectRequest, CreateSubtaskRequest, CreateTaskRequest, DurationError,
    ProjectSummary, RecordingViewRefresh, ServiceResult, SqliteTrackerRepository,
    SubtaskSummary, Task, TrackerService, UpdateProjectRequest, UpdateSubtaskRequest,
    UpdateTaskRequest,
};
use uuid::Uuid;

const DB_FILE_NAME: &str = "tasktime.sqlite3";
const DB_PATH_ENV: &str = "TASKTIME_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type FfiService<'a> = TrackerService<SqliteTrackerRepository<'a>, &'a RecordingViewRefresh>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Renders milliseconds as `1h 30m`-style text.
#[flutter_rust_bridge::frb(sync)]
pub fn format_duration_label(total_time_ms: i64) -> String {
    format_duration(total_time_ms)
}

/// Project row with rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
    pub total_time_ms: i64,
    pub total_tasks: u64,
}

/// Subtask row with rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskItem {
    pub subtask_id: String,
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_time_ms: i64,
    pub total_tasks: u64,
}

/// Task row with its duration split for edit forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub subtask_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_time_ms: i64,
    /// Whole hours of `total_time_ms`.
    pub hours: u64,
    /// Remaining minutes, rounded to the nearest minute.
    pub minutes: u32,
}

/// Project listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListResponse {
    /// Projects in creation order (empty on failure).
    pub items: Vec<ProjectItem>,
    pub message: String,
}

/// Project detail envelope: one project plus its subtasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetailResponse {
    pub ok: bool,
    pub project: Option<ProjectItem>,
    pub subtasks: Vec<SubtaskItem>,
    pub message: String,
}

/// Subtask listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskListResponse {
    pub items: Vec<SubtaskItem>,
    pub message: String,
}

/// Subtask detail envelope: one subtask plus its tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskDetailResponse {
    pub ok: bool,
    pub subtask: Option<SubtaskItem>,
    pub tasks: Vec<TaskItem>,
    pub message: String,
}

/// Task listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Generic mutation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created, updated or deleted entity.
    pub entity_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Route paths whose cached render is stale.
    pub revalidated_paths: Vec<String>,
    /// Route the host should navigate to, if any.
    pub redirect_to: Option<String>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, entity_id: Uuid, refresh: Refresh) -> Self {
        Self {
            ok: true,
            entity_id: Some(entity_id.to_string()),
            message: message.into(),
            revalidated_paths: refresh.revalidated_paths,
            redirect_to: refresh.redirect_to,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entity_id: None,
            message: message.into(),
            revalidated_paths: Vec::new(),
            redirect_to: None,
        }
    }
}

/// Subtask mutation envelope carrying the freshly recomputed rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskActionResponse {
    pub ok: bool,
    pub subtask: Option<SubtaskItem>,
    pub message: String,
    pub revalidated_paths: Vec<String>,
}

impl SubtaskActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            subtask: None,
            message: message.into(),
            revalidated_paths: Vec::new(),
        }
    }
}

/// Task mutation envelope carrying the stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task: Option<TaskItem>,
    pub message: String,
    pub revalidated_paths: Vec<String>,
}

impl TaskActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
            revalidated_paths: Vec::new(),
        }
    }
}

/// View refresh collected from one service call.
#[derive(Debug, Default)]
struct Refresh {
    revalidated_paths: Vec<String>,
    redirect_to: Option<String>,
}

impl Refresh {
    fn from_recorder(views: &RecordingViewRefresh) -> Self {
        Self {
            revalidated_paths: views
                .revalidated()
                .iter()
                .map(ToString::to_string)
                .collect(),
            redirect_to: views.redirect_target().map(|path| path.to_string()),
        }
    }
}

// Projects

/// Lists every project with rollups.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; store failures yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn list_projects() -> ProjectListResponse {
    match with_tracker_service(|service| service.list_projects()) {
        Ok((projects, _)) => {
            let items = projects.into_iter().map(to_project_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No projects.".to_string()
            } else {
                format!("Found {} project(s).", items.len())
            };
            ProjectListResponse { items, message }
        }
        Err(err) => ProjectListResponse {
            items: Vec::new(),
            message: format!("list_projects failed: {err}"),
        },
    }
}

/// Loads one project with its subtasks.
#[flutter_rust_bridge::frb(sync)]
pub fn get_project(project_id: String) -> ProjectDetailResponse {
    let failure = |message: String| ProjectDetailResponse {
        ok: false,
        project: None,
        subtasks: Vec::new(),
        message,
    };
    let id = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(err) => return failure(format!("get_project failed: {err}")),
    };

    match with_tracker_service(|service| (service.get_project(id), service.list_subtasks(id))) {
        Ok(((Some(project), subtasks), _)) => ProjectDetailResponse {
            ok: true,
            project: Some(to_project_item(project)),
            subtasks: subtasks.into_iter().map(to_subtask_item).collect(),
            message: "Project loaded.".to_string(),
        },
        Ok(((None, _), _)) => failure(format!("project {id} not found")),
        Err(err) => failure(format!("get_project failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn create_project(name: String, description: Option<String>) -> ActionResponse {
    let request = CreateProjectRequest { name, description };
    run_action("create_project", "Project created.", |service| {
        service.create_project(&request)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn update_project(
    project_id: String,
    name: String,
    description: Option<String>,
) -> ActionResponse {
    let id = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("update_project failed: {err}")),
    };
    let request = UpdateProjectRequest { name, description };
    run_action("update_project", "Project updated.", |service| {
        service.update_project(id, &request).map(|()| id)
    })
}

/// Deletes one project with all of its subtasks and tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_project(project_id: String) -> ActionResponse {
    let id = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("delete_project failed: {err}")),
    };
    run_action("delete_project", "Project deleted.", |service| {
        service.delete_project(id).map(|()| id)
    })
}

// Subtasks

#[flutter_rust_bridge::frb(sync)]
pub fn list_subtasks(project_id: String) -> SubtaskListResponse {
    let id = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(err) => {
            return SubtaskListResponse {
                items: Vec::new(),
                message: format!("list_subtasks failed: {err}"),
            }
        }
    };
    match with_tracker_service(|service| service.list_subtasks(id)) {
        Ok((subtasks, _)) => {
            let items = subtasks.into_iter().map(to_subtask_item).collect::<Vec<_>>();
            let message = format!("Found {} subtask(s).", items.len());
            SubtaskListResponse { items, message }
        }
        Err(err) => SubtaskListResponse {
            items: Vec::new(),
            message: format!("list_subtasks failed: {err}"),
        },
    }
}

/// Loads one subtask with its tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn get_subtask(subtask_id: String) -> SubtaskDetailResponse {
    let failure = |message: String| SubtaskDetailResponse {
        ok: false,
        subtask: None,
        tasks: Vec::new(),
        message,
    };
    let id = match parse_id(&subtask_id, "subtask_id") {
        Ok(id) => id,
        Err(err) => return failure(format!("get_subtask failed: {err}")),
    };

    match with_tracker_service(|service| (service.get_subtask(id), service.list_tasks(id))) {
        Ok(((Some(subtask), tasks), _)) => SubtaskDetailResponse {
            ok: true,
            subtask: Some(to_subtask_item(subtask)),
            tasks: tasks.into_iter().map(to_task_item).collect(),
            message: "Subtask loaded.".to_string(),
        },
        Ok(((None, _), _)) => failure(format!("subtask {id} not found")),
        Err(err) => failure(format!("get_subtask failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn create_subtask(
    project_id: String,
    name: String,
    description: Option<String>,
) -> ActionResponse {
    let project_id = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("create_subtask failed: {err}")),
    };
    let request = CreateSubtaskRequest {
        project_id,
        name,
        description,
    };
    run_action("create_subtask", "Subtask created.", |service| {
        service.create_subtask(&request)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn update_subtask(
    subtask_id: String,
    name: String,
    description: Option<String>,
) -> SubtaskActionResponse {
    let id = match parse_id(&subtask_id, "subtask_id") {
        Ok(id) => id,
        Err(err) => {
            return SubtaskActionResponse::failure(format!("update_subtask failed: {err}"))
        }
    };
    let request = UpdateSubtaskRequest { name, description };
    match with_tracker_service(|service| service.update_subtask(id, &request)) {
        Ok((Ok(summary), refresh)) => SubtaskActionResponse {
            ok: true,
            subtask: Some(to_subtask_item(summary)),
            message: "Subtask updated.".to_string(),
            revalidated_paths: refresh.revalidated_paths,
        },
        Ok((Err(err), _)) => SubtaskActionResponse::failure(format!("update_subtask failed: {err}")),
        Err(err) => SubtaskActionResponse::failure(format!("update_subtask failed: {err}")),
    }
}

/// Deletes one subtask with its tasks and redirects to the owning project.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_subtask(subtask_id: String, project_id: String) -> ActionResponse {
    let ids = parse_id(&subtask_id, "subtask_id")
        .and_then(|subtask| Ok((subtask, parse_id(&project_id, "project_id")?)));
    let (id, project_id) = match ids {
        Ok(ids) => ids,
        Err(err) => return ActionResponse::failure(format!("delete_subtask failed: {err}")),
    };
    run_action("delete_subtask", "Subtask deleted.", |service| {
        service.delete_subtask(id, project_id).map(|()| id)
    })
}

// Tasks

#[flutter_rust_bridge::frb(sync)]
pub fn list_tasks(subtask_id: String) -> TaskListResponse {
    let id = match parse_id(&subtask_id, "subtask_id") {
        Ok(id) => id,
        Err(err) => {
            return TaskListResponse {
                items: Vec::new(),
                message: format!("list_tasks failed: {err}"),
            }
        }
    };
    match with_tracker_service(|service| service.list_tasks(id)) {
        Ok((tasks, _)) => {
            let items = tasks.into_iter().map(to_task_item).collect::<Vec<_>>();
            let message = format!("Found {} task(s).", items.len());
            TaskListResponse { items, message }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("list_tasks failed: {err}"),
        },
    }
}

/// Creates a task from an hours/minutes entry form.
///
/// Input semantics:
/// - Both `hours` and `minutes` absent stores a duration of 0.
/// - `minutes` must be within `0..=59`.
#[flutter_rust_bridge::frb(sync)]
pub fn create_task(
    subtask_id: String,
    name: String,
    description: Option<String>,
    hours: Option<u64>,
    minutes: Option<u32>,
) -> TaskActionResponse {
    let prepared = parse_id(&subtask_id, "subtask_id").and_then(|subtask_id| {
        let total_time_ms = entry_time_ms(hours, minutes).map_err(|err| err.to_string())?;
        Ok(CreateTaskRequest {
            subtask_id,
            name,
            description,
            total_time_ms,
        })
    });
    let request = match prepared {
        Ok(request) => request,
        Err(err) => return TaskActionResponse::failure(format!("create_task failed: {err}")),
    };
    run_task_action("create_task", "Task created.", |service| {
        service.create_task(&request)
    })
}

/// Updates a task; absent `hours` and `minutes` keep the stored duration.
#[flutter_rust_bridge::frb(sync)]
pub fn update_task(
    task_id: String,
    name: String,
    description: Option<String>,
    hours: Option<u64>,
    minutes: Option<u32>,
) -> TaskActionResponse {
    let prepared = parse_id(&task_id, "task_id").and_then(|id| {
        let total_time_ms = entry_time_ms(hours, minutes).map_err(|err| err.to_string())?;
        Ok((
            id,
            UpdateTaskRequest {
                name,
                description,
                total_time_ms,
            },
        ))
    });
    let (id, request) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => return TaskActionResponse::failure(format!("update_task failed: {err}")),
    };
    run_task_action("update_task", "Task updated.", |service| {
        service.update_task(id, &request)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn delete_task(task_id: String) -> ActionResponse {
    let id = match parse_id(&task_id, "task_id") {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("delete_task failed: {err}")),
    };
    run_action("delete_task", "Task deleted.", |service| {
        service.delete_task(id).map(|()| id)
    })
}

fn run_action(
    label: &str,
    success_message: &str,
    f: impl FnOnce(&FfiService<'_>) -> ServiceResult<Uuid>,
) -> ActionResponse {
    match with_tracker_service(f) {
        Ok((Ok(id), refresh)) => ActionResponse::success(success_message, id, refresh),
        Ok((Err(err), _)) => ActionResponse::failure(format!("{label} failed: {err}")),
        Err(err) => ActionResponse::failure(format!("{label} failed: {err}")),
    }
}

fn run_task_action(
    label: &str,
    success_message: &str,
    f: impl FnOnce(&FfiService<'_>) -> ServiceResult<Task>,
) -> TaskActionResponse {
    match with_tracker_service(f) {
        Ok((Ok(task), refresh)) => TaskActionResponse {
            ok: true,
            task: Some(to_task_item(task)),
            message: success_message.to_string(),
            revalidated_paths: refresh.revalidated_paths,
        },
        Ok((Err(err), _)) => TaskActionResponse::failure(format!("{label} failed: {err}")),
        Err(err) => TaskActionResponse::failure(format!("{label} failed: {err}")),
    }
}

fn with_tracker_service<T>(
    f: impl FnOnce(&FfiService<'_>) -> T,
) -> Result<(T, Refresh), String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("tracker DB open failed: {err}"))?;
    let repo = SqliteTrackerRepository::try_new(&conn)
        .map_err(|err| format!("tracker repo init failed: {err}"))?;
    let views = RecordingViewRefresh::new();
    let value = f(&TrackerService::with_view_refresh(repo, &views));
    Ok((value, Refresh::from_recorder(&views)))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn parse_id(raw: &str, field: &'static str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!("event=ffi_input module=ffi status=rejected error_code=invalid_id field={field}");
        format!("invalid {field} `{raw}`")
    })
}

/// `None` when neither part was entered.
fn entry_time_ms(hours: Option<u64>, minutes: Option<u32>) -> Result<Option<i64>, DurationError> {
    if hours.is_none() && minutes.is_none() {
        return Ok(None);
    }
    from_hours_minutes(hours.unwrap_or(0), minutes.unwrap_or(0)).map(Some)
}

fn to_project_item(summary: ProjectSummary) -> ProjectItem {
    let ProjectSummary { project, rollup } = summary;
    ProjectItem {
        project_id: project.id.to_string(),
        name: project.name,
        description: project.description,
        created_at_ms: project.created_at,
        total_time_ms: rollup.total_time_ms,
        total_tasks: rollup.total_tasks,
    }
}

fn to_subtask_item(summary: SubtaskSummary) -> SubtaskItem {
    let SubtaskSummary { subtask, rollup } = summary;
    SubtaskItem {
        subtask_id: subtask.id.to_string(),
        project_id: subtask.project_id.to_string(),
        name: subtask.name,
        description: subtask.description,
        total_time_ms: rollup.total_time_ms,
        total_tasks: rollup.total_tasks,
    }
}

fn to_task_item(task: Task) -> TaskItem {
    let split = split_hours_minutes(task.total_time_ms);
    TaskItem {
        task_id: task.id.to_string(),
        subtask_id: task.subtask_id.to_string(),
        name: task.name,
        description: task.description,
        total_time_ms: task.total_time_ms,
        hours: split.hours,
        minutes: split.minutes,
    }
}

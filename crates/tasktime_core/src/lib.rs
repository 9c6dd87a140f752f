//! Core domain logic for the project time tracker.
//! This crate is the single source of truth for tracker invariants.

pub mod db;
pub mod duration;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rollup;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use duration::{format_duration, from_hours_minutes, split_hours_minutes, DurationError};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::{
    EntityDetails, EntityRef, Project, ProjectId, ProjectTree, Subtask, SubtaskId, SubtaskTree,
    Task, TaskId, ValidationError,
};
pub use repo::{RepoError, RepoResult, SqliteTrackerRepository, TrackerRepository};
pub use rollup::{ProjectSummary, Rollup, SubtaskSummary};
pub use service::error::{Operation, ServiceError, ServiceResult};
pub use service::tracker_service::{
    CreateProjectRequest, CreateSubtaskRequest, CreateTaskRequest, TrackerService,
    UpdateProjectRequest, UpdateSubtaskRequest, UpdateTaskRequest,
};
pub use service::view_refresh::{
    NoopViewRefresh, RecordingViewRefresh, ViewEvent, ViewPath, ViewRefresh,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable subtask identifier.
pub type SubtaskId = Uuid;

/// Mid-level grouping inside one project.
///
/// The legacy `subtasks.total_time` column is not mapped. Subtask time is
/// only exposed through a freshly computed [`crate::rollup::Rollup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: SubtaskId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
}

use crate::model::subtask::SubtaskId;
use crate::model::validation::{validate_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Leaf unit carrying a manually entered duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub subtask_id: SubtaskId,
    pub name: String,
    pub description: Option<String>,
    /// Milliseconds, never negative.
    #[serde(rename = "totalTime")]
    pub total_time_ms: i64,
}

impl Task {
    /// Checks the invariants a persisted task must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_time(self.total_time_ms)
    }
}

/// Rejects negative durations.
pub fn validate_time(total_time_ms: i64) -> Result<(), ValidationError> {
    if total_time_ms < 0 {
        return Err(ValidationError::NegativeTime(total_time_ms));
    }
    Ok(())
}

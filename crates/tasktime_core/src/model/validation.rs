//! Input normalization and validation shared by every entity.
//!
//! # Invariants
//! - Names are trimmed, non-empty and at most [`MAX_NAME_CHARS`] characters.
//! - Blank descriptions are stored as absent.

use crate::model::{ProjectId, SubtaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for entity names, counted in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Rejected input for a tracker write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is blank after trim.
    EmptyName,
    /// Name exceeds [`MAX_NAME_CHARS`].
    NameTooLong { chars: usize },
    /// Task duration is negative.
    NegativeTime(i64),
    /// Parent project does not exist.
    UnknownProject(ProjectId),
    /// Parent subtask does not exist.
    UnknownSubtask(SubtaskId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::NameTooLong { chars } => write!(
                f,
                "name must be at most {MAX_NAME_CHARS} characters, got {chars}"
            ),
            Self::NegativeTime(value) => {
                write!(f, "total_time must be non-negative milliseconds, got {value}")
            }
            Self::UnknownProject(id) => write!(f, "project does not exist: {id}"),
            Self::UnknownSubtask(id) => write!(f, "subtask does not exist: {id}"),
        }
    }
}

impl Error for ValidationError {}

/// Normalized name/description pair carried by every create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetails {
    pub name: String,
    pub description: Option<String>,
}

impl EntityDetails {
    /// Normalizes raw user input.
    ///
    /// # Errors
    /// - [`ValidationError::EmptyName`] when `name` is blank.
    /// - [`ValidationError::NameTooLong`] when `name` exceeds the limit after trim.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let name = name.trim().to_string();
        validate_name(&name)?;
        Ok(Self {
            name,
            description: normalize_description(description),
        })
    }

    /// Re-checks invariants on a value that may have been built field by field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong { chars });
    }
    Ok(())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{EntityDetails, ValidationError, MAX_NAME_CHARS};

    #[test]
    fn details_trim_name_and_drop_blank_description() {
        let details = EntityDetails::new("  Write report ", Some("   ".to_string())).unwrap();
        assert_eq!(details.name, "Write report");
        assert_eq!(details.description, None);
    }

    #[test]
    fn details_reject_blank_name() {
        let err = EntityDetails::new(" \t ", None).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn name_limit_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_NAME_CHARS);
        assert!(EntityDetails::new(at_limit, None).is_ok());

        let over = "a".repeat(MAX_NAME_CHARS + 1);
        let err = EntityDetails::new(over, None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NameTooLong {
                chars: MAX_NAME_CHARS + 1
            }
        );
    }
}

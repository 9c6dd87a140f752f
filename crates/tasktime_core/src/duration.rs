//! Hours/minutes conversions for manually entered task durations.
//!
//! Durations are stored as integer milliseconds; the hour/minute split only
//! exists for entry forms and display.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Rejected hour/minute entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationError {
    /// Minutes must be within `0..=59`.
    MinutesOutOfRange(u32),
    /// Result does not fit in `i64` milliseconds.
    Overflow,
}

impl Display for DurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinutesOutOfRange(minutes) => {
                write!(f, "minutes must be between 0 and 59, got {minutes}")
            }
            Self::Overflow => write!(f, "duration does not fit in milliseconds"),
        }
    }
}

impl Error for DurationError {}

/// Whole hours and minutes of one duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursMinutes {
    pub hours: u64,
    pub minutes: u32,
}

/// Converts an entry-form pair to milliseconds.
pub fn from_hours_minutes(hours: u64, minutes: u32) -> Result<i64, DurationError> {
    if minutes > 59 {
        return Err(DurationError::MinutesOutOfRange(minutes));
    }
    let hours = i64::try_from(hours).map_err(|_| DurationError::Overflow)?;
    hours
        .checked_mul(MS_PER_HOUR)
        .and_then(|ms| ms.checked_add(i64::from(minutes) * MS_PER_MINUTE))
        .ok_or(DurationError::Overflow)
}

/// Splits milliseconds into hours and minutes, rounding to the nearest minute.
///
/// Negative input is treated as zero.
pub fn split_hours_minutes(total_time_ms: i64) -> HoursMinutes {
    let ms = total_time_ms.max(0) as u64;
    let minutes_total = ms / MS_PER_MINUTE as u64 + u64::from(ms % MS_PER_MINUTE as u64 >= 30_000);
    HoursMinutes {
        hours: minutes_total / 60,
        minutes: (minutes_total % 60) as u32,
    }
}

/// Renders a duration as `1h 30m`, `2h`, `45m` or `0m`.
pub fn format_duration(total_time_ms: i64) -> String {
    let HoursMinutes { hours, minutes } = split_hours_minutes(total_time_ms);
    match (hours, minutes) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}m"),
    }
}

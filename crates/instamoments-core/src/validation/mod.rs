//! Argument validation shared by the evaluators
//!
//! Invalid input is rejected before anything is computed; values are never clamped.

use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Reject a negative usage count. Any non-negative count is valid.
pub fn validate_count(name: &str, value: i64) -> Result<u64, AppError> {
    u64::try_from(value).map_err(|_| {
        AppError::InvalidArgument(format!("{} must not be negative (got {})", name, value))
    })
}

/// Reject a negative hour window.
pub fn validate_hours(name: &str, hours: i64) -> Result<i64, AppError> {
    if hours < 0 {
        return Err(AppError::InvalidArgument(format!(
            "{} must not be negative (got {})",
            name, hours
        )));
    }
    Ok(hours)
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(name: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            AppError::InvalidArgument(format!("{} is not a valid RFC 3339 timestamp: {}", name, e))
        })
}

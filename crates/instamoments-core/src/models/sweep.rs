use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::event::{EventExpiration, EventRecord};

/// Collaborator call made by the expiration sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOperation {
    LoadEvent,
    MarkExpired,
    PurgeMedia,
    DeleteMediaRecords,
    MarkArchived,
}

impl Display for SweepOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            SweepOperation::LoadEvent => "load_event",
            SweepOperation::MarkExpired => "mark_expired",
            SweepOperation::PurgeMedia => "purge_media",
            SweepOperation::DeleteMediaRecords => "delete_media_records",
            SweepOperation::MarkArchived => "mark_archived",
        };
        f.write_str(name)
    }
}

/// A single collaborator failure recorded during a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub event_id: Uuid,
    pub operation: SweepOperation,
    /// Machine-readable code of the underlying error
    pub code: String,
    pub reason: String,
}

/// Aggregate outcome of one expiration sweep run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub expired: usize,
    pub deleted: usize,
    pub errors: usize,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn record_failure(
        &mut self,
        event_id: Uuid,
        operation: SweepOperation,
        code: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.errors += 1;
        self.failures.push(SweepFailure {
            event_id,
            operation,
            code: code.into(),
            reason: reason.into(),
        });
    }
}

/// Stored event row that could not be read as an [`EventRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidEvent {
    pub event_id: Uuid,
    pub code: String,
    pub reason: String,
}

/// Result of listing the events a sweep should look at.
///
/// Rows that fail to decode are reported next to the good ones so a single
/// defective row cannot block the rest of the sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepCandidates {
    pub events: Vec<EventRecord>,
    pub invalid: Vec<InvalidEvent>,
}

impl SweepCandidates {
    pub fn len(&self) -> usize {
        self.events.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.invalid.is_empty()
    }
}

/// Event whose retention window closes within the requested threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringEvent {
    pub event: EventRecord,
    pub expiration: EventExpiration,
}

//! Traits for external collaborators
//!
//! The limits engine never touches storage itself. These traits describe the
//! event data store and the media object store that the service layer drives;
//! `instamoments-db` and `instamoments-storage` provide the production
//! implementations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{EventUsageSnapshot, SweepCandidates};

/// Event rows and their lifecycle status
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Every event not yet archived. Rows that cannot be decoded go to
    /// `SweepCandidates::invalid`; only a failed read is an `Err`.
    async fn list_sweep_candidates(&self) -> Result<SweepCandidates, AppError>;

    /// Live counts for one event.
    async fn usage_snapshot(&self, event_id: Uuid) -> Result<EventUsageSnapshot, AppError>;

    /// Number of distinct contributors who uploaded to the event.
    async fn count_contributors(&self, event_id: Uuid) -> Result<i64, AppError>;

    /// Photos uploaded to the event by one contributor.
    async fn count_contributor_photos(
        &self,
        event_id: Uuid,
        contributor_email: &str,
    ) -> Result<i64, AppError>;

    /// Transition `active -> expired`. Must only apply while the event is still
    /// active; returns whether a row changed.
    async fn mark_expired(&self, event_id: Uuid) -> Result<bool, AppError>;

    /// Transition to `archived`. Returns whether a row changed.
    async fn mark_archived(&self, event_id: Uuid) -> Result<bool, AppError>;

    /// Remove the photo and video rows of an event; returns rows deleted.
    async fn delete_media_records(&self, event_id: Uuid) -> Result<u64, AppError>;
}

/// Object storage holding uploaded photos and videos
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Delete every stored object of an event; returns objects deleted.
    async fn purge_event_media(&self, event_id: Uuid) -> Result<usize, AppError>;
}

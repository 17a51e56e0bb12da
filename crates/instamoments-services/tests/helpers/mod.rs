//! In-memory collaborators for service tests
//!
//! These mocks let the sweep and limits service run without a database or
//! object store. Individual calls can be made to fail per event.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use instamoments_core::models::{
    EventRecord, EventStatus, EventUsageSnapshot, InvalidEvent, SubscriptionTier,
    SweepCandidates,
};
use instamoments_core::{AppError, EventRepository, MediaStore};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct MediaCounts {
    pub photos: i64,
    pub videos: i64,
    /// Photos per lowercase contributor email
    pub contributor_photos: HashMap<String, i64>,
}

/// Mock event repository backed by a `HashMap`
#[derive(Clone, Default)]
pub struct MockEventRepository {
    events: Arc<Mutex<Vec<EventRecord>>>,
    media: Arc<Mutex<HashMap<Uuid, MediaCounts>>>,
    fail_mark_expired: Arc<Mutex<HashSet<Uuid>>>,
    fail_mark_archived: Arc<Mutex<HashSet<Uuid>>>,
    fail_delete_records: Arc<Mutex<HashSet<Uuid>>>,
    fail_listing: Arc<Mutex<bool>>,
    invalid: Arc<Mutex<Vec<InvalidEvent>>>,
    /// Status reported by the listing when it differs from the stored one
    listed_status: Arc<Mutex<HashMap<Uuid, EventStatus>>>,
}

impl MockEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&self, event: EventRecord) {
        self.events.lock().unwrap().push(event);
    }

    pub fn set_media(&self, event_id: Uuid, counts: MediaCounts) {
        self.media.lock().unwrap().insert(event_id, counts);
    }

    pub fn fail_mark_expired_for(&self, event_id: Uuid) {
        self.fail_mark_expired.lock().unwrap().insert(event_id);
    }

    pub fn fail_mark_archived_for(&self, event_id: Uuid) {
        self.fail_mark_archived.lock().unwrap().insert(event_id);
    }

    pub fn fail_delete_records_for(&self, event_id: Uuid) {
        self.fail_delete_records.lock().unwrap().insert(event_id);
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    /// List a row that cannot be decoded into an event
    pub fn add_invalid_event(&self, event_id: Uuid, code: &str, reason: &str) {
        self.invalid.lock().unwrap().push(InvalidEvent {
            event_id,
            code: code.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Move an event to `status` while listings keep showing its old status,
    /// as if a concurrent sweep changed it right after the read.
    pub fn transition_behind_listing(&self, event_id: Uuid, status: EventStatus) {
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .expect("event exists");
        self.listed_status
            .lock()
            .unwrap()
            .insert(event_id, event.status);
        event.status = status;
    }

    pub fn status_of(&self, event_id: Uuid) -> EventStatus {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.status)
            .expect("event exists")
    }

    pub fn media_of(&self, event_id: Uuid) -> MediaCounts {
        self.media
            .lock()
            .unwrap()
            .get(&event_id)
            .cloned()
            .unwrap_or_default()
    }

    fn transition(&self, event_id: Uuid, from: &[EventStatus], to: EventStatus) -> bool {
        let mut events = self.events.lock().unwrap();
        match events.iter_mut().find(|e| e.id == event_id) {
            Some(event) if from.contains(&event.status) => {
                event.status = to;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl EventRepository for MockEventRepository {
    async fn list_sweep_candidates(&self) -> Result<SweepCandidates, AppError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(AppError::Storage("events table unavailable".to_string()));
        }
        let stored = self.events.lock().unwrap();
        let listed_status = self.listed_status.lock().unwrap();
        let events = stored
            .iter()
            .map(|e| EventRecord {
                status: listed_status.get(&e.id).copied().unwrap_or(e.status),
                ..e.clone()
            })
            .filter(|e| e.status != EventStatus::Archived)
            .collect();
        Ok(SweepCandidates {
            events,
            invalid: self.invalid.lock().unwrap().clone(),
        })
    }

    async fn usage_snapshot(&self, event_id: Uuid) -> Result<EventUsageSnapshot, AppError> {
        let event = self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        let counts = self.media_of(event_id);
        Ok(EventUsageSnapshot {
            tier: event.tier,
            has_video_addon: event.has_video_addon,
            total_photos: counts.photos,
            total_videos: counts.videos,
            created_at: event.created_at,
            custom_expires_at: event.custom_expires_at,
        })
    }

    async fn count_contributors(&self, event_id: Uuid) -> Result<i64, AppError> {
        Ok(self.media_of(event_id).contributor_photos.len() as i64)
    }

    async fn count_contributor_photos(
        &self,
        event_id: Uuid,
        contributor_email: &str,
    ) -> Result<i64, AppError> {
        Ok(self
            .media_of(event_id)
            .contributor_photos
            .get(&contributor_email.to_lowercase())
            .copied()
            .unwrap_or(0))
    }

    async fn mark_expired(&self, event_id: Uuid) -> Result<bool, AppError> {
        if self.fail_mark_expired.lock().unwrap().contains(&event_id) {
            return Err(AppError::collaborator("mark_expired", "connection reset"));
        }
        Ok(self.transition(event_id, &[EventStatus::Active], EventStatus::Expired))
    }

    async fn mark_archived(&self, event_id: Uuid) -> Result<bool, AppError> {
        if self.fail_mark_archived.lock().unwrap().contains(&event_id) {
            return Err(AppError::collaborator("mark_archived", "connection reset"));
        }
        Ok(self.transition(
            event_id,
            &[EventStatus::Active, EventStatus::Expired],
            EventStatus::Archived,
        ))
    }

    async fn delete_media_records(&self, event_id: Uuid) -> Result<u64, AppError> {
        if self.fail_delete_records.lock().unwrap().contains(&event_id) {
            return Err(AppError::collaborator("delete_media_records", "timeout"));
        }
        let removed = self.media.lock().unwrap().remove(&event_id);
        Ok(removed.map(|c| (c.photos + c.videos) as u64).unwrap_or(0))
    }
}

/// Mock media store recording which events were purged
#[derive(Clone, Default)]
pub struct MockMediaStore {
    purged: Arc<Mutex<Vec<Uuid>>>,
    failing: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, event_id: Uuid) {
        self.failing.lock().unwrap().insert(event_id);
    }

    pub fn purged(&self) -> Vec<Uuid> {
        self.purged.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn purge_event_media(&self, event_id: Uuid) -> Result<usize, AppError> {
        if self.failing.lock().unwrap().contains(&event_id) {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        self.purged.lock().unwrap().push(event_id);
        Ok(1)
    }
}

/// Build an event fixture
pub fn event(
    tier: SubscriptionTier,
    created_at: DateTime<Utc>,
    custom_expires_at: Option<DateTime<Utc>>,
    status: EventStatus,
) -> EventRecord {
    let id = Uuid::new_v4();
    EventRecord {
        id,
        name: format!("Event {}", id),
        slug: format!("event-{}", id.simple()),
        tier,
        has_video_addon: false,
        created_at,
        custom_expires_at,
        status,
    }
}

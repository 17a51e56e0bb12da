//! Event limits service
//!
//! Loads a fresh usage snapshot for every request and runs the evaluators
//! over it. Nothing is cached or reserved between calls.

use chrono::{DateTime, Utc};
use instamoments_core::models::{
    EventLimitsResult, EventUsageSnapshot, UpgradeRecommendation, UploadDecision,
};
use instamoments_core::{
    AppError, EventRepository, ExpirationCalculator, LimitEvaluator, TierCatalog, UpgradeAdvisor,
};
use std::sync::Arc;
use uuid::Uuid;

const EXPIRED_REASON: &str = "This event has expired and no longer accepts uploads";

#[derive(Clone)]
pub struct EventLimitsService {
    events: Arc<dyn EventRepository>,
    catalog: Arc<TierCatalog>,
}

impl EventLimitsService {
    pub fn new(events: Arc<dyn EventRepository>, catalog: Arc<TierCatalog>) -> Self {
        Self { events, catalog }
    }

    /// Fresh usage counts for one event.
    pub async fn load_snapshot(&self, event_id: Uuid) -> Result<EventUsageSnapshot, AppError> {
        self.events.usage_snapshot(event_id).await
    }

    /// Run the event-wide photo cap and, when a contributor is known, the
    /// per-contributor cap. The first denial wins.
    #[tracing::instrument(skip(self, contributor_email), fields(event_id = %event_id))]
    pub async fn check_photo_upload(
        &self,
        event_id: Uuid,
        contributor_email: Option<&str>,
    ) -> Result<UploadDecision, AppError> {
        self.check_photo_upload_at(event_id, contributor_email, Utc::now())
            .await
    }

    pub async fn check_photo_upload_at(
        &self,
        event_id: Uuid,
        contributor_email: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<UploadDecision, AppError> {
        let snapshot = self.load_snapshot(event_id).await?;
        if self.is_expired(&snapshot, now) {
            return Ok(UploadDecision::deny(EXPIRED_REASON));
        }

        let evaluator = LimitEvaluator::new(&self.catalog);
        let decision = evaluator.can_upload_photo(
            snapshot.tier,
            snapshot.total_photos,
            snapshot.has_video_addon,
        )?;
        if !decision.allowed {
            return Ok(decision);
        }

        match contributor_email {
            Some(email) => {
                let user_photos = self.events.count_contributor_photos(event_id, email).await?;
                evaluator.can_user_upload_photo(snapshot.tier, user_photos)
            }
            None => Ok(decision),
        }
    }

    #[tracing::instrument(skip(self), fields(event_id = %event_id))]
    pub async fn check_video_upload(&self, event_id: Uuid) -> Result<UploadDecision, AppError> {
        self.check_video_upload_at(event_id, Utc::now()).await
    }

    pub async fn check_video_upload_at(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<UploadDecision, AppError> {
        let snapshot = self.load_snapshot(event_id).await?;
        if self.is_expired(&snapshot, now) {
            return Ok(UploadDecision::deny(EXPIRED_REASON));
        }

        LimitEvaluator::new(&self.catalog).can_upload_video(
            snapshot.tier,
            snapshot.total_videos,
            snapshot.has_video_addon,
        )
    }

    /// Expiration state and counts for dashboards.
    pub async fn event_limits(&self, event_id: Uuid) -> Result<EventLimitsResult, AppError> {
        self.event_limits_at(event_id, Utc::now()).await
    }

    pub async fn event_limits_at(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EventLimitsResult, AppError> {
        let snapshot = self.load_snapshot(event_id).await?;
        let contributors = self.events.count_contributors(event_id).await?;
        ExpirationCalculator::new(&self.catalog).evaluate_snapshot(&snapshot, contributors, now)
    }

    pub async fn upgrade_recommendations(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<UpgradeRecommendation>, AppError> {
        self.upgrade_recommendations_at(event_id, Utc::now()).await
    }

    pub async fn upgrade_recommendations_at(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<UpgradeRecommendation>, AppError> {
        let snapshot = self.load_snapshot(event_id).await?;
        let expiration = ExpirationCalculator::new(&self.catalog).calculate_event_expiration(
            snapshot.created_at,
            snapshot.tier,
            snapshot.custom_expires_at,
            now,
        );

        UpgradeAdvisor::new(&self.catalog).get_upgrade_recommendations(
            snapshot.tier,
            snapshot.total_photos,
            snapshot.total_videos,
            snapshot.has_video_addon,
            expiration.days_remaining,
        )
    }

    fn is_expired(&self, snapshot: &EventUsageSnapshot, now: DateTime<Utc>) -> bool {
        ExpirationCalculator::new(&self.catalog)
            .calculate_event_expiration(
                snapshot.created_at,
                snapshot.tier,
                snapshot.custom_expires_at,
                now,
            )
            .is_expired
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use instamoments_core::models::{
    EventRecord, EventStatus, EventUsageSnapshot, InvalidEvent, SubscriptionTier, SweepCandidates,
};
use instamoments_core::{AppError, ErrorMetadata, EventRepository};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const EVENT_COLUMNS: &str =
    "id, name, slug, subscription_tier, has_video_addon, status, custom_expires_at, created_at";

/// Raw `events` row. Tier and status are stored as text and validated on conversion.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub subscription_tier: String,
    pub has_video_addon: bool,
    pub status: String,
    pub custom_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let tier: SubscriptionTier = row.subscription_tier.parse()?;
        let status: EventStatus = row.status.parse()?;
        Ok(EventRecord {
            id: row.id,
            name: row.name,
            slug: row.slug,
            tier,
            has_video_addon: row.has_video_addon,
            created_at: row.created_at,
            custom_expires_at: row.custom_expires_at,
            status,
        })
    }
}

/// Decode rows one by one, keeping defective rows apart instead of failing the batch.
fn partition_rows(rows: Vec<EventRow>) -> SweepCandidates {
    let mut candidates = SweepCandidates::default();
    for row in rows {
        let event_id = row.id;
        match EventRecord::try_from(row) {
            Ok(event) => candidates.events.push(event),
            Err(e) => {
                tracing::warn!(event_id = %event_id, error = %e, "Skipping undecodable event row");
                candidates.invalid.push(InvalidEvent {
                    event_id,
                    code: e.error_code().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    candidates
}

/// Postgres-backed event repository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "events", db.operation = "select", db.record_id = %event_id)
    )]
    pub async fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, EventRow>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EventRecord::try_from).transpose()
    }

    async fn count_for_event(&self, table: &str, event_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE event_id = $1",
            table
        ))
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[tracing::instrument(skip(self), fields(db.table = "events", db.operation = "select"))]
    async fn list_sweep_candidates(&self) -> Result<SweepCandidates, AppError> {
        let rows = sqlx::query_as::<Postgres, EventRow>(&format!(
            "SELECT {} FROM events WHERE status <> 'archived' ORDER BY created_at ASC",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(partition_rows(rows))
    }

    #[tracing::instrument(skip(self), fields(db.table = "events", db.record_id = %event_id))]
    async fn usage_snapshot(&self, event_id: Uuid) -> Result<EventUsageSnapshot, AppError> {
        let event = self
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let total_photos = self.count_for_event("photos", event_id).await?;
        let total_videos = self.count_for_event("videos", event_id).await?;

        Ok(EventUsageSnapshot {
            tier: event.tier,
            has_video_addon: event.has_video_addon,
            total_photos,
            total_videos,
            created_at: event.created_at,
            custom_expires_at: event.custom_expires_at,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "photos", db.record_id = %event_id))]
    async fn count_contributors(&self, event_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT contributor) FROM ( \
                SELECT LOWER(contributor_email) AS contributor FROM photos WHERE event_id = $1 \
                UNION ALL \
                SELECT LOWER(contributor_email) AS contributor FROM videos WHERE event_id = $1 \
             ) uploads WHERE contributor IS NOT NULL",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(
        skip(self, contributor_email),
        fields(db.table = "photos", db.record_id = %event_id)
    )]
    async fn count_contributor_photos(
        &self,
        event_id: Uuid,
        contributor_email: &str,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM photos \
             WHERE event_id = $1 AND LOWER(contributor_email) = LOWER($2)",
        )
        .bind(event_id)
        .bind(contributor_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "events", db.operation = "update", db.record_id = %event_id)
    )]
    async fn mark_expired(&self, event_id: Uuid) -> Result<bool, AppError> {
        // Guarded on the current status so overlapping sweeps cannot race
        let rows_affected = sqlx::query(
            "UPDATE events SET status = 'expired', updated_at = NOW() \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(event_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "events", db.operation = "update", db.record_id = %event_id)
    )]
    async fn mark_archived(&self, event_id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            "UPDATE events SET status = 'archived', updated_at = NOW() \
             WHERE id = $1 AND status IN ('active', 'expired')",
        )
        .bind(event_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    #[tracing::instrument(skip(self), fields(db.operation = "delete", db.record_id = %event_id))]
    async fn delete_media_records(&self, event_id: Uuid) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let photos = sqlx::query("DELETE FROM photos WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let videos = sqlx::query("DELETE FROM videos WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(photos + videos)
    }
}

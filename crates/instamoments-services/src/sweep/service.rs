use chrono::{DateTime, Utc};
use instamoments_core::models::{
    EventRecord, EventStatus, ExpiringEvent, InvalidEvent, SweepOperation, SweepReport,
};
use instamoments_core::validation::validate_hours;
use instamoments_core::{
    AppError, ErrorMetadata, EventRepository, ExpirationCalculator, LogLevel, MediaStore,
    TierCatalog,
};
use uuid::Uuid;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Retires events whose retention window has closed.
///
/// Events are processed one at a time. A failing collaborator call only
/// affects the event it belongs to: the failure is recorded in the report and
/// the event is left for the next run, which simply retries it.
#[derive(Clone)]
pub struct ExpirationSweepService {
    events: Arc<dyn EventRepository>,
    media: Arc<dyn MediaStore>,
    catalog: Arc<TierCatalog>,
    /// Interval between scheduled runs started by [`ExpirationSweepService::start`].
    sweep_interval: Duration,
    /// Whether scheduled runs also delete event media.
    delete_content: bool,
}

impl ExpirationSweepService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        media: Arc<dyn MediaStore>,
        catalog: Arc<TierCatalog>,
    ) -> Self {
        Self {
            events,
            media,
            catalog,
            sweep_interval: Duration::from_secs(3600),
            delete_content: false,
        }
    }

    pub fn with_schedule(mut self, sweep_interval: Duration, delete_content: bool) -> Self {
        self.sweep_interval = sweep_interval;
        self.delete_content = delete_content;
        self
    }

    /// Start the background sweep task
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                tracing::info!("Starting scheduled expiration sweep");

                match self.process_expired_events(self.delete_content).await {
                    Ok(report) => tracing::info!(
                        scanned = report.scanned,
                        expired = report.expired,
                        deleted = report.deleted,
                        errors = report.errors,
                        "Scheduled expiration sweep completed"
                    ),
                    Err(e) => tracing::error!(error = %e, "Scheduled expiration sweep failed"),
                }
            }
        })
    }

    /// Sweep every event as of now.
    pub async fn process_expired_events(
        &self,
        delete_content: bool,
    ) -> Result<SweepReport, AppError> {
        self.process_expired_events_at(delete_content, Utc::now()).await
    }

    /// Sweep every event as of `now`.
    ///
    /// Only listing the events can fail the whole run; everything after that is
    /// isolated per event. Rows that could not be decoded count as scanned and
    /// are reported as `load_event` failures.
    #[tracing::instrument(skip(self), fields(sweep.delete_content = delete_content))]
    pub async fn process_expired_events_at(
        &self,
        delete_content: bool,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, AppError> {
        let candidates = self.events.list_sweep_candidates().await?;
        let calculator = ExpirationCalculator::new(&self.catalog);
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..Default::default()
        };

        for invalid in &candidates.invalid {
            Self::record_invalid(&mut report, invalid);
        }

        for event in candidates.events {
            let expiration = calculator.calculate_event_expiration(
                event.created_at,
                event.tier,
                event.custom_expires_at,
                now,
            );
            if !expiration.is_expired {
                continue;
            }

            report.expired += 1;
            tracing::info!(
                event_id = %event.id,
                slug = %event.slug,
                expires_at = %expiration.expires_at,
                days_remaining = expiration.days_remaining,
                "Retiring expired event"
            );

            self.retire_event(&event, delete_content, &mut report).await;
        }

        tracing::info!(
            scanned = report.scanned,
            expired = report.expired,
            deleted = report.deleted,
            errors = report.errors,
            "Expiration sweep completed"
        );

        Ok(report)
    }

    /// Walk one event through `active -> expired -> archived`, stopping at the
    /// first failed step.
    async fn retire_event(
        &self,
        event: &EventRecord,
        delete_content: bool,
        report: &mut SweepReport,
    ) {
        if event.status == EventStatus::Active {
            match self.events.mark_expired(event.id).await {
                Ok(true) => {}
                Ok(false) => {
                    // Someone else moved it on after we listed it; their run owns the rest.
                    tracing::debug!(event_id = %event.id, "Event no longer active, skipping");
                    return;
                }
                Err(e) => {
                    Self::record(report, event.id, SweepOperation::MarkExpired, &e);
                    return;
                }
            }
        }

        if delete_content {
            match self.media.purge_event_media(event.id).await {
                Ok(objects) => {
                    tracing::debug!(event_id = %event.id, objects, "Deleted event media");
                }
                Err(e) => {
                    Self::record(report, event.id, SweepOperation::PurgeMedia, &e);
                    return;
                }
            }

            match self.events.delete_media_records(event.id).await {
                Ok(rows) => {
                    tracing::debug!(event_id = %event.id, rows, "Deleted event media records");
                    report.deleted += 1;
                }
                Err(e) => {
                    Self::record(report, event.id, SweepOperation::DeleteMediaRecords, &e);
                    return;
                }
            }
        }

        if let Err(e) = self.events.mark_archived(event.id).await {
            Self::record(report, event.id, SweepOperation::MarkArchived, &e);
        }
    }

    fn record(report: &mut SweepReport, event_id: Uuid, operation: SweepOperation, err: &AppError) {
        let code = err.error_code();
        let recoverable = err.is_recoverable();
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(
                error = %err, error_code = code, recoverable, event_id = %event_id,
                operation = %operation, "Expiration sweep step failed"
            ),
            LogLevel::Warn => tracing::warn!(
                error = %err, error_code = code, recoverable, event_id = %event_id,
                operation = %operation, "Expiration sweep step failed"
            ),
            LogLevel::Error => tracing::error!(
                error = %err, error_code = code, recoverable, event_id = %event_id,
                operation = %operation, "Expiration sweep step failed"
            ),
        }
        report.record_failure(event_id, operation, code, err.to_string());
    }

    fn record_invalid(report: &mut SweepReport, invalid: &InvalidEvent) {
        tracing::error!(
            event_id = %invalid.event_id,
            error_code = %invalid.code,
            reason = %invalid.reason,
            "Skipping event that could not be loaded"
        );
        report.record_failure(
            invalid.event_id,
            SweepOperation::LoadEvent,
            invalid.code.clone(),
            invalid.reason.clone(),
        );
    }

    /// Events closing within `hours_threshold` hours, soonest first.
    pub async fn get_events_expiring_soon(
        &self,
        hours_threshold: i64,
    ) -> Result<Vec<ExpiringEvent>, AppError> {
        self.get_events_expiring_soon_at(hours_threshold, Utc::now()).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_events_expiring_soon_at(
        &self,
        hours_threshold: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExpiringEvent>, AppError> {
        validate_hours("hours_threshold", hours_threshold)?;
        let candidates = self.events.list_sweep_candidates().await?;
        let calculator = ExpirationCalculator::new(&self.catalog);

        for invalid in &candidates.invalid {
            tracing::warn!(
                event_id = %invalid.event_id,
                error_code = %invalid.code,
                "Leaving undecodable event out of the expiring list"
            );
        }

        let mut expiring = Vec::new();
        for event in candidates.events {
            let expiration = calculator.calculate_with_threshold(
                event.created_at,
                event.tier,
                event.custom_expires_at,
                now,
                hours_threshold,
            )?;
            if expiration.is_expiring_soon {
                expiring.push(ExpiringEvent { event, expiration });
            }
        }

        expiring.sort_by_key(|e| e.expiration.expires_at);
        tracing::debug!(count = expiring.len(), "Found events expiring soon");
        Ok(expiring)
    }
}

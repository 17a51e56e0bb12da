use chrono::{DateTime, Duration, Utc};

use super::TierCatalog;
use crate::error::AppError;
use crate::models::{EventExpiration, EventLimitsResult, EventUsageSnapshot, SubscriptionTier};
use crate::validation::{validate_count, validate_hours};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Rolling window used when no explicit threshold is given
pub const DEFAULT_EXPIRING_SOON_HOURS: i64 = 24;

/// Computes when an event's retention window closes.
#[derive(Debug, Clone, Copy)]
pub struct ExpirationCalculator<'a> {
    catalog: &'a TierCatalog,
}

impl<'a> ExpirationCalculator<'a> {
    pub fn new(catalog: &'a TierCatalog) -> Self {
        Self { catalog }
    }

    /// Expiration state with the default 24-hour expiring-soon window.
    pub fn calculate_event_expiration(
        &self,
        created_at: DateTime<Utc>,
        tier: SubscriptionTier,
        custom_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EventExpiration {
        self.expiration_at(
            self.expires_at(created_at, tier, custom_expires_at),
            now,
            DEFAULT_EXPIRING_SOON_HOURS,
        )
    }

    /// Expiration state with a caller-supplied expiring-soon threshold in hours.
    pub fn calculate_with_threshold(
        &self,
        created_at: DateTime<Utc>,
        tier: SubscriptionTier,
        custom_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        hours_threshold: i64,
    ) -> Result<EventExpiration, AppError> {
        let hours_threshold = validate_hours("hours_threshold", hours_threshold)?;
        Ok(self.expiration_at(
            self.expires_at(created_at, tier, custom_expires_at),
            now,
            hours_threshold,
        ))
    }

    /// Full limits view of a usage snapshot; contributors are counted by the caller.
    pub fn evaluate_snapshot(
        &self,
        snapshot: &EventUsageSnapshot,
        total_contributors: i64,
        now: DateTime<Utc>,
    ) -> Result<EventLimitsResult, AppError> {
        validate_count("total_photos", snapshot.total_photos)?;
        validate_count("total_videos", snapshot.total_videos)?;
        validate_count("total_contributors", total_contributors)?;

        let expiration = self.calculate_event_expiration(
            snapshot.created_at,
            snapshot.tier,
            snapshot.custom_expires_at,
            now,
        );

        Ok(EventLimitsResult {
            expiration,
            total_photos: snapshot.total_photos,
            total_videos: snapshot.total_videos,
            total_contributors,
        })
    }

    // A custom expiry replaces the tier window entirely, even when it precedes created_at.
    fn expires_at(
        &self,
        created_at: DateTime<Utc>,
        tier: SubscriptionTier,
        custom_expires_at: Option<DateTime<Utc>>,
    ) -> DateTime<Utc> {
        custom_expires_at.unwrap_or_else(|| {
            let storage_days = self.catalog.get_tier_definition(tier).storage_days;
            created_at + Duration::days(i64::from(storage_days))
        })
    }

    fn expiration_at(
        &self,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
        hours_threshold: i64,
    ) -> EventExpiration {
        let remaining_ms = (expires_at - now).num_milliseconds();
        let days_remaining = days_remaining_ceil(remaining_ms);
        let is_expired = days_remaining <= 0;
        let is_expiring_soon =
            !is_expired && remaining_ms <= hours_threshold.saturating_mul(60 * 60 * 1000);

        EventExpiration {
            expires_at,
            days_remaining,
            is_expired,
            is_expiring_soon,
        }
    }
}

/// Whole days left, rounded toward positive infinity on millisecond precision.
///
/// Any time left, however small, counts as one day; zero or less means the
/// expiry instant has passed, so `days_remaining <= 0` iff `expires_at <= now`.
fn days_remaining_ceil(remaining_ms: i64) -> i64 {
    let days = remaining_ms.div_euclid(MILLIS_PER_DAY);
    if remaining_ms.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 20, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_free_event_two_days_old_is_expiring_soon() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let result = calc.calculate_event_expiration(
            now() - Duration::days(2),
            SubscriptionTier::Free,
            None,
            now(),
        );
        assert_eq!(result.days_remaining, 1);
        assert!(!result.is_expired);
        assert!(result.is_expiring_soon);
        assert_eq!(result.expires_at, now() + Duration::days(1));
    }

    #[test]
    fn test_free_event_four_days_old_is_expired() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let result = calc.calculate_event_expiration(
            now() - Duration::days(4),
            SubscriptionTier::Free,
            None,
            now(),
        );
        assert!(result.is_expired);
        assert!(!result.is_expiring_soon);
        assert!(result.days_remaining <= 0);
        assert_eq!(result.days_remaining, -1);
    }

    #[test]
    fn test_custom_expiry_overrides_tier_window() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let custom = now() + Duration::days(90);
        for tier in SubscriptionTier::ALL {
            let result = calc.calculate_event_expiration(now(), tier, Some(custom), now());
            assert_eq!(result.expires_at, custom);
            assert_eq!(result.days_remaining, 90);
        }
    }

    #[test]
    fn test_custom_expiry_before_creation_is_kept() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let created = now() - Duration::hours(1);
        let custom = created - Duration::days(1);
        let result = calc.calculate_event_expiration(
            created,
            SubscriptionTier::Pro,
            Some(custom),
            now(),
        );
        assert_eq!(result.expires_at, custom);
        assert!(result.is_expired);
    }

    #[test]
    fn test_fractional_days_round_up() {
        assert_eq!(days_remaining_ceil(1), 1);
        assert_eq!(days_remaining_ceil(MILLIS_PER_DAY), 1);
        assert_eq!(days_remaining_ceil(MILLIS_PER_DAY + 1), 2);
        assert_eq!(days_remaining_ceil(0), 0);
        assert_eq!(days_remaining_ceil(-1), 0);
        assert_eq!(days_remaining_ceil(-MILLIS_PER_DAY - 1), -1);
    }

    #[test]
    fn test_expiry_instant_counts_as_expired() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let result = calc.calculate_event_expiration(
            now(),
            SubscriptionTier::Free,
            Some(now()),
            now(),
        );
        assert_eq!(result.days_remaining, 0);
        assert!(result.is_expired);
        assert!(!result.is_expiring_soon);
    }

    #[test]
    fn test_more_than_a_day_left_is_not_expiring_soon() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let custom = now() + Duration::hours(25);
        let result = calc.calculate_event_expiration(
            now(),
            SubscriptionTier::Basic,
            Some(custom),
            now(),
        );
        assert_eq!(result.days_remaining, 2);
        assert!(!result.is_expiring_soon);
    }

    #[test]
    fn test_threshold_form() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let custom = now() + Duration::hours(40);
        let within = calc
            .calculate_with_threshold(now(), SubscriptionTier::Basic, Some(custom), now(), 48)
            .unwrap();
        assert!(within.is_expiring_soon);
        let outside = calc
            .calculate_with_threshold(now(), SubscriptionTier::Basic, Some(custom), now(), 24)
            .unwrap();
        assert!(!outside.is_expiring_soon);
        assert!(calc
            .calculate_with_threshold(now(), SubscriptionTier::Basic, None, now(), -1)
            .is_err());
    }

    #[test]
    fn test_evaluate_snapshot_echoes_counts() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let snapshot = EventUsageSnapshot {
            tier: SubscriptionTier::Standard,
            has_video_addon: true,
            total_photos: 12,
            total_videos: 3,
            created_at: now() - Duration::days(1),
            custom_expires_at: None,
        };
        let result = calc.evaluate_snapshot(&snapshot, 4, now()).unwrap();
        assert_eq!(result.expiration.days_remaining, 13);
        assert_eq!(result.total_photos, 12);
        assert_eq!(result.total_videos, 3);
        assert_eq!(result.total_contributors, 4);
    }

    #[test]
    fn test_evaluate_snapshot_rejects_negative_counts() {
        let catalog = TierCatalog::default();
        let calc = ExpirationCalculator::new(&catalog);
        let snapshot = EventUsageSnapshot {
            tier: SubscriptionTier::Free,
            has_video_addon: false,
            total_photos: -5,
            total_videos: 0,
            created_at: now(),
            custom_expires_at: None,
        };
        assert!(matches!(
            calc.evaluate_snapshot(&snapshot, 0, now()),
            Err(AppError::InvalidArgument(_))
        ));
    }
}

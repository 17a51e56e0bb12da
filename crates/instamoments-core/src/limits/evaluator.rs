use super::TierCatalog;
use crate::error::AppError;
use crate::models::{SubscriptionTier, UploadDecision};
use crate::validation::validate_count;

/// Decides whether a new upload fits within a tier's caps.
///
/// Caps are exclusive upper bounds. The global and per-contributor photo checks
/// are independent; an upload needs both to pass.
#[derive(Debug, Clone, Copy)]
pub struct LimitEvaluator<'a> {
    catalog: &'a TierCatalog,
}

impl<'a> LimitEvaluator<'a> {
    pub fn new(catalog: &'a TierCatalog) -> Self {
        Self { catalog }
    }

    pub fn can_upload_photo(
        &self,
        tier: SubscriptionTier,
        current_total_photos: i64,
        _has_video_addon: bool,
    ) -> Result<UploadDecision, AppError> {
        let current = validate_count("current_total_photos", current_total_photos)?;
        let max_photos = self.catalog.get_tier_definition(tier).max_photos;

        if current < u64::from(max_photos) {
            Ok(UploadDecision::allow())
        } else {
            Ok(UploadDecision::deny(format!(
                "Photo limit reached: the {} tier allows {} photos per event",
                tier, max_photos
            )))
        }
    }

    pub fn can_upload_video(
        &self,
        tier: SubscriptionTier,
        current_total_videos: i64,
        has_video_addon: bool,
    ) -> Result<UploadDecision, AppError> {
        let current = validate_count("current_total_videos", current_total_videos)?;

        if !has_video_addon {
            return Ok(UploadDecision::deny("Video uploads require the video addon"));
        }

        let max_videos = self.catalog.get_tier_definition(tier).max_videos;
        if current < u64::from(max_videos) {
            Ok(UploadDecision::allow())
        } else {
            Ok(UploadDecision::deny(format!(
                "Video limit reached: the {} tier allows {} videos per event",
                tier, max_videos
            )))
        }
    }

    pub fn can_user_upload_photo(
        &self,
        tier: SubscriptionTier,
        user_photo_count: i64,
    ) -> Result<UploadDecision, AppError> {
        let current = validate_count("user_photo_count", user_photo_count)?;
        let max_per_user = self.catalog.get_tier_definition(tier).max_photos_per_user;

        if current < u64::from(max_per_user) {
            Ok(UploadDecision::allow())
        } else {
            Ok(UploadDecision::deny(format!(
                "Contributor limit reached: each guest may upload {} photos",
                max_per_user
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator(catalog: &TierCatalog) -> LimitEvaluator<'_> {
        LimitEvaluator::new(catalog)
    }

    #[test]
    fn test_free_tier_at_cap_is_denied() {
        let catalog = TierCatalog::default();
        let decision = evaluator(&catalog)
            .can_upload_photo(SubscriptionTier::Free, 30, false)
            .unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("30"));
    }

    #[test]
    fn test_free_tier_below_cap_is_allowed() {
        let catalog = TierCatalog::default();
        let decision = evaluator(&catalog)
            .can_upload_photo(SubscriptionTier::Free, 29, false)
            .unwrap();
        assert!(decision.allowed);
        assert!(decision.reason.is_none());
    }

    #[test]
    fn test_photo_decision_matches_cap_for_every_tier() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        for tier in SubscriptionTier::ALL {
            let cap = i64::from(catalog.get_tier_definition(tier).max_photos);
            for n in [0, cap - 1, cap, cap + 1] {
                let decision = eval.can_upload_photo(tier, n, true).unwrap();
                assert_eq!(decision.allowed, n < cap, "tier {} count {}", tier, n);
            }
        }
    }

    #[test]
    fn test_video_requires_addon_regardless_of_count() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        for tier in SubscriptionTier::ALL {
            for n in [0, 1, 1000] {
                let decision = eval.can_upload_video(tier, n, false).unwrap();
                assert!(!decision.allowed);
                assert!(decision.reason.unwrap().contains("addon"));
            }
        }
    }

    #[test]
    fn test_video_with_addon_respects_cap() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        assert!(eval.can_upload_video(SubscriptionTier::Basic, 4, true).unwrap().allowed);
        assert!(!eval.can_upload_video(SubscriptionTier::Basic, 5, true).unwrap().allowed);
    }

    #[test]
    fn test_per_user_cap() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        assert!(eval.can_user_upload_photo(SubscriptionTier::Free, 2).unwrap().allowed);
        assert!(!eval.can_user_upload_photo(SubscriptionTier::Free, 3).unwrap().allowed);
        assert!(eval.can_user_upload_photo(SubscriptionTier::Pro, 4).unwrap().allowed);
        assert!(!eval.can_user_upload_photo(SubscriptionTier::Pro, 5).unwrap().allowed);
    }

    #[test]
    fn test_negative_counts_rejected() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        assert!(matches!(
            eval.can_upload_photo(SubscriptionTier::Free, -1, false),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            eval.can_upload_video(SubscriptionTier::Free, -3, true),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            eval.can_user_upload_photo(SubscriptionTier::Free, -2),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_counts_beyond_u32_are_denied_not_rejected() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        let huge = 5_000_000_000;

        let photo = eval.can_upload_photo(SubscriptionTier::Free, huge, false).unwrap();
        assert!(!photo.allowed);
        let video = eval.can_upload_video(SubscriptionTier::Pro, huge, true).unwrap();
        assert!(!video.allowed);
        let guest = eval.can_user_upload_photo(SubscriptionTier::Pro, i64::MAX).unwrap();
        assert!(!guest.allowed);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let catalog = TierCatalog::default();
        let eval = evaluator(&catalog);
        let first = eval.can_upload_photo(SubscriptionTier::Standard, 100, false).unwrap();
        let second = eval.can_upload_photo(SubscriptionTier::Standard, 100, false).unwrap();
        assert_eq!(first, second);
    }
}

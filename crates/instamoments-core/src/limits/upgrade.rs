use super::TierCatalog;
use crate::error::AppError;
use crate::models::{SubscriptionTier, UpgradeRecommendation};
use crate::validation::validate_count;

pub const REASON_PHOTO_LIMIT: &str = "approaching photo limit";
pub const REASON_VIDEO_LIMIT: &str = "approaching video limit";
pub const REASON_STORAGE_EXPIRING: &str = "storage expiring soon";

/// Days remaining at or below which every higher tier is suggested
const STORAGE_EXPIRING_DAYS: i64 = 2;

/// Suggests higher tiers when an event nears its caps or retention end.
///
/// Output is advisory only and never blocks an upload.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeAdvisor<'a> {
    catalog: &'a TierCatalog,
}

impl<'a> UpgradeAdvisor<'a> {
    pub fn new(catalog: &'a TierCatalog) -> Self {
        Self { catalog }
    }

    /// Recommendations ordered nearest tier first; empty for `pro`.
    pub fn get_upgrade_recommendations(
        &self,
        current_tier: SubscriptionTier,
        current_photos: i64,
        current_videos: i64,
        has_video_addon: bool,
        days_remaining: i64,
    ) -> Result<Vec<UpgradeRecommendation>, AppError> {
        let photos = validate_count("current_photos", current_photos)?;
        let videos = validate_count("current_videos", current_videos)?;

        let current = self.catalog.get_tier_definition(current_tier);
        let reason = if approaching(photos, current.max_photos) {
            Some(REASON_PHOTO_LIMIT)
        } else if has_video_addon && approaching(videos, current.max_videos) {
            Some(REASON_VIDEO_LIMIT)
        } else if days_remaining <= STORAGE_EXPIRING_DAYS {
            Some(REASON_STORAGE_EXPIRING)
        } else {
            None
        };

        let Some(reason) = reason else {
            return Ok(Vec::new());
        };

        Ok(current_tier
            .higher_tiers()
            .map(|tier| UpgradeRecommendation {
                tier,
                reason: reason.to_string(),
                price: self.catalog.get_tier_definition(tier).price,
            })
            .collect())
    }
}

/// `used >= 80% of cap`, in integers. A zero cap never triggers.
fn approaching(used: u64, cap: u32) -> bool {
    cap > 0 && u128::from(used) * 5 >= u128::from(cap) * 4
}

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{SubscriptionTier, TierDefinition};

/// Read-only table of subscription tiers.
///
/// | Tier | Photos | Photos/user | Days | Price | Videos | Addon |
/// |------|--------|-------------|------|-------|--------|-------|
/// | free | 30 | 3 | 3 | 0 | 3 | - |
/// | basic | 50 | 5 | 7 | 699 | 5 | 299 |
/// | standard | 100 | 5 | 14 | 999 | 10 | 399 |
/// | premium | 250 | 5 | 30 | 1999 | 25 | 599 |
/// | pro | 500 | 5 | 30 | 3499 | 50 | 799 |
///
/// Video caps are operator configuration and may be overridden; photo caps,
/// retention and prices are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCatalog {
    // Indexed by `SubscriptionTier::rank`
    tiers: [TierDefinition; 5],
}

const fn definition(
    tier: SubscriptionTier,
    max_photos: u32,
    max_photos_per_user: u32,
    storage_days: u32,
    price: u32,
    max_videos: u32,
    video_addon_price: u32,
) -> TierDefinition {
    TierDefinition {
        tier,
        max_photos,
        max_videos,
        max_photos_per_user,
        storage_days,
        price,
        video_addon_price,
        has_video_addon_available: video_addon_price > 0,
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self {
            tiers: [
                definition(SubscriptionTier::Free, 30, 3, 3, 0, 3, 0),
                definition(SubscriptionTier::Basic, 50, 5, 7, 699, 5, 299),
                definition(SubscriptionTier::Standard, 100, 5, 14, 999, 10, 399),
                definition(SubscriptionTier::Premium, 250, 5, 30, 1999, 25, 599),
                definition(SubscriptionTier::Pro, 500, 5, 30, 3499, 50, 799),
            ],
        }
    }
}

impl TierCatalog {
    /// Build the catalog with operator-configured video caps.
    ///
    /// Fails if the overrides break the rank-order monotonicity that upgrade
    /// recommendations rely on.
    pub fn with_video_caps(overrides: &BTreeMap<SubscriptionTier, u32>) -> Result<Self, AppError> {
        let mut catalog = Self::default();
        for (tier, max_videos) in overrides {
            catalog.tiers[tier.rank()].max_videos = *max_videos;
        }
        catalog.check_monotonic()?;
        Ok(catalog)
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::with_video_caps(config.video_limits())
    }

    pub fn get_tier_definition(&self, tier: SubscriptionTier) -> &TierDefinition {
        &self.tiers[tier.rank()]
    }

    /// Look up a tier by its stored key; unrecognised keys are a data defect.
    pub fn get_by_key(&self, key: &str) -> Result<&TierDefinition, AppError> {
        let tier: SubscriptionTier = key.parse()?;
        Ok(self.get_tier_definition(tier))
    }

    /// All definitions, lowest rank first.
    pub fn iter(&self) -> impl Iterator<Item = &TierDefinition> {
        self.tiers.iter()
    }

    fn check_monotonic(&self) -> Result<(), AppError> {
        for pair in self.tiers.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            if higher.max_photos < lower.max_photos
                || higher.max_videos < lower.max_videos
                || higher.storage_days < lower.storage_days
            {
                return Err(AppError::Configuration(format!(
                    "tier {} must not have lower limits than tier {}",
                    higher.tier, lower.tier
                )));
            }
        }
        Ok(())
    }
}

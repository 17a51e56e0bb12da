use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Subscription tier of an event.
///
/// Variants are declared in rank order so the derived `Ord` matches
/// free < basic < standard < premium < pro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Standard,
    Premium,
    Pro,
}

impl SubscriptionTier {
    /// Every tier, lowest rank first.
    pub const ALL: [SubscriptionTier; 5] = [
        SubscriptionTier::Free,
        SubscriptionTier::Basic,
        SubscriptionTier::Standard,
        SubscriptionTier::Premium,
        SubscriptionTier::Pro,
    ];

    /// Zero-based position in the rank order.
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Standard => "standard",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Pro => "pro",
        }
    }

    /// Tiers strictly above this one, nearest first.
    pub fn higher_tiers(self) -> impl Iterator<Item = SubscriptionTier> {
        Self::ALL.into_iter().filter(move |tier| *tier > self)
    }

    pub fn is_top(self) -> bool {
        self == SubscriptionTier::Pro
    }
}

impl FromStr for SubscriptionTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "basic" => Ok(SubscriptionTier::Basic),
            "standard" => Ok(SubscriptionTier::Standard),
            "premium" => Ok(SubscriptionTier::Premium),
            "pro" => Ok(SubscriptionTier::Pro),
            _ => Err(AppError::UnknownTier(s.to_string())),
        }
    }
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Limits and pricing of a single subscription tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub tier: SubscriptionTier,
    pub max_photos: u32,
    pub max_videos: u32,
    pub max_photos_per_user: u32,
    pub storage_days: u32,
    /// Price in the smallest currency unit (PHP)
    pub price: u32,
    pub video_addon_price: u32,
    pub has_video_addon_available: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::tier::SubscriptionTier;
use crate::error::AppError;

/// Lifecycle status of an event: `active -> expired -> archived`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Expired,
    Archived,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Expired => "expired",
            EventStatus::Archived => "archived",
        }
    }
}

impl FromStr for EventStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(EventStatus::Active),
            "expired" => Ok(EventStatus::Expired),
            "archived" => Ok(EventStatus::Archived),
            _ => Err(AppError::InvalidArgument(format!(
                "Unknown event status: {}",
                s
            ))),
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Event as supplied by the event repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub tier: SubscriptionTier,
    pub has_video_addon: bool,
    pub created_at: DateTime<Utc>,
    pub custom_expires_at: Option<DateTime<Utc>>,
    pub status: EventStatus,
}

/// Live counts for one event, built fresh for each evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventUsageSnapshot {
    pub tier: SubscriptionTier,
    pub has_video_addon: bool,
    pub total_photos: i64,
    pub total_videos: i64,
    pub created_at: DateTime<Utc>,
    pub custom_expires_at: Option<DateTime<Utc>>,
}

/// Expiration state computed for an event at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventExpiration {
    pub expires_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub is_expired: bool,
    pub is_expiring_soon: bool,
}

/// Expiration state plus the counts echoed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLimitsResult {
    #[serde(flatten)]
    pub expiration: EventExpiration,
    pub total_photos: i64,
    pub total_videos: i64,
    pub total_contributors: i64,
}

/// Outcome of an upload limit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UploadDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// A tier worth suggesting to the event host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRecommendation {
    pub tier: SubscriptionTier,
    pub reason: String,
    pub price: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_status_parse() {
        assert_eq!("ACTIVE".parse::<EventStatus>().unwrap(), EventStatus::Active);
        assert_eq!(
            "archived".parse::<EventStatus>().unwrap(),
            EventStatus::Archived
        );
        assert!(matches!(
            "deleted".parse::<EventStatus>(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_upload_decision_serialization_omits_reason_when_allowed() {
        let json = serde_json::to_value(UploadDecision::allow()).unwrap();
        assert_eq!(json, serde_json::json!({ "allowed": true }));

        let json = serde_json::to_value(UploadDecision::deny("full")).unwrap();
        assert_eq!(json["reason"], "full");
    }

    #[test]
    fn test_limits_result_flattens_expiration() {
        let result = EventLimitsResult {
            expiration: EventExpiration {
                expires_at: DateTime::<Utc>::UNIX_EPOCH,
                days_remaining: 2,
                is_expired: false,
                is_expiring_soon: false,
            },
            total_photos: 4,
            total_videos: 0,
            total_contributors: 2,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["days_remaining"], 2);
        assert_eq!(json["total_contributors"], 2);
        assert!(json.get("expiration").is_none());
    }
}

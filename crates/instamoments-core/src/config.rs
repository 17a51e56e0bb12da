//! Configuration module
//!
//! Environment-driven settings for the database, media storage, the
//! expiration sweep and operator-tunable video caps.

use std::collections::BTreeMap;
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::limits::DEFAULT_EXPIRING_SOON_HOURS;
use crate::models::SubscriptionTier;

const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SWEEP_INTERVAL_SECS: u64 = 3600;

/// Media storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers such as MinIO
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    // Expiration sweep
    pub sweep_interval_secs: u64,
    pub sweep_delete_content: bool,
    pub expiring_soon_hours: i64,
    /// Per-tier overrides of the default video caps
    pub video_limits: BTreeMap<SubscriptionTier, u32>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse()?;

        let video_limits = Self::video_limits_from_env()?;

        let config = Config {
            environment,
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok()
                .filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok().filter(|s| !s.is_empty()),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SWEEP_INTERVAL_SECS),
            sweep_delete_content: env::var("SWEEP_DELETE_CONTENT")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            expiring_soon_hours: env::var("EXPIRING_SOON_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_EXPIRING_SOON_HOURS),
            video_limits,
        };

        config.validate()?;
        Ok(config)
    }

    /// Read `VIDEO_LIMIT_<TIER>` overrides without requiring the rest of the
    /// configuration. Used by commands that never touch the database.
    pub fn video_limits_from_env() -> Result<BTreeMap<SubscriptionTier, u32>, anyhow::Error> {
        let mut video_limits = BTreeMap::new();
        for tier in SubscriptionTier::ALL {
            let key = format!("VIDEO_LIMIT_{}", tier.as_str().to_uppercase());
            if let Ok(raw) = env::var(&key) {
                let limit = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("{} must be a non-negative integer: {}", key, e))?;
                video_limits.insert(tier, limit);
            }
        }
        Ok(video_limits)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn video_limits(&self) -> &BTreeMap<SubscriptionTier, u32> {
        &self.video_limits
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.sweep_interval_secs == 0 {
            return Err(anyhow::anyhow!("SWEEP_INTERVAL_SECS must be greater than 0"));
        }

        if self.expiring_soon_hours < 0 {
            return Err(anyhow::anyhow!("EXPIRING_SOON_HOURS must not be negative"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "memory storage backend cannot be used in production"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            environment: "development".to_string(),
            database_url: "postgresql://localhost/instamoments".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: None,
            sweep_interval_secs: SWEEP_INTERVAL_SECS,
            sweep_delete_content: false,
            expiring_soon_hours: DEFAULT_EXPIRING_SOON_HOURS,
            video_limits: BTreeMap::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let mut config = base_config();
        config.database_url = "mysql://localhost/db".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_requires_bucket_and_region() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("event-media".to_string());
        assert!(config.validate().is_err());

        config.s3_region = Some("ap-southeast-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_rejected_in_production() {
        let mut config = base_config();
        config.environment = "Production".to_string();
        assert!(config.is_production());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(StorageBackend::Local.to_string(), "local");
        assert!("nfs".parse::<StorageBackend>().is_err());
    }
}

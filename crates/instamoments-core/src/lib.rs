//! InstaMoments Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! subscription limits engine shared by every InstaMoments component. The
//! engine itself (tier catalog, upload limits, expiration and upgrade advice)
//! is pure and performs no I/O; the traits in [`hooks`] describe the external
//! collaborators that the service layer drives.

pub mod config;
pub mod error;
pub mod hooks;
pub mod limits;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use hooks::{EventRepository, MediaStore};
pub use limits::{ExpirationCalculator, LimitEvaluator, TierCatalog, UpgradeAdvisor};

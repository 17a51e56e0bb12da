//! Subscription limits engine
//!
//! Pure, synchronous evaluators over a [`TierCatalog`]. They hold no state
//! beyond a shared borrow of the catalog, perform no I/O and can be called
//! concurrently from any number of tasks.

mod catalog;
mod evaluator;
mod expiration;
mod upgrade;

pub use catalog::TierCatalog;
pub use evaluator::LimitEvaluator;
pub use expiration::{ExpirationCalculator, DEFAULT_EXPIRING_SOON_HOURS};
pub use upgrade::{
    UpgradeAdvisor, REASON_PHOTO_LIMIT, REASON_STORAGE_EXPIRING, REASON_VIDEO_LIMIT,
};

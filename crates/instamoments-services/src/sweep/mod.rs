//! Expiration sweep
//!
//! Batch job classifying events as expired (cleanup) or expiring soon
//! (notification), plus the scheduled runner.

mod service;

pub use service::ExpirationSweepService;

//! InstaMoments Services Layer
//!
//! This crate is the **business service layer**: it drives the pure limits
//! engine from `instamoments-core` against the external collaborators (event
//! repository, media store). Keep orchestration and failure handling here;
//! keep the rules themselves in the core crate.

pub mod limits;
pub mod sweep;

pub use limits::EventLimitsService;
pub use sweep::ExpirationSweepService;

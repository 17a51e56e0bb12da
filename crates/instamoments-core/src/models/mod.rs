//! Data models for the limits engine
//!
//! Every model here is a plain value: built by the caller from live data,
//! evaluated, and discarded. Nothing in this module is persisted directly.

mod event;
mod sweep;
mod tier;

pub use event::*;
pub use sweep::*;
pub use tier::*;

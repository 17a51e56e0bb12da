//! InstaMoments Storage Library
//!
//! Object storage for event media, built on `object_store` so the same code
//! runs against S3-compatible buckets, the local filesystem, or memory.
//!
//! # Storage key format
//!
//! Every object of an event lives under `events/{event_id}/`, e.g.
//! `events/{event_id}/photos/{filename}`. Purging an event removes that prefix.

pub mod factory;
pub(crate) mod keys;
pub mod object;

// Re-export commonly used types
pub use factory::create_media_store;
pub use keys::{event_prefix, media_key, MediaKind};
pub use object::{ObjectMediaStore, StorageError, StorageResult};

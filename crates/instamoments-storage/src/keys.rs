//! Shared key layout for event media.

use object_store::path::Path;
use uuid::Uuid;

/// Kind of media stored under an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    fn folder(self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Video => "videos",
        }
    }
}

/// Prefix holding every object of one event: `events/{event_id}`.
pub fn event_prefix(event_id: Uuid) -> Path {
    Path::from(format!("events/{}", event_id))
}

/// Key of a single media object: `events/{event_id}/{photos|videos}/{filename}`.
pub fn media_key(event_id: Uuid, kind: MediaKind, filename: &str) -> Path {
    event_prefix(event_id)
        .child(kind.folder())
        .child(filename)
}

use async_trait::async_trait;
use futures::TryStreamExt;
use instamoments_core::{AppError, MediaStore, StorageBackend};
use object_store::path::Path;
use object_store::{Error as ObjectStoreError, ObjectStore, ObjectStoreExt};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::keys::event_prefix;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Event media store backed by any `object_store` implementation
#[derive(Clone)]
pub struct ObjectMediaStore {
    store: Arc<dyn ObjectStore>,
    backend: StorageBackend,
}

impl ObjectMediaStore {
    pub fn new(store: Arc<dyn ObjectStore>, backend: StorageBackend) -> Self {
        Self { store, backend }
    }

    /// Underlying object store, for callers that write media
    pub fn inner(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.backend
    }

    /// Keys of every object stored for an event
    pub async fn list_event_objects(&self, event_id: Uuid) -> StorageResult<Vec<Path>> {
        let prefix = event_prefix(event_id);
        let objects: Vec<_> = self
            .store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        Ok(objects.into_iter().map(|meta| meta.location).collect())
    }

    /// Delete every object under `events/{event_id}/`.
    ///
    /// Objects that disappear between listing and deletion are not an error.
    pub async fn delete_event_objects(&self, event_id: Uuid) -> StorageResult<usize> {
        let start = std::time::Instant::now();
        let locations = self.list_event_objects(event_id).await?;

        let mut deleted = 0usize;
        for location in &locations {
            match self.store.delete(location).await {
                Ok(()) => deleted += 1,
                Err(ObjectStoreError::NotFound { .. }) => {
                    tracing::debug!(key = %location, "Object already gone, continuing");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        event_id = %event_id,
                        key = %location,
                        backend = %self.backend,
                        "Object delete failed"
                    );
                    return Err(StorageError::DeleteFailed(format!("{}: {}", location, e)));
                }
            }
        }

        tracing::info!(
            event_id = %event_id,
            backend = %self.backend,
            objects = deleted,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Event media purged"
        );

        Ok(deleted)
    }
}

#[async_trait]
impl MediaStore for ObjectMediaStore {
    async fn purge_event_media(&self, event_id: Uuid) -> Result<usize, AppError> {
        Ok(self.delete_event_objects(event_id).await?)
    }
}

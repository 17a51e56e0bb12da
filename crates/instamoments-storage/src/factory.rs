use crate::object::{ObjectMediaStore, StorageError, StorageResult};
use instamoments_core::{Config, StorageBackend};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use std::sync::Arc;

/// Create the media store selected by configuration
pub fn create_media_store(config: &Config) -> StorageResult<ObjectMediaStore> {
    let store: Arc<dyn ObjectStore> = match config.storage_backend {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let mut builder = AmazonS3Builder::from_env()
                .with_region(region)
                .with_bucket_name(bucket);

            if let Some(ref endpoint) = config.s3_endpoint {
                let allow_http = endpoint.starts_with("http://");
                builder = builder
                    .with_endpoint(endpoint.clone())
                    .with_allow_http(allow_http);
            }

            Arc::new(
                builder
                    .build()
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?,
            )
        }
        StorageBackend::Local => {
            let path = config.local_storage_path.as_deref().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            std::fs::create_dir_all(path).map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    path, e
                ))
            })?;
            Arc::new(
                LocalFileSystem::new_with_prefix(path)
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?,
            )
        }
        StorageBackend::Memory => Arc::new(InMemory::new()),
    };

    tracing::info!(backend = %config.storage_backend, "Media store initialized");

    Ok(ObjectMediaStore::new(store, config.storage_backend))
}

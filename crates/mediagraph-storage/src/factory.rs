use crate::{ObjectStorage, Storage, StorageBackend, StorageError, StorageResult};
use mediagraph_core::StorageConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage = match config.backend {
        StorageBackend::S3 => {
            ObjectStorage::s3(config.s3_region.clone(), config.s3_endpoint.clone())
        }
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            ObjectStorage::local(base_path).await?
        }
        StorageBackend::Memory => ObjectStorage::in_memory(),
    };

    tracing::info!(
        backend = %config.backend,
        bucket = %config.bucket,
        "Object storage initialized"
    );

    Ok(Arc::new(storage))
}

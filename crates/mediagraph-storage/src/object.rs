use crate::traits::{BlobHandle, BlobStat, ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use mediagraph_core::BlobLocation;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectStore, ObjectStoreExt, PutOptions, PutPayload, TagSet,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone)]
enum Backend {
    S3 {
        region: String,
        endpoint_url: Option<String>,
    },
    Local {
        base_path: PathBuf,
    },
    Memory,
}

impl Backend {
    /// Whether the backend persists object tags and content type.
    fn keeps_attributes(&self) -> bool {
        !matches!(self, Backend::Local { .. })
    }
}

/// Object store implementation backed by the `object_store` crate.
///
/// One client is built lazily per bucket and reused for later calls.
pub struct ObjectStorage {
    backend: Backend,
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStorage {
    /// S3 or an S3-compatible provider.
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn s3(region: String, endpoint_url: Option<String>) -> Self {
        Self::with_backend(Backend::S3 {
            region,
            endpoint_url,
        })
    }

    /// Local filesystem; each bucket is a directory under `base_path`.
    pub async fn local(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        tokio::fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self::with_backend(Backend::Local { base_path }))
    }

    /// Process-local store for development and tests.
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory)
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            stores: RwLock::new(HashMap::new()),
        }
    }

    async fn store_for(&self, bucket: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        validate_bucket(bucket)?;

        if let Some(store) = self.stores.read().map_err(poisoned)?.get(bucket) {
            return Ok(store.clone());
        }

        let built = self.build_store(bucket).await?;
        let mut stores = self.stores.write().map_err(poisoned)?;
        Ok(stores.entry(bucket.to_string()).or_insert(built).clone())
    }

    async fn build_store(&self, bucket: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        match &self.backend {
            Backend::S3 {
                region,
                endpoint_url,
            } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_region(region.clone())
                    .with_bucket_name(bucket.to_string());

                if let Some(ref endpoint) = endpoint_url {
                    let allow_http = endpoint.starts_with("http://");
                    builder = builder
                        .with_endpoint(endpoint.clone())
                        .with_allow_http(allow_http);
                }

                let store = builder
                    .build()
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?;
                Ok(Arc::new(store))
            }
            Backend::Local { base_path } => {
                let root = base_path.join(bucket);
                tokio::fs::create_dir_all(&root).await?;
                let store = LocalFileSystem::new_with_prefix(&root)
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?;
                Ok(Arc::new(store))
            }
            Backend::Memory => Ok(Arc::new(InMemory::new())),
        }
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::BackendError("Object store registry lock poisoned".to_string())
}

fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket.contains('/') || bucket.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "Invalid bucket name: {}",
            bucket
        )));
    }
    Ok(())
}

fn object_path(key: &str) -> StorageResult<Path> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(Path::from(key))
}

#[async_trait]
impl Storage for ObjectStorage {
    async fn put(
        &self,
        location: &BlobLocation,
        mut data: ByteStream,
        size: Option<u64>,
        content_type: &str,
        tags: &[(String, String)],
    ) -> StorageResult<BlobHandle> {
        let path = object_path(&location.key)?;
        let store = self.store_for(&location.bucket).await?;
        let start = std::time::Instant::now();

        // object_store takes a complete payload; the stream is drained first.
        let mut buffer = BytesMut::with_capacity(size.unwrap_or(0) as usize);
        while let Some(chunk) = data.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        let written = buffer.len() as u64;
        if let Some(expected) = size {
            if expected != written {
                return Err(StorageError::UploadFailed(format!(
                    "Declared size {} bytes but received {} bytes",
                    expected, written
                )));
            }
        }

        let mut options = PutOptions::default();
        if self.backend.keeps_attributes() {
            let mut tag_set = TagSet::default();
            for (key, value) in tags {
                tag_set.push(key, value);
            }
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            options.tags = tag_set;
            options.attributes = attributes;
        }

        let result = store
            .put_opts(&path, PutPayload::from(buffer.freeze()), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %location.bucket,
                key = %location.key,
                size_bytes = written,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %location.bucket,
            key = %location.key,
            size_bytes = written,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(BlobHandle {
            location: location.clone(),
            content_type: content_type.to_string(),
            size: written,
        })
    }

    async fn stat(&self, location: &BlobLocation) -> StorageResult<BlobStat> {
        let path = object_path(&location.key)?;
        let store = self.store_for(&location.bucket).await?;

        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        match store.get_opts(&path, options).await {
            Ok(result) => Ok(BlobStat {
                size: result.meta.size,
                last_modified: result.meta.last_modified,
                content_type: result
                    .attributes
                    .get(&Attribute::ContentType)
                    .map(|value| value.to_string()),
            }),
            Err(ObjectStoreError::NotFound { .. }) => Err(StorageError::NotFound(location.to_path())),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn remove(&self, location: &BlobLocation) -> StorageResult<()> {
        let path = object_path(&location.key)?;
        let store = self.store_for(&location.bucket).await?;
        let start = std::time::Instant::now();

        match store.delete(&path).await {
            Ok(()) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(
                    bucket = %location.bucket,
                    key = %location.key,
                    "Object already absent"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %location.bucket,
                    key = %location.key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %location.bucket,
            key = %location.key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        match self.backend {
            Backend::S3 { .. } => StorageBackend::S3,
            Backend::Local { .. } => StorageBackend::Local,
            Backend::Memory => StorageBackend::Memory,
        }
    }
}

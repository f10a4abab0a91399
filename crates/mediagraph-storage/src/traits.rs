//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends implement.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use mediagraph_core::{BlobLocation, StorageBackend};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Content handed to `Storage::put`.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn byte_stream(data: impl Into<Bytes>) -> ByteStream {
    let data: Bytes = data.into();
    Box::pin(stream::once(async move { Ok(data) }))
}

/// A blob the store has confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub location: BlobLocation,
    pub content_type: String,
    /// Size as counted while writing.
    pub size: u64,
}

/// Result of a `stat` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobStat {
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    /// Not every backend keeps the content type.
    pub content_type: Option<String>,
}

/// Storage abstraction trait
///
/// Keys are used verbatim; the caller generates them. Buckets are addressed
/// explicitly on every call so that variants written to different buckets can
/// still be removed.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream `data` into `location`.
    ///
    /// `size` may be `None` when the length is not known up front; the store
    /// counts the bytes it receives. When a size is given and the stream
    /// yields a different number of bytes the upload fails and nothing is
    /// written. `tags` are attached to the stored object.
    async fn put(
        &self,
        location: &BlobLocation,
        data: ByteStream,
        size: Option<u64>,
        content_type: &str,
        tags: &[(String, String)],
    ) -> StorageResult<BlobHandle>;

    /// Size and modification time of an object. Fails with `NotFound` if absent.
    async fn stat(&self, location: &BlobLocation) -> StorageResult<BlobStat>;

    /// Remove an object. Removing an absent object succeeds.
    async fn remove(&self, location: &BlobLocation) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

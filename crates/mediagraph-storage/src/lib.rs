//! Mediagraph Storage Library
//!
//! Blob storage for uploaded media. The `Storage` trait is the seam the
//! upload and delete workflows talk to; `ObjectStorage` implements it on top
//! of the `object_store` crate for S3-compatible services, a local directory
//! tree, or process memory.
//!
//! Blobs are addressed by `BlobLocation` (bucket plus key). Keys must not
//! contain `..` or a leading `/`.

pub mod factory;
pub mod object;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use mediagraph_core::StorageBackend;
pub use object::ObjectStorage;
pub use traits::{
    byte_stream, BlobHandle, BlobStat, ByteStream, Storage, StorageError, StorageResult,
};

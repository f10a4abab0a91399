//! Mediagraph Core Library
//!
//! This crate provides the domain models, error types, configuration, and object
//! name generation shared across all Mediagraph components.

pub mod config;
pub mod error;
pub mod models;
pub mod naming;
pub mod storage_types;
pub mod title;

// Re-export commonly used types
pub use config::{
    BaseConfig, Config, MetadataConfig, NamingConfig, NotifyConfig, StorageConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{BlobLocation, MediaRecord, MediaVariant, NodeId, VariantKind};
pub use naming::{NameGenerator, ObjectKey, ShardPrefix};
pub use storage_types::{MetadataBackend, StorageBackend};
pub use title::decode_title;

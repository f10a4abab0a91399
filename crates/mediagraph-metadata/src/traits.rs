//! Metadata store abstraction
//!
//! The `MetadataStore` trait is implemented by every graph backend.

use std::collections::HashMap;

use async_trait::async_trait;
use mediagraph_core::{AppError, NodeId};
use thiserror::Error;

use crate::mutation::Mutation;
use crate::query::{Deletion, Query};

/// Metadata operation errors
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Mutation failed: {0}")]
    WriteFailed(String),

    #[error("Query failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid response from metadata store: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::WriteFailed(_) | MetadataError::DeleteFailed(_) => {
                AppError::MetadataWrite(err.to_string())
            }
            MetadataError::ReadFailed(_) | MetadataError::InvalidResponse(_) => {
                AppError::MetadataRead(err.to_string())
            }
            MetadataError::ConfigError(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// Ids the store generated for the blank nodes of one mutation, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlankNodeIds(HashMap<String, NodeId>);

impl BlankNodeIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, id: NodeId) {
        self.0.insert(label.into(), id);
    }

    pub fn get(&self, label: &str) -> Option<&NodeId> {
        self.0.get(label)
    }
}

impl FromIterator<(String, NodeId)> for BlankNodeIds {
    fn from_iter<I: IntoIterator<Item = (String, NodeId)>>(iter: I) -> Self {
        BlankNodeIds(iter.into_iter().collect())
    }
}

/// Graph metadata store.
///
/// Each call is a single transaction that is committed immediately. A call
/// that returns an error has written nothing.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Apply a mutation and return the id generated for every blank node
    /// that appears as a subject.
    async fn mutate(&self, mutation: &Mutation) -> MetadataResult<BlankNodeIds>;

    /// Run a read-only query. Returns the result tree keyed by the query's
    /// block names; no match yields an empty list, never an error.
    async fn query(&self, query: &Query) -> MetadataResult<serde_json::Value>;

    /// Remove nodes and edges matched by `deletion`.
    async fn delete(&self, deletion: &Deletion) -> MetadataResult<()>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

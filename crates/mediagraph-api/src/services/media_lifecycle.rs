//! Cascading delete of a media record.
//!
//! Blobs go first, then the variant nodes, then the record node. A record
//! that no longer exists is a successful no-op, so repeating a delete is safe.

use std::sync::Arc;
use std::time::Instant;

use mediagraph_core::{AppError, MediaRecord, NodeId};
use mediagraph_metadata::{load_record, Deletion, MetadataStore};
use mediagraph_storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Whether the record was present when the delete started.
    pub existed: bool,
    pub removed_blobs: usize,
}

pub struct DeleteOrchestrator {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn Storage>,
}

impl DeleteOrchestrator {
    pub fn new(metadata: Arc<dyn MetadataStore>, storage: Arc<dyn Storage>) -> Self {
        Self { metadata, storage }
    }

    /// Look up a record with its variants.
    pub async fn find(&self, id: &NodeId) -> Result<Option<MediaRecord>, AppError> {
        load_record(self.metadata.as_ref(), id)
            .await
            .map_err(AppError::from)
    }

    pub async fn delete(&self, id: &NodeId) -> Result<DeleteOutcome, AppError> {
        let start = Instant::now();

        let Some(record) = self.find(id).await? else {
            tracing::debug!(record_id = %id, "Record not found, nothing to delete");
            return Ok(DeleteOutcome {
                existed: false,
                removed_blobs: 0,
            });
        };

        let mut removed_blobs = 0;
        for variant in &record.variants {
            match self.storage.remove(&variant.location).await {
                Ok(()) => removed_blobs += 1,
                // Metadata is still removed; the blob becomes an orphan.
                Err(e) => tracing::error!(
                    error = %e,
                    orphan = "blob",
                    record_id = %id,
                    variant_id = %variant.id,
                    bucket = %variant.location.bucket,
                    key = %variant.location.key,
                    "Failed to remove blob during delete"
                ),
            }
        }

        self.metadata
            .delete(&Deletion::VariantsOf(id.clone()))
            .await
            .map_err(AppError::from)?;
        self.metadata
            .delete(&Deletion::Node(id.clone()))
            .await
            .map_err(AppError::from)?;

        tracing::info!(
            record_id = %id,
            variants = record.variants.len(),
            removed_blobs = removed_blobs,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media record deleted"
        );

        Ok(DeleteOutcome {
            existed: true,
            removed_blobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mediagraph_core::{BlobLocation, VariantKind};
    use mediagraph_metadata::{MediaRecordDraft, MemoryGraph};
    use mediagraph_storage::{byte_stream, ObjectStorage, StorageError};

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let graph = Arc::new(MemoryGraph::new());
        let storage: Arc<dyn Storage> = Arc::new(ObjectStorage::in_memory());
        let orchestrator = DeleteOrchestrator::new(graph.clone(), storage.clone());

        let orig = BlobLocation::new("test", "x0000042/AbCdEfGhIjKl.png");
        let thumb = BlobLocation::new("thumbs", "AbCdEfGhIjKl.png");
        let draft = MediaRecordDraft::new("beach", Utc::now())
            .with_variant(VariantKind::Original, orig.clone())
            .with_variant(VariantKind::Thumbnail, thumb.clone());
        let created = draft
            .resolve(&graph.mutate(&draft.to_mutation()).await.unwrap())
            .unwrap();
        for location in [&orig, &thumb] {
            storage
                .put(location, byte_stream(vec![0u8; 4]), Some(4), "image/png", &[])
                .await
                .unwrap();
        }

        let first = orchestrator.delete(&created.record_id).await.unwrap();
        assert_eq!(
            first,
            DeleteOutcome {
                existed: true,
                removed_blobs: 2
            }
        );
        assert_eq!(graph.node_count(), 0);
        assert!(matches!(
            storage.stat(&thumb).await,
            Err(StorageError::NotFound(_))
        ));

        let second = orchestrator.delete(&created.record_id).await.unwrap();
        assert!(!second.existed);
        assert_eq!(second.removed_blobs, 0);
    }
}

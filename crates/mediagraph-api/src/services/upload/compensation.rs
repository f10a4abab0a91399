use std::sync::Arc;

use mediagraph_core::{BlobLocation, NodeId};
use mediagraph_metadata::{Deletion, MetadataError, MetadataStore};
use mediagraph_storage::Storage;

/// Undo action for one completed forward step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Compensation {
    /// Remove a record and every variant created with it.
    DeleteRecord(NodeId),
    RemoveBlob(BlobLocation),
}

/// Compensations registered so far, undone last-in first-out.
#[derive(Debug, Default)]
pub(super) struct CompensationStack {
    steps: Vec<Compensation>,
}

impl CompensationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    #[cfg(test)]
    pub fn steps(&self) -> &[Compensation] {
        &self.steps
    }

    /// Run every compensation once, newest first.
    ///
    /// Failures are logged with an `orphan` field and never retried; the
    /// remaining compensations still run.
    pub async fn unwind(self, metadata: &Arc<dyn MetadataStore>, storage: &Arc<dyn Storage>) {
        for step in self.steps.into_iter().rev() {
            match step {
                Compensation::RemoveBlob(location) => {
                    if let Err(e) = storage.remove(&location).await {
                        tracing::error!(
                            error = %e,
                            orphan = "blob",
                            bucket = %location.bucket,
                            key = %location.key,
                            "Compensation failed: blob left behind"
                        );
                    } else {
                        tracing::info!(
                            bucket = %location.bucket,
                            key = %location.key,
                            "Compensation removed blob"
                        );
                    }
                }
                Compensation::DeleteRecord(record_id) => {
                    let result: Result<(), MetadataError> = async {
                        metadata
                            .delete(&Deletion::VariantsOf(record_id.clone()))
                            .await?;
                        metadata.delete(&Deletion::Node(record_id.clone())).await
                    }
                    .await;

                    match result {
                        Ok(()) => {
                            tracing::info!(record_id = %record_id, "Compensation deleted metadata record")
                        }
                        Err(e) => tracing::error!(
                            error = %e,
                            orphan = "metadata_record",
                            record_id = %record_id,
                            "Compensation failed: metadata record left behind"
                        ),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mediagraph_core::VariantKind;
    use mediagraph_metadata::{load_record, MediaRecordDraft, MemoryGraph};
    use mediagraph_storage::{byte_stream, ObjectStorage, StorageError};

    #[tokio::test]
    async fn test_unwind_runs_newest_first_and_removes_both() {
        let graph = Arc::new(MemoryGraph::new());
        let metadata: Arc<dyn MetadataStore> = graph.clone();
        let storage: Arc<dyn Storage> = Arc::new(ObjectStorage::in_memory());

        let location = BlobLocation::new("test", "AbCdEfGhIjKl.png");
        let draft = MediaRecordDraft::new("t", Utc::now())
            .with_variant(VariantKind::Original, location.clone());
        let created = draft
            .resolve(&metadata.mutate(&draft.to_mutation()).await.unwrap())
            .unwrap();
        storage
            .put(&location, byte_stream(vec![1u8, 2, 3]), Some(3), "image/png", &[])
            .await
            .unwrap();

        let mut stack = CompensationStack::new();
        stack.push(Compensation::DeleteRecord(created.record_id.clone()));
        stack.push(Compensation::RemoveBlob(location.clone()));
        assert_eq!(
            stack.steps().last(),
            Some(&Compensation::RemoveBlob(location.clone()))
        );

        stack.unwind(&metadata, &storage).await;

        assert!(load_record(metadata.as_ref(), &created.record_id)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            storage.stat(&location).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(graph.node_count(), 0);
    }
}

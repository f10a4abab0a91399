use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use mediagraph_core::{decode_title, AppError, BlobLocation, NameGenerator, VariantKind};
use mediagraph_metadata::{MediaRecordDraft, MetadataStore};
use mediagraph_services::{NotificationClient, NotificationError, ProcessingRequest};
use mediagraph_storage::{byte_stream, Storage};

use super::compensation::{Compensation, CompensationStack};
use super::types::{MediaType, UploadOutcome, UploadRequest};

/// Downstream processor to probe before and notify after storing a blob.
#[derive(Clone)]
pub struct Notifier {
    pub client: Arc<dyn NotificationClient>,
    pub probe_timeout: Duration,
    pub timeout: Duration,
}

/// Drives one upload: name → metadata → blob → notify, with rollback.
///
/// Metadata is written before the blob so that the blob can be tagged with
/// its record id. Every step after the metadata write registers a
/// compensation; on failure the compensations run before the original error
/// is returned.
pub struct UploadOrchestrator {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn Storage>,
    notifier: Option<Notifier>,
    names: NameGenerator,
    bucket: String,
}

/// Validated input, ready for the forward steps.
struct PreparedUpload {
    title: String,
    content: bytes::Bytes,
    media_type: MediaType,
}

impl UploadOrchestrator {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn Storage>,
        notifier: Option<Notifier>,
        names: NameGenerator,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            storage,
            notifier,
            names,
            bucket: bucket.into(),
        }
    }

    fn prepare(request: UploadRequest) -> Result<PreparedUpload, AppError> {
        let raw_title = request
            .title
            .ok_or_else(|| AppError::InvalidInput("Title is required".to_string()))?;
        let content = request
            .content
            .ok_or_else(|| AppError::InvalidInput("File is required".to_string()))?;
        if content.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }
        let media_type = MediaType::parse(
            request
                .content_type
                .as_deref()
                .ok_or_else(|| AppError::InvalidInput("File content type is required".to_string()))?,
        )?;

        Ok(PreparedUpload {
            title: decode_title(&raw_title)?,
            content,
            media_type,
        })
    }

    /// Run the upload. On error nothing created by this call is meant to
    /// survive, except where a compensation itself failed (logged as orphan).
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, AppError> {
        let start = Instant::now();
        let prepared = Self::prepare(request)?;

        let key = self.names.generate(&prepared.media_type.subtype);
        let location = BlobLocation::new(self.bucket.clone(), key.into_string());

        if let Some(ref notifier) = self.notifier {
            if !notifier.client.probe(notifier.probe_timeout).await {
                return Err(AppError::UpstreamUnavailable(
                    "Processing service did not answer the liveness probe".to_string(),
                ));
            }
        }

        let mut compensations = CompensationStack::new();
        let result = self
            .run_steps(&prepared, &location, &mut compensations)
            .await;

        match result {
            Ok(outcome) => {
                tracing::info!(
                    record_id = %outcome.record_id,
                    bucket = %location.bucket,
                    key = %location.key,
                    size_bytes = outcome.size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %location.bucket,
                    key = %location.key,
                    "Upload failed, rolling back"
                );
                compensations.unwind(&self.metadata, &self.storage).await;
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        prepared: &PreparedUpload,
        location: &BlobLocation,
        compensations: &mut CompensationStack,
    ) -> Result<UploadOutcome, AppError> {
        let draft = MediaRecordDraft::new(prepared.title.clone(), Utc::now())
            .with_variant(VariantKind::Original, location.clone());

        let ids = self
            .metadata
            .mutate(&draft.to_mutation())
            .await
            .map_err(AppError::from)?;
        if let Some(record_id) = ids.get(mediagraph_metadata::schema::RECORD_LABEL) {
            compensations.push(Compensation::DeleteRecord(record_id.clone()));
        }
        let created = draft
            .resolve(&ids)
            .map_err(|e| AppError::MetadataWrite(e.to_string()))?;
        let variant_id = created
            .variant_ids
            .first()
            .cloned()
            .ok_or_else(|| AppError::MetadataWrite("No variant id returned".to_string()))?;

        let tags = vec![
            ("image".to_string(), created.record_id.to_string()),
            ("size".to_string(), variant_id.to_string()),
        ];
        let handle = self
            .storage
            .put(
                location,
                byte_stream(prepared.content.clone()),
                Some(prepared.content.len() as u64),
                &prepared.media_type.essence,
                &tags,
            )
            .await
            .map_err(|e| AppError::StorageWrite(e.to_string()))?;
        compensations.push(Compensation::RemoveBlob(location.clone()));

        if let Some(ref notifier) = self.notifier {
            let request = ProcessingRequest {
                bucket: location.bucket.clone(),
                object: location.key.clone(),
                image_uid: created.record_id.to_string(),
                image_size_uid: variant_id.to_string(),
            };
            match notifier.client.notify(&request, notifier.timeout).await {
                Ok(status) if (200..300).contains(&status) => {}
                Ok(status) => {
                    return Err(AppError::Notification(format!(
                        "Processing service answered with status {}",
                        status
                    )))
                }
                Err(NotificationError::Timeout(after)) => {
                    return Err(AppError::UpstreamUnavailable(format!(
                        "Processing service did not answer within {:?}",
                        after
                    )))
                }
                Err(e) => return Err(AppError::Notification(e.to_string())),
            }
        }

        Ok(UploadOutcome {
            record_id: created.record_id,
            variant_id,
            location: handle.location,
            size: handle.size,
        })
    }
}

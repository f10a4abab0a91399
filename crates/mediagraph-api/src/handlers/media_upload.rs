use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use mediagraph_core::{AppError, NodeId};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_upload_request;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Id of the created media record.
    #[schema(value_type = String, example = "0x2a")]
    pub id: NodeId,
}

/// Upload a file and register it as a media record
///
/// The multipart body carries a URL-encoded `title` and a `file` part whose
/// declared content type decides the object key suffix. The blob is stored,
/// its metadata written, and the processing service notified when one is
/// configured; on any failure the parts already written are rolled back.
#[utoipa::path(
    post,
    path = "/",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Media uploaded", body = UploadResponse),
        (status = 400, description = "Missing or malformed title or file", body = ErrorResponse),
        (status = 413, description = "File too large"),
        (status = 500, description = "Metadata store failure", body = ErrorResponse),
        (status = 502, description = "Blob write or notification failed", body = ErrorResponse),
        (status = 504, description = "Processing service unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = extract_upload_request(multipart).await?;

    // Detached so that compensation still runs if the client goes away.
    let uploads = state.uploads.clone();
    let outcome = tokio::spawn(async move { uploads.upload(request).await })
        .await
        .map_err(|e| AppError::Internal(format!("Upload task failed: {}", e)))??;

    Ok(Json(UploadResponse {
        id: outcome.record_id,
    }))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use mediagraph_core::{AppError, MediaRecord, NodeId};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "media",
    params(
        ("id" = String, Path, description = "Media record id, e.g. 0x2a")
    ),
    responses(
        (status = 200, description = "Media record with its variants", body = MediaRecord),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Metadata store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(record_id = %id, operation = "get_media"))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let not_found = || AppError::NotFound("Media not found".to_string());

    let record_id: NodeId = id.parse().map_err(|_| not_found())?;
    let record = state
        .deletes
        .find(&record_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id = %record_id, "Failed to fetch media record");
            e
        })?
        .ok_or_else(not_found)?;

    Ok(Json(record))
}

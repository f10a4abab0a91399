use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use mediagraph_core::NodeId;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "media",
    params(
        ("id" = String, Path, description = "Media record id, e.g. 0x2a")
    ),
    responses(
        (status = 204, description = "Media deleted, or it did not exist"),
        (status = 500, description = "Metadata store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(record_id = %id, operation = "delete_media"))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    // Not an id the store could have issued, so there is nothing to remove.
    let Ok(record_id) = id.parse::<NodeId>() else {
        tracing::debug!("Malformed record id, treating as already deleted");
        return Ok(StatusCode::NO_CONTENT);
    };

    state.deletes.delete(&record_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

//! Multipart parsing for the upload endpoint

use axum::extract::Multipart;
use mediagraph_core::AppError;

use crate::services::UploadRequest;

/// Collect the `title` and `file` parts of an upload form.
///
/// Missing parts are left as `None`; the orchestrator decides whether they
/// are required. Unknown fields are skipped. A second `file` part is rejected.
pub async fn extract_upload_request(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest {
        title: None,
        content: None,
        content_type: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read title: {}", e)))?;
                request.title = Some(text);
            }
            "file" => {
                if request.content.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                request.content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                request.content = Some(data);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(request)
}

use bytes::Bytes;
use mediagraph_core::{AppError, BlobLocation, NodeId};

/// Input of one upload, as read from the request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// URL-encoded title, possibly ending in a file extension.
    pub title: Option<String>,
    pub content: Option<Bytes>,
    /// Declared `<type>/<subtype>` of the content.
    pub content_type: Option<String>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub record_id: NodeId,
    pub variant_id: NodeId,
    pub location: BlobLocation,
    pub size: u64,
}

/// A declared media type split at its `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaType {
    pub essence: String,
    pub subtype: String,
}

impl MediaType {
    /// Parameters after `;` are dropped; both halves must be present.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.split_once('/') {
            Some((top, sub)) if !top.is_empty() && !sub.is_empty() && !sub.contains('/') => {
                Ok(MediaType {
                    subtype: sub.to_string(),
                    essence: essence.clone(),
                })
            }
            _ => Err(AppError::InvalidInput(format!(
                "File content type must be <type>/<subtype>, got '{}'",
                raw
            ))),
        }
    }
}

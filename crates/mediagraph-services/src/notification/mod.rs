//! Notification of the downstream processor.
//!
//! After an upload has been stored, the processor is told where the original
//! lives so that it can render further variants. Delivery is a single
//! bounded-time HTTP call; retries are the caller's decision.

mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mediagraph_core::NotifyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpNotificationClient;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),

    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Body sent to the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub bucket: String,
    pub object: String,
    #[serde(rename = "imageUid")]
    pub image_uid: String,
    #[serde(rename = "imageSizeUid")]
    pub image_size_uid: String,
}

#[async_trait]
pub trait NotificationClient: Send + Sync {
    /// Cheap liveness check. Any failure, including a timeout, is `false`.
    async fn probe(&self, timeout: Duration) -> bool;

    /// Deliver `request` and return the HTTP status the processor answered
    /// with. Only transport failures are errors; a non-success status is
    /// returned as-is for the caller to judge.
    async fn notify(
        &self,
        request: &ProcessingRequest,
        timeout: Duration,
    ) -> Result<u16, NotificationError>;
}

pub fn create_notification_client(
    config: &NotifyConfig,
) -> Result<Arc<dyn NotificationClient>, NotificationError> {
    let client = HttpNotificationClient::new(&config.url)?;
    tracing::info!(url = %config.url, "Notification client initialized");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_request_wire_names() {
        let request = ProcessingRequest {
            bucket: "test".to_string(),
            object: "x1234567/AbCdEfGhIjKl.png".to_string(),
            image_uid: "0x2a".to_string(),
            image_size_uid: "0x2b".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bucket": "test",
                "object": "x1234567/AbCdEfGhIjKl.png",
                "imageUid": "0x2a",
                "imageSizeUid": "0x2b"
            })
        );
    }
}

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::{NotificationClient, NotificationError, ProcessingRequest};

/// Processor reached over plain HTTP: `HEAD <url>` to probe, `POST <url>`
/// with a JSON body to notify.
#[derive(Clone, Debug)]
pub struct HttpNotificationClient {
    client: Client,
    url: String,
}

impl HttpNotificationClient {
    /// Timeouts are applied per call, not on the client.
    pub fn new(url: &str) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .build()
            .map_err(|e| NotificationError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl NotificationClient for HttpNotificationClient {
    async fn probe(&self, timeout: Duration) -> bool {
        match self.client.head(&self.url).timeout(timeout).send().await {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "Processor probe answered");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %self.url, "Processor probe failed");
                false
            }
        }
    }

    async fn notify(
        &self,
        request: &ProcessingRequest,
        timeout: Duration,
    ) -> Result<u16, NotificationError> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %request.bucket,
                    key = %request.object,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Processor notification failed"
                );
                if e.is_timeout() {
                    NotificationError::Timeout(timeout)
                } else {
                    NotificationError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        tracing::info!(
            status = status,
            bucket = %request.bucket,
            key = %request.object,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Processor notified"
        );

        Ok(status)
    }
}

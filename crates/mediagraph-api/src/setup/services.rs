//! Store construction and application state setup

use std::sync::Arc;

use anyhow::{Context, Result};
use mediagraph_core::Config;
use mediagraph_metadata::{create_metadata_store, MetadataStore};
use mediagraph_services::{create_notification_client, NotificationClient};
use mediagraph_storage::{create_storage, Storage};

use crate::services::{DeleteOrchestrator, Notifier, UploadOrchestrator};
use crate::state::AppState;

/// Connect the configured backends and build the application state
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize object storage")?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %config.storage.bucket,
        "Object storage initialized"
    );

    let metadata =
        create_metadata_store(&config.metadata).context("Failed to initialize metadata store")?;
    tracing::info!(backend = metadata.backend_name(), "Metadata store initialized");

    let notifier = match config.notify {
        Some(ref notify) => {
            let client = create_notification_client(notify)
                .context("Failed to initialize notification client")?;
            tracing::info!(url = %notify.url, "Processing notifications enabled");
            Some(client)
        }
        None => {
            tracing::info!("NOTIFY_URL not set, uploads will not notify a processor");
            None
        }
    };

    Ok(build_state(config, storage, metadata, notifier))
}

/// Wire orchestrators around already constructed collaborators.
pub fn build_state(
    config: &Config,
    storage: Arc<dyn Storage>,
    metadata: Arc<dyn MetadataStore>,
    notification_client: Option<Arc<dyn NotificationClient>>,
) -> Arc<AppState> {
    let notifier = match (notification_client, config.notify.as_ref()) {
        (Some(client), Some(notify)) => Some(Notifier {
            client,
            probe_timeout: notify.probe_timeout,
            timeout: notify.timeout,
        }),
        (Some(_), None) => {
            tracing::warn!("Notification client given without NOTIFY_URL settings, ignoring it");
            None
        }
        (None, _) => None,
    };

    let uploads = Arc::new(UploadOrchestrator::new(
        metadata.clone(),
        storage.clone(),
        notifier,
        config.naming.name_generator(),
        config.storage.bucket.clone(),
    ));
    let deletes = Arc::new(DeleteOrchestrator::new(metadata, storage));

    Arc::new(AppState { uploads, deletes })
}

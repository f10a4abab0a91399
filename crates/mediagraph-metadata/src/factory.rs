use std::sync::Arc;

use mediagraph_core::{MetadataBackend, MetadataConfig};

use crate::{DgraphStore, MemoryGraph, MetadataResult, MetadataStore};

/// Create a metadata store based on configuration
pub fn create_metadata_store(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    let store: Arc<dyn MetadataStore> = match config.backend {
        MetadataBackend::Dgraph => Arc::new(DgraphStore::new(&config.dgraph_url, config.timeout)?),
        MetadataBackend::Memory => Arc::new(MemoryGraph::new()),
    };

    tracing::info!(backend = store.backend_name(), "Metadata store initialized");

    Ok(store)
}

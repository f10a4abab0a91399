//! Application state shared by all handlers.

use std::sync::Arc;

use crate::services::{DeleteOrchestrator, UploadOrchestrator};

#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadOrchestrator>,
    pub deletes: Arc<DeleteOrchestrator>,
}

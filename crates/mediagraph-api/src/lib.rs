//! Mediagraph API Library
//!
//! HTTP surface of the media service: the upload saga, the cascading delete,
//! and the application setup used by the binary and the integration tests.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use services::{
    DeleteOrchestrator, DeleteOutcome, Notifier, UploadOrchestrator, UploadOutcome, UploadRequest,
};
pub use state::AppState;

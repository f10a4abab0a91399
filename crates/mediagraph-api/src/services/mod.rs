pub mod media_lifecycle;
pub mod upload;

pub use media_lifecycle::{DeleteOrchestrator, DeleteOutcome};
pub use upload::{Notifier, UploadOrchestrator, UploadOutcome, UploadRequest};

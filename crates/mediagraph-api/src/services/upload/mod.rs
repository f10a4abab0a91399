//! Upload workflow
//!
//! Stores one uploaded file as a metadata record plus a blob, keeping the two
//! consistent without a shared transaction: each forward step that succeeds
//! registers a compensation, and a later failure runs them in reverse.

mod compensation;
mod service;
mod types;

pub use service::{Notifier, UploadOrchestrator};
pub use types::{UploadOutcome, UploadRequest};

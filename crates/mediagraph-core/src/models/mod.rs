//! Data models for the application
//!
//! A media record is the metadata root; each of its variants points at one
//! stored blob.

mod media;
mod storage;

pub use media::*;
pub use storage::*;

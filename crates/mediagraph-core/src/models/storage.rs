//! Storage location model: where a variant's blob lives.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A reference to a blob: bucket plus object key.
///
/// Persisted in the metadata store as `<bucket>/<key>`. The key may itself
/// contain `/` (shard prefixes), so parsing splits at the first separator only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse a `<bucket>/<key>` path. Returns `None` when either half is empty.
    pub fn parse(path: &str) -> Option<Self> {
        let (bucket, key) = path.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }

    /// Path form stored in the metadata store.
    pub fn to_path(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }
}

impl Display for BlobLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

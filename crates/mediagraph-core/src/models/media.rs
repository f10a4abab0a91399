use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use super::storage::BlobLocation;
use crate::error::AppError;

/// Identifier assigned by the metadata store to a node (`0x` followed by hex digits).
///
/// Ids are normalised to lowercase so that lookups do not depend on how a
/// caller spelled the hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an id from its numeric value.
    pub fn from_u64(value: u64) -> Self {
        NodeId(format!("{:#x}", value))
    }
}

impl FromStr for NodeId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid node id: {}", s)))?;
        if digits.is_empty() || digits.len() > 16 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::InvalidInput(format!("Invalid node id: {}", s)));
        }
        Ok(NodeId(format!("0x{}", digits.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for NodeId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Rendition tag of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Original,
    Thumbnail,
    Other(String),
}

impl VariantKind {
    pub fn as_str(&self) -> &str {
        match self {
            VariantKind::Original => "orig",
            VariantKind::Thumbnail => "thumbnail",
            VariantKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for VariantKind {
    fn from(tag: &str) -> Self {
        match tag {
            // "og" is what older records carry.
            "orig" | "og" => VariantKind::Original,
            "thumbnail" => VariantKind::Thumbnail,
            other => VariantKind::Other(other.to_string()),
        }
    }
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Serialize for VariantKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VariantKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(VariantKind::from(tag.as_str()))
    }
}

/// One stored rendition of a media record. Owned by its record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaVariant {
    pub id: NodeId,
    pub record_id: NodeId,
    #[schema(value_type = String, example = "orig")]
    pub kind: VariantKind,
    pub location: BlobLocation,
}

/// Metadata root node for an uploaded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaRecord {
    pub id: NodeId,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub variants: Vec<MediaVariant>,
}

impl MediaRecord {
    pub fn original(&self) -> Option<&MediaVariant> {
        self.variants
            .iter()
            .find(|variant| variant.kind == VariantKind::Original)
    }
}

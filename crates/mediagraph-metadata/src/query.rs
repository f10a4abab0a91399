//! Typed reads and deletes against the media graph.

use chrono::{DateTime, Utc};
use mediagraph_core::{BlobLocation, MediaRecord, MediaVariant, NodeId, VariantKind};
use serde::Deserialize;
use serde_json::Value;

use crate::schema;
use crate::traits::{MetadataError, MetadataResult, MetadataStore};

/// Result block name used by record queries.
pub const RECORD_BLOCK: &str = "dd";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A record with its variants and their blob paths.
    RecordVariants(NodeId),
}

impl Query {
    /// Render as DQL.
    pub fn to_dql(&self) -> String {
        match self {
            Query::RecordVariants(id) => format!(
                "{{ {block}(func: uid({id})) @filter(type({rtype})) {{ uid {title} {date} {variants} {{ uid {kind} {path} }} }} }}",
                block = RECORD_BLOCK,
                id = id,
                rtype = schema::RECORD_TYPE,
                title = schema::RECORD_TITLE,
                date = schema::RECORD_DATE,
                variants = schema::RECORD_VARIANTS,
                kind = schema::VARIANT_KIND,
                path = schema::VARIANT_PATH,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// Every variant node hanging off a record, with all their edges.
    VariantsOf(NodeId),
    /// One node with all its outgoing edges.
    Node(NodeId),
}

impl Deletion {
    /// Render as an RDF mutation body (an upsert block where a lookup is needed).
    pub fn to_rdf(&self) -> String {
        match self {
            Deletion::VariantsOf(id) => format!(
                "upsert {{ query {{ q(func: uid({id})) {{ {variants} {{ v as uid }} }} }} mutation {{ delete {{ uid(v) * * . }} }} }}",
                id = id,
                variants = schema::RECORD_VARIANTS,
            ),
            Deletion::Node(id) => format!("{{ delete {{ <{}> * * . }} }}", id),
        }
    }

    pub fn target(&self) -> &NodeId {
        match self {
            Deletion::VariantsOf(id) | Deletion::Node(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordQueryResult {
    #[serde(rename = "dd", default)]
    records: Vec<RecordNode>,
}

#[derive(Debug, Deserialize)]
struct RecordNode {
    uid: Option<String>,
    #[serde(rename = "Image.title")]
    title: Option<String>,
    #[serde(rename = "Image.date")]
    date: Option<String>,
    #[serde(rename = "Image.sizes", default)]
    variants: Vec<VariantNode>,
}

#[derive(Debug, Deserialize)]
struct VariantNode {
    uid: Option<String>,
    #[serde(rename = "ImageSize.type")]
    kind: Option<String>,
    #[serde(rename = "ImageSize.path")]
    path: Option<String>,
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .ok()
}

fn parse_uid(raw: Option<String>) -> MetadataResult<NodeId> {
    let raw = raw.ok_or_else(|| MetadataError::InvalidResponse("Node without uid".to_string()))?;
    raw.parse()
        .map_err(|_| MetadataError::InvalidResponse(format!("Malformed uid: {}", raw)))
}

/// Turn the result tree of `Query::RecordVariants` into a record.
///
/// Returns `None` when the block is empty. Variants whose path cannot be split
/// into bucket and key are skipped with a warning.
pub fn parse_record(tree: &Value) -> MetadataResult<Option<MediaRecord>> {
    let result = RecordQueryResult::deserialize(tree)
        .map_err(|e| MetadataError::InvalidResponse(e.to_string()))?;

    let Some(node) = result.records.into_iter().next() else {
        return Ok(None);
    };

    let id = parse_uid(node.uid)?;
    let mut variants = Vec::with_capacity(node.variants.len());
    for variant in node.variants {
        let Some(path) = variant.path else {
            continue;
        };
        let Some(location) = BlobLocation::parse(&path) else {
            tracing::warn!(record_id = %id, path = %path, "Skipping variant with malformed path");
            continue;
        };
        variants.push(MediaVariant {
            id: parse_uid(variant.uid)?,
            record_id: id.clone(),
            kind: variant
                .kind
                .as_deref()
                .map(VariantKind::from)
                .unwrap_or(VariantKind::Original),
            location,
        });
    }

    Ok(Some(MediaRecord {
        id,
        title: node.title.unwrap_or_default(),
        created_at: node.date.as_deref().and_then(parse_date),
        variants,
    }))
}

/// Fetch a record and its variants.
pub async fn load_record(
    store: &dyn MetadataStore,
    id: &NodeId,
) -> MetadataResult<Option<MediaRecord>> {
    let tree = store.query(&Query::RecordVariants(id.clone())).await?;
    parse_record(&tree)
}

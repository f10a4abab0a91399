//! Typed mutation builder.
//!
//! A `Mutation` is a list of quads that the store applies in one commit.
//! Blank-node labels are scoped to a single mutation: every occurrence of
//! `_:image` inside one call resolves to the same generated id.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use mediagraph_core::{BlobLocation, NodeId, VariantKind};

use crate::schema;
use crate::traits::{BlankNodeIds, MetadataError, MetadataResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Placeholder resolved by the store at commit time.
    Blank(String),
    Uid(NodeId),
}

impl Subject {
    pub fn blank(label: impl Into<String>) -> Self {
        Subject::Blank(label.into())
    }

    fn render(&self, out: &mut String) {
        match self {
            Subject::Blank(label) => {
                let _ = write!(out, "_:{}", label);
            }
            Subject::Uid(id) => {
                let _ = write!(out, "<{}>", id);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    Str(String),
    Int(i64),
    Node(Subject),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub subject: Subject,
    pub predicate: String,
    pub object: ObjectValue,
}

/// One atomic write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    quads: Vec<Quad>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subject: Subject, predicate: &str, object: ObjectValue) -> &mut Self {
        self.quads.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object,
        });
        self
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Blank labels used as subjects, in first-use order.
    pub fn blank_subjects(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for quad in &self.quads {
            if let Subject::Blank(ref label) = quad.subject {
                if !labels.contains(&label.as_str()) {
                    labels.push(label);
                }
            }
        }
        labels
    }

    /// Render as N-Quads, one statement per line.
    pub fn to_rdf(&self) -> String {
        let mut out = String::new();
        for quad in &self.quads {
            quad.subject.render(&mut out);
            let _ = write!(out, " <{}> ", quad.predicate);
            match &quad.object {
                ObjectValue::Str(value) => {
                    out.push('"');
                    escape_literal(value, &mut out);
                    out.push('"');
                }
                ObjectValue::Int(value) => {
                    let _ = write!(out, "\"{}\"^^<xs:int>", value);
                }
                ObjectValue::Node(node) => node.render(&mut out),
            }
            out.push_str(" .\n");
        }
        out
    }
}

fn escape_literal(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
}

/// A variant to be created together with its record.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDraft {
    pub kind: VariantKind,
    pub location: BlobLocation,
}

/// A record and its variants, not yet committed.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecordDraft {
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub variants: Vec<VariantDraft>,
}

/// Ids assigned to a committed draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
    pub record_id: NodeId,
    /// Same order as `MediaRecordDraft::variants`.
    pub variant_ids: Vec<NodeId>,
}

impl MediaRecordDraft {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            created_at,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, kind: VariantKind, location: BlobLocation) -> Self {
        self.variants.push(VariantDraft { kind, location });
        self
    }

    fn variant_label(index: usize) -> String {
        if index == 0 {
            schema::VARIANT_LABEL.to_string()
        } else {
            format!("{}{}", schema::VARIANT_LABEL, index)
        }
    }

    /// Build the single mutation that creates the record and all its variants.
    pub fn to_mutation(&self) -> Mutation {
        let record = Subject::blank(schema::RECORD_LABEL);
        let mut mutation = Mutation::new();

        mutation
            .push(
                record.clone(),
                schema::TYPE_PREDICATE,
                ObjectValue::Str(schema::RECORD_TYPE.to_string()),
            )
            .push(
                record.clone(),
                schema::RECORD_TITLE,
                ObjectValue::Str(self.title.clone()),
            )
            .push(
                record.clone(),
                schema::RECORD_DATE,
                ObjectValue::Str(self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            )
            .push(
                record.clone(),
                schema::RECORD_EPOCH,
                ObjectValue::Int(self.created_at.timestamp()),
            );

        for (index, variant) in self.variants.iter().enumerate() {
            let node = Subject::blank(Self::variant_label(index));
            mutation
                .push(
                    record.clone(),
                    schema::RECORD_VARIANTS,
                    ObjectValue::Node(node.clone()),
                )
                .push(
                    node.clone(),
                    schema::TYPE_PREDICATE,
                    ObjectValue::Str(schema::VARIANT_TYPE.to_string()),
                )
                .push(
                    node.clone(),
                    schema::VARIANT_KIND,
                    ObjectValue::Str(variant.kind.to_string()),
                )
                .push(
                    node,
                    schema::VARIANT_PATH,
                    ObjectValue::Str(variant.location.to_path()),
                );
        }

        mutation
    }

    /// Map the ids returned by `MetadataStore::mutate` back onto this draft.
    pub fn resolve(&self, ids: &BlankNodeIds) -> MetadataResult<CreatedRecord> {
        let lookup = |label: &str| {
            ids.get(label).cloned().ok_or_else(|| {
                MetadataError::InvalidResponse(format!("No id returned for blank node _:{}", label))
            })
        };

        let record_id = lookup(schema::RECORD_LABEL)?;
        let variant_ids = (0..self.variants.len())
            .map(|index| lookup(&Self::variant_label(index)))
            .collect::<MetadataResult<Vec<_>>>()?;

        Ok(CreatedRecord {
            record_id,
            variant_ids,
        })
    }
}

//! In-process graph store for development and tests.
//!
//! Mutations are applied under a single lock, so each call is atomic in the
//! same way a Dgraph transaction is.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use mediagraph_core::NodeId;
use serde_json::{json, Map, Value};

use crate::mutation::{Mutation, ObjectValue, Subject};
use crate::query::{Deletion, Query, RECORD_BLOCK};
use crate::schema;
use crate::traits::{BlankNodeIds, MetadataError, MetadataResult, MetadataStore};

#[derive(Debug, Clone, PartialEq)]
enum Stored {
    Literal(Value),
    Edge(NodeId),
}

type Predicates = BTreeMap<String, Vec<Stored>>;

#[derive(Debug, Default)]
struct Graph {
    next_uid: u64,
    nodes: HashMap<NodeId, Predicates>,
}

impl Graph {
    fn mint(&mut self) -> NodeId {
        self.next_uid += 1;
        NodeId::from_u64(self.next_uid)
    }

    fn literal(&self, node: &Predicates, predicate: &str) -> Option<Value> {
        node.get(predicate)?.iter().find_map(|stored| match stored {
            Stored::Literal(value) => Some(value.clone()),
            Stored::Edge(_) => None,
        })
    }

    fn edges<'a>(&self, node: &'a Predicates, predicate: &str) -> Vec<&'a NodeId> {
        node.get(predicate)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|stored| match stored {
                        Stored::Edge(id) => Some(id),
                        Stored::Literal(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn has_type(&self, node: &Predicates, type_name: &str) -> bool {
        self.literal(node, schema::TYPE_PREDICATE) == Some(Value::String(type_name.to_string()))
    }
}

/// Metadata store that keeps the graph in memory.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    graph: Mutex<Graph>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently holding at least one predicate.
    pub fn node_count(&self) -> usize {
        self.graph
            .lock()
            .map(|graph| graph.nodes.len())
            .unwrap_or_default()
    }

    fn lock(&self) -> MetadataResult<std::sync::MutexGuard<'_, Graph>> {
        self.graph
            .lock()
            .map_err(|_| MetadataError::ConfigError("Memory graph lock poisoned".to_string()))
    }
}

#[async_trait]
impl MetadataStore for MemoryGraph {
    async fn mutate(&self, mutation: &Mutation) -> MetadataResult<BlankNodeIds> {
        let mut graph = self.lock()?;

        let mut assigned: HashMap<String, NodeId> = HashMap::new();
        let mut resolve = |graph: &mut Graph, subject: &Subject| match subject {
            Subject::Uid(id) => id.clone(),
            Subject::Blank(label) => assigned
                .entry(label.clone())
                .or_insert_with(|| graph.mint())
                .clone(),
        };

        let mut staged = Vec::with_capacity(mutation.quads().len());
        for quad in mutation.quads() {
            let subject = resolve(&mut *graph, &quad.subject);
            let object = match &quad.object {
                ObjectValue::Str(value) => Stored::Literal(Value::String(value.clone())),
                ObjectValue::Int(value) => Stored::Literal(json!(value)),
                ObjectValue::Node(node) => Stored::Edge(resolve(&mut *graph, node)),
            };
            staged.push((subject, quad.predicate.clone(), object));
        }

        for (subject, predicate, object) in staged {
            graph
                .nodes
                .entry(subject)
                .or_default()
                .entry(predicate)
                .or_default()
                .push(object);
        }

        Ok(mutation
            .blank_subjects()
            .into_iter()
            .filter_map(|label| {
                assigned
                    .get(label)
                    .map(|id| (label.to_string(), id.clone()))
            })
            .collect())
    }

    async fn query(&self, query: &Query) -> MetadataResult<Value> {
        let graph = self.lock()?;

        match query {
            Query::RecordVariants(id) => {
                let mut block = Vec::new();
                if let Some(node) = graph
                    .nodes
                    .get(id)
                    .filter(|node| graph.has_type(node, schema::RECORD_TYPE))
                {
                    let mut record = Map::new();
                    record.insert("uid".to_string(), json!(id.as_str()));
                    for predicate in [schema::RECORD_TITLE, schema::RECORD_DATE] {
                        if let Some(value) = graph.literal(node, predicate) {
                            record.insert(predicate.to_string(), value);
                        }
                    }

                    let variants: Vec<Value> = graph
                        .edges(node, schema::RECORD_VARIANTS)
                        .into_iter()
                        .filter_map(|variant_id| {
                            let variant = graph.nodes.get(variant_id)?;
                            let mut out = Map::new();
                            out.insert("uid".to_string(), json!(variant_id.as_str()));
                            for predicate in [schema::VARIANT_KIND, schema::VARIANT_PATH] {
                                if let Some(value) = graph.literal(variant, predicate) {
                                    out.insert(predicate.to_string(), value);
                                }
                            }
                            Some(Value::Object(out))
                        })
                        .collect();
                    if !variants.is_empty() {
                        record.insert(schema::RECORD_VARIANTS.to_string(), Value::Array(variants));
                    }

                    block.push(Value::Object(record));
                }

                Ok(json!({ RECORD_BLOCK: block }))
            }
        }
    }

    async fn delete(&self, deletion: &Deletion) -> MetadataResult<()> {
        let mut graph = self.lock()?;

        match deletion {
            Deletion::VariantsOf(id) => {
                let targets: Vec<NodeId> = match graph.nodes.get(id) {
                    Some(node) => graph
                        .edges(node, schema::RECORD_VARIANTS)
                        .into_iter()
                        .cloned()
                        .collect(),
                    None => Vec::new(),
                };
                for target in targets {
                    graph.nodes.remove(&target);
                }
            }
            Deletion::Node(id) => {
                graph.nodes.remove(id);
            }
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

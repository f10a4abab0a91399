//! Mediagraph Metadata Library
//!
//! Graph metadata for uploaded media. Records and their variants are written
//! as N-Quad mutations in which blank-node labels (`_:image`, `_:size`) are
//! resolved to store-generated ids at commit time. Every call to a
//! `MetadataStore` is its own atomic transaction.
//!
//! Two backends implement the trait: `DgraphStore` talks to a Dgraph alpha
//! over HTTP and `MemoryGraph` keeps the graph in process memory.

pub mod dgraph;
pub mod factory;
pub mod memory;
pub mod mutation;
pub mod query;
pub mod schema;
pub mod traits;

pub use dgraph::DgraphStore;
pub use factory::create_metadata_store;
pub use memory::MemoryGraph;
pub use mutation::{
    CreatedRecord, MediaRecordDraft, Mutation, ObjectValue, Quad, Subject, VariantDraft,
};
pub use query::{load_record, parse_record, Deletion, Query};
pub use traits::{BlankNodeIds, MetadataError, MetadataResult, MetadataStore};

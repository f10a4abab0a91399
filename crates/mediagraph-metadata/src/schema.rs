//! Predicate and type names of the media graph.
//!
//! These names are persisted in existing databases and read by other
//! tooling. Do not rename them.

pub const TYPE_PREDICATE: &str = "dgraph.type";

pub const RECORD_TYPE: &str = "Image";
pub const RECORD_TITLE: &str = "Image.title";
/// ISO-8601 creation time.
pub const RECORD_DATE: &str = "Image.date";
/// Creation time in epoch seconds.
pub const RECORD_EPOCH: &str = "Image.dt";
pub const RECORD_VARIANTS: &str = "Image.sizes";

pub const VARIANT_TYPE: &str = "ImageSize";
pub const VARIANT_KIND: &str = "ImageSize.type";
/// `<bucket>/<key>` of the blob.
pub const VARIANT_PATH: &str = "ImageSize.path";

/// Blank-node label of the record in a create mutation.
pub const RECORD_LABEL: &str = "image";
/// Blank-node label of the first variant; later variants get a numeric suffix.
pub const VARIANT_LABEL: &str = "size";

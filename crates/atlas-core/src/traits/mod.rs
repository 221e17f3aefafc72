//! Collaborator contracts consumed by the builder and the query path.

pub mod dictionary;
pub mod shard_store;
pub mod source;

pub use dictionary::{DictMatch, Dictionary};
pub use shard_store::ShardStore;
pub use source::{
    DocPointer, FeatureStore, GeocoderData, IndexableDocs, Source, SourceId, SourceWriter,
};

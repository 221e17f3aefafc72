//! # atlas-store
//!
//! Reference implementations of the storage collaborators: an in-memory
//! Source with every optional capability, shard stores backed by memory or
//! by a Source's geocoder data, and a sorted-set phrase dictionary.

pub mod dictionary;
pub mod memory_source;
pub mod memory_store;
pub mod source_store;

pub use dictionary::PhraseDictionary;
pub use memory_source::MemorySource;
pub use memory_store::MemoryShardStore;
pub use source_store::SourceShardStore;

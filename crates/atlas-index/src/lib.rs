//! # atlas-index
//!
//! Turns documents into term, phrase, grid and degen shards. Documents are
//! validated up front, counted by the frequency pass, indexed by a pool of
//! worker threads and merged by a single coordinator into a [`ShardSet`].

pub mod builder;
pub mod documents;
pub mod freq;
pub mod ops;
pub mod patch;
pub mod shard_set;

pub use builder::{BuildOptions, IndexBuilder};
pub use freq::FreqTable;
pub use patch::Patch;
pub use shard_set::{ShardSet, ShardStats};

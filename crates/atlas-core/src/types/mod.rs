//! Shared data types.

pub mod collections;
pub mod document;
pub mod grid;
pub mod shard;
pub mod source_info;
pub mod tile;

pub use document::{Document, Geometry};
pub use grid::{GridPosting, UtfGrid};
pub use shard::ShardKind;
pub use source_info::SourceInfo;
pub use tile::{BBox, TileCoord};

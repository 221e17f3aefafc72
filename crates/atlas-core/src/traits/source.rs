//! The uniform Source contract every index backend satisfies.

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::types::{Document, SourceInfo, TileCoord, UtfGrid};

/// Identity of the storage behind a Source. Two logical indexes backed by
/// the same storage report the same identity and share shard handles.
pub type SourceId = u64;

/// Required operations plus optional capabilities. A capability a backend
/// does not offer returns `None`.
pub trait Source: Send + Sync {
    // --- Required ---
    fn open(&self) -> Result<(), StoreError>;
    fn info(&self) -> Result<SourceInfo, StoreError>;
    fn get_tile(&self, tile: TileCoord) -> Result<Option<Vec<u8>>, StoreError>;
    /// Decoded UTFGrid for a tile; `Ok(None)` when the grid does not exist.
    fn get_grid(&self, tile: TileCoord) -> Result<Option<UtfGrid>, StoreError>;
    fn identity(&self) -> SourceId;

    fn base_filename(&self) -> Option<String> {
        None
    }

    // --- Optional capabilities ---
    fn writer(&self) -> Option<&dyn SourceWriter> {
        None
    }
    fn geocoder_data(&self) -> Option<&dyn GeocoderData> {
        None
    }
    fn indexable(&self) -> Option<&dyn IndexableDocs> {
        None
    }
    fn features(&self) -> Option<&dyn FeatureStore> {
        None
    }
}

pub trait SourceWriter: Send + Sync {
    fn start_writing(&self) -> Result<(), StoreError>;
    fn put_info(&self, info: &SourceInfo) -> Result<(), StoreError>;
    fn put_tile(&self, tile: TileCoord, data: Vec<u8>) -> Result<(), StoreError>;
    fn stop_writing(&self) -> Result<(), StoreError>;
}

/// Named shard blobs (`term`, `phrase`, `grid`, `degen`, `freq`,
/// `dictionary`, `normalization`) addressed by shard number.
pub trait GeocoderData: Send + Sync {
    fn get_geocoder_data(&self, kind: &str, shard: u64) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_geocoder_data(&self, kind: &str, shard: u64, data: Vec<u8>) -> Result<(), StoreError>;
    /// Every stored `(kind, shard)` pair, sorted.
    fn geocoder_data_keys(&self) -> Result<Vec<(String, u64)>, StoreError>;
}

/// Paging cursor for [`IndexableDocs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocPointer {
    pub offset: usize,
    pub limit: usize,
}

impl DocPointer {
    pub fn new(limit: usize) -> Self {
        Self { offset: 0, limit }
    }
}

pub trait IndexableDocs: Send + Sync {
    /// One page of documents and the pointer to the next page, `None` once
    /// the source is exhausted.
    fn indexable_docs(
        &self,
        pointer: DocPointer,
    ) -> Result<(Vec<Document>, Option<DocPointer>), StoreError>;
}

/// Serialized per-document payloads.
pub trait FeatureStore: Send + Sync {
    fn get_feature(&self, id: u64) -> Result<Option<Document>, StoreError>;
    fn put_feature(&self, doc: &Document) -> Result<(), StoreError>;
    fn feature_ids(&self) -> Result<Vec<u64>, StoreError>;
}

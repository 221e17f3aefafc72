//! Shard store held entirely in memory.

use std::sync::RwLock;

use atlas_core::errors::StoreError;
use atlas_core::traits::ShardStore;
use atlas_core::types::ShardKind;
use atlas_core::FxHashMap;

/// `RwLock`-guarded postings map. Reads run concurrently; each `put`
/// replaces the postings under its key.
#[derive(Debug, Default)]
pub struct MemoryShardStore {
    shards: RwLock<FxHashMap<(ShardKind, u64), Vec<u64>>>,
}

impl MemoryShardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored for `kind`.
    pub fn len(&self, kind: ShardKind) -> usize {
        self.shards
            .read()
            .map(|m| m.keys().filter(|(k, _)| *k == kind).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.shards.read().map(|m| m.is_empty()).unwrap_or(true)
    }
}

impl ShardStore for MemoryShardStore {
    fn get(&self, kind: ShardKind, key: u64) -> Result<Option<Vec<u64>>, StoreError> {
        let shards = self
            .shards
            .read()
            .map_err(|_| StoreError::Poisoned { what: "shard map" })?;
        Ok(shards.get(&(kind, key)).cloned())
    }

    fn get_all(&self, kind: ShardKind, keys: &[u64]) -> Result<Vec<u64>, StoreError> {
        let shards = self
            .shards
            .read()
            .map_err(|_| StoreError::Poisoned { what: "shard map" })?;
        Ok(keys
            .iter()
            .filter_map(|key| shards.get(&(kind, *key)))
            .flatten()
            .copied()
            .collect())
    }

    fn put(&self, kind: ShardKind, key: u64, postings: Vec<u64>) -> Result<(), StoreError> {
        let mut shards = self
            .shards
            .write()
            .map_err(|_| StoreError::Poisoned { what: "shard map" })?;
        shards.insert((kind, key), postings);
        Ok(())
    }

    fn keys(&self, kind: ShardKind) -> Result<Vec<u64>, StoreError> {
        let shards = self
            .shards
            .read()
            .map_err(|_| StoreError::Poisoned { what: "shard map" })?;
        let mut keys: Vec<u64> = shards
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, key)| *key)
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

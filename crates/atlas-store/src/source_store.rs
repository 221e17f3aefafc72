//! Shard store persisted as JSON blobs through a Source's geocoder data.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use atlas_core::errors::StoreError;
use atlas_core::traits::{GeocoderData, ShardStore, Source};
use atlas_core::types::shard::shard_number;
use atlas_core::types::ShardKind;
use atlas_core::{FxHashMap, FxHashSet};
use tracing::debug;

type Blob = BTreeMap<u64, Vec<u64>>;

#[derive(Debug, Default)]
struct Cache {
    loaded: FxHashMap<(ShardKind, u64), Blob>,
    dirty: FxHashSet<(ShardKind, u64)>,
}

/// Loads `{ "<key>": [postings] }` blobs lazily, one per (kind, shard
/// number), and writes modified blobs back on [`SourceShardStore::flush`].
pub struct SourceShardStore {
    source: Arc<dyn Source>,
    shardlevel: u32,
    cache: RwLock<Cache>,
}

impl std::fmt::Debug for SourceShardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceShardStore")
            .field("source", &self.source.identity())
            .field("shardlevel", &self.shardlevel)
            .finish()
    }
}

impl SourceShardStore {
    pub fn new(source: Arc<dyn Source>, shardlevel: u32) -> Self {
        Self {
            source,
            shardlevel,
            cache: RwLock::new(Cache::default()),
        }
    }

    fn data(&self) -> Result<&dyn GeocoderData, StoreError> {
        self.source.geocoder_data().ok_or(StoreError::Unsupported {
            capability: "geocoder data",
        })
    }

    fn fetch_blob(&self, kind: ShardKind, shard: u64) -> Result<Blob, StoreError> {
        match self.data()?.get_geocoder_data(kind.as_str(), shard)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                kind: kind.to_string(),
                message: e.to_string(),
            }),
            None => Ok(Blob::new()),
        }
    }

    /// Make sure the shard holding (`kind`, `shard`) is in the cache.
    fn ensure_loaded(&self, kind: ShardKind, shard: u64) -> Result<(), StoreError> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
            if cache.loaded.contains_key(&(kind, shard)) {
                return Ok(());
            }
        }
        let blob = self.fetch_blob(kind, shard)?;
        let mut cache = self
            .cache
            .write()
            .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
        if !cache.loaded.contains_key(&(kind, shard)) {
            debug!(kind = %kind, shard, keys = blob.len(), "loaded shard");
            cache.loaded.insert((kind, shard), blob);
        }
        Ok(())
    }

    /// Write every modified shard back to the Source.
    pub fn flush(&self) -> Result<usize, StoreError> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
        let dirty: Vec<(ShardKind, u64)> = cache.dirty.drain().collect();
        let data = self.data()?;
        for (kind, shard) in &dirty {
            if let Some(blob) = cache.loaded.get(&(*kind, *shard)) {
                data.put_geocoder_data(kind.as_str(), *shard, serde_json::to_vec(blob)?)?;
            }
        }
        debug!(shards = dirty.len(), "flushed shards");
        Ok(dirty.len())
    }

    /// Shard numbers stored for `kind`, whether on the Source or only cached.
    fn shard_numbers(&self, kind: ShardKind) -> Result<Vec<u64>, StoreError> {
        let mut numbers: Vec<u64> = self
            .data()?
            .geocoder_data_keys()?
            .into_iter()
            .filter(|(name, _)| name == kind.as_str())
            .map(|(_, shard)| shard)
            .collect();
        let cache = self
            .cache
            .read()
            .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
        numbers.extend(
            cache
                .loaded
                .keys()
                .filter(|(k, _)| *k == kind)
                .map(|(_, shard)| *shard),
        );
        numbers.sort_unstable();
        numbers.dedup();
        Ok(numbers)
    }
}

impl ShardStore for SourceShardStore {
    fn get(&self, kind: ShardKind, key: u64) -> Result<Option<Vec<u64>>, StoreError> {
        let shard = shard_number(key, self.shardlevel);
        self.ensure_loaded(kind, shard)?;
        let cache = self
            .cache
            .read()
            .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
        Ok(cache
            .loaded
            .get(&(kind, shard))
            .and_then(|blob| blob.get(&key))
            .cloned())
    }

    fn put(&self, kind: ShardKind, key: u64, postings: Vec<u64>) -> Result<(), StoreError> {
        let shard = shard_number(key, self.shardlevel);
        self.ensure_loaded(kind, shard)?;
        let mut cache = self
            .cache
            .write()
            .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
        cache
            .loaded
            .entry((kind, shard))
            .or_default()
            .insert(key, postings);
        cache.dirty.insert((kind, shard));
        Ok(())
    }

    fn keys(&self, kind: ShardKind) -> Result<Vec<u64>, StoreError> {
        let numbers = self.shard_numbers(kind)?;
        for shard in &numbers {
            self.ensure_loaded(kind, *shard)?;
        }
        let cache = self
            .cache
            .read()
            .map_err(|_| StoreError::Poisoned { what: "shard cache" })?;
        let mut keys: Vec<u64> = numbers
            .iter()
            .filter_map(|shard| cache.loaded.get(&(kind, *shard)))
            .flat_map(|blob| blob.keys().copied())
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

//! Shard and dictionary handles shared by every index backed by the same
//! storage.

use std::sync::{Arc, Mutex};

use atlas_core::errors::StoreError;
use atlas_core::traits::{Dictionary, Source, SourceId};
use atlas_core::FxHashMap;
use atlas_store::{PhraseDictionary, SourceShardStore};
use tracing::debug;

/// Live storage handles of one Source.
#[derive(Debug)]
pub struct IndexStorage {
    pub store: Arc<SourceShardStore>,
    pub dictionary: Arc<PhraseDictionary>,
}

/// Handles keyed by [`Source::identity`], created once and shared.
#[derive(Debug, Default)]
pub struct StorageRegistry {
    entries: Mutex<FxHashMap<SourceId, Arc<IndexStorage>>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles for `source`, creating them on first use. The normalization
    /// table is loaded when requested and not already present.
    pub fn get_or_create(
        &self,
        source: &Arc<dyn Source>,
        shardlevel: u32,
        load_normalization: bool,
    ) -> Result<Arc<IndexStorage>, StoreError> {
        let identity = source.identity();
        let existing = self.lookup(identity)?;
        let storage = match existing {
            Some(storage) => storage,
            None => {
                let created = Arc::new(IndexStorage {
                    store: Arc::new(SourceShardStore::new(source.clone(), shardlevel)),
                    dictionary: Arc::new(PhraseDictionary::from_source(source.as_ref())?),
                });
                let mut entries = self
                    .entries
                    .lock()
                    .map_err(|_| StoreError::Poisoned { what: "storage registry" })?;
                entries.entry(identity).or_insert(created).clone()
            }
        };

        if load_normalization && !storage.dictionary.has_normalization_cache() {
            let loaded = storage.dictionary.load_normalization_from(source.as_ref())?;
            debug!(identity, loaded, "normalization cache");
        }
        Ok(storage)
    }

    pub fn lookup(&self, identity: SourceId) -> Result<Option<Arc<IndexStorage>>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Poisoned { what: "storage registry" })?;
        Ok(entries.get(&identity).cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_store::MemorySource;

    #[test]
    fn same_identity_shares_handles() {
        let registry = StorageRegistry::new();
        let a = MemorySource::default();
        let a1: Arc<dyn Source> = Arc::new(a.clone());
        let a2: Arc<dyn Source> = Arc::new(a);
        let b: Arc<dyn Source> = Arc::new(MemorySource::default());

        let s1 = registry.get_or_create(&a1, 0, false).unwrap();
        let s2 = registry.get_or_create(&a2, 0, false).unwrap();
        let s3 = registry.get_or_create(&b, 0, false).unwrap();
        assert!(Arc::ptr_eq(&s1, &s2));
        assert!(!Arc::ptr_eq(&s1, &s3));
        assert_eq!(registry.len(), 2);
    }
}

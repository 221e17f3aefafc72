//! The merged output of a build and its persistence.

use std::collections::BTreeSet;
use std::sync::Arc;

use atlas_core::errors::StoreError;
use atlas_core::traits::{GeocoderData, ShardStore, Source};
use atlas_core::types::{Document, ShardKind};
use atlas_core::FxHashMap;
use atlas_store::dictionary::DICTIONARY_BLOB;
use atlas_store::{PhraseDictionary, SourceShardStore};
use serde::Serialize;
use tracing::debug;

use crate::freq::FreqTable;
use crate::patch::Patch;

/// Accumulated shards for one index.
///
/// `term`, `grid` and `degen` postings append; `phrase` entries keep the
/// first value merged for a key.
#[derive(Debug, Clone, Default)]
pub struct ShardSet {
    pub term: FxHashMap<u64, Vec<u64>>,
    pub phrase: FxHashMap<u64, Vec<u64>>,
    pub grid: FxHashMap<u64, Vec<u64>>,
    pub degen: FxHashMap<u64, Vec<u64>>,
    pub freq: FreqTable,
    pub docs: Vec<Document>,
    pub dictionary: BTreeSet<String>,
}

/// Summary returned by `analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShardStats {
    pub term: usize,
    pub phrase: usize,
    pub grid: usize,
    pub degen: usize,
    pub freq: usize,
    pub total_postings: usize,
    pub dictionary: usize,
    pub features: usize,
}

fn append(into: &mut FxHashMap<u64, Vec<u64>>, from: FxHashMap<u64, Vec<u64>>) {
    for (key, postings) in from {
        into.entry(key).or_default().extend(postings);
    }
}

fn first_wins(into: &mut FxHashMap<u64, Vec<u64>>, from: FxHashMap<u64, Vec<u64>>) {
    for (key, postings) in from {
        into.entry(key).or_insert(postings);
    }
}

impl ShardSet {
    pub fn new(freq: FreqTable) -> Self {
        Self {
            freq,
            ..Default::default()
        }
    }

    pub fn merge_patch(&mut self, patch: Patch) {
        append(&mut self.term, patch.term);
        append(&mut self.grid, patch.grid);
        append(&mut self.degen, patch.degen);
        first_wins(&mut self.phrase, patch.phrase);
        self.docs.extend(patch.docs);
        self.dictionary.extend(patch.texts);
    }

    /// Merge a whole shard set with the same rules as patches; frequencies
    /// sum and `__MAX__` keeps the larger value.
    pub fn merge(&mut self, other: ShardSet) {
        append(&mut self.term, other.term);
        append(&mut self.grid, other.grid);
        append(&mut self.degen, other.degen);
        first_wins(&mut self.phrase, other.phrase);
        self.freq.merge(&other.freq);
        self.docs.extend(other.docs);
        self.dictionary.extend(other.dictionary);
    }

    pub fn shard(&self, kind: ShardKind) -> Option<&FxHashMap<u64, Vec<u64>>> {
        match kind {
            ShardKind::Term => Some(&self.term),
            ShardKind::Phrase => Some(&self.phrase),
            ShardKind::Grid => Some(&self.grid),
            ShardKind::Degen => Some(&self.degen),
            ShardKind::Freq => None,
        }
    }

    /// Entries of `kind`, sorted by key.
    pub fn entries(&self, kind: ShardKind) -> Vec<(u64, Vec<u64>)> {
        match self.shard(kind) {
            Some(map) => {
                let mut entries: Vec<(u64, Vec<u64>)> =
                    map.iter().map(|(k, v)| (*k, v.clone())).collect();
                entries.sort_unstable_by_key(|(k, _)| *k);
                entries
            }
            None => self.freq.entries(),
        }
    }

    pub fn stats(&self) -> ShardStats {
        let total_postings = [&self.term, &self.phrase, &self.grid, &self.degen]
            .iter()
            .flat_map(|m| m.values())
            .map(Vec::len)
            .sum();
        ShardStats {
            term: self.term.len(),
            phrase: self.phrase.len(),
            grid: self.grid.len(),
            degen: self.degen.len(),
            freq: self.freq.len(),
            total_postings,
            dictionary: self.dictionary.len(),
            features: self.docs.len(),
        }
    }

    /// Merge this set into `store`: appended kinds extend what is stored,
    /// phrases keep the stored value, frequencies add up.
    pub fn write_to(&self, store: &dyn ShardStore) -> Result<(), StoreError> {
        for kind in [ShardKind::Term, ShardKind::Grid, ShardKind::Degen] {
            for (key, postings) in self.entries(kind) {
                let mut merged = store.get(kind, key)?.unwrap_or_default();
                merged.extend(postings);
                store.put(kind, key, merged)?;
            }
        }
        for (key, terms) in self.entries(ShardKind::Phrase) {
            if store.get(ShardKind::Phrase, key)?.is_none() {
                store.put(ShardKind::Phrase, key, terms)?;
            }
        }
        let mut freq = FreqTable::from_store(store)?;
        freq.merge(&self.freq);
        for (key, value) in freq.entries() {
            store.put(ShardKind::Freq, key, value)?;
        }
        Ok(())
    }

    /// Persist into `to`: shards through `store` (a handle over `to`),
    /// the dictionary blob, and every document through its feature store.
    /// `dictionary` receives the new phrases so live readers see them.
    pub fn persist(
        &self,
        to: &dyn Source,
        store: &SourceShardStore,
        dictionary: &PhraseDictionary,
    ) -> Result<(), StoreError> {
        let data: &dyn GeocoderData = to.geocoder_data().ok_or(StoreError::Unsupported {
            capability: "geocoder data",
        })?;
        self.write_to(store)?;
        let shards = store.flush()?;

        for text in &self.dictionary {
            dictionary.insert(text.clone())?;
        }
        data.put_geocoder_data(DICTIONARY_BLOB, 0, dictionary.to_bytes()?)?;

        if let Some(features) = to.features() {
            for doc in &self.docs {
                features.put_feature(doc)?;
            }
        }
        debug!(
            shards,
            phrases = self.dictionary.len(),
            features = self.docs.len(),
            "persisted shard set"
        );
        Ok(())
    }

    /// Read a stored shard set back from `source`.
    pub fn load(source: Arc<dyn Source>, shardlevel: u32) -> Result<Self, StoreError> {
        let store = SourceShardStore::new(source.clone(), shardlevel);
        let mut set = ShardSet::new(FreqTable::from_store(&store)?);
        for kind in [ShardKind::Term, ShardKind::Phrase, ShardKind::Grid, ShardKind::Degen] {
            let mut map = FxHashMap::default();
            for key in store.keys(kind)? {
                if let Some(postings) = store.get(kind, key)? {
                    map.insert(key, postings);
                }
            }
            match kind {
                ShardKind::Term => set.term = map,
                ShardKind::Phrase => set.phrase = map,
                ShardKind::Grid => set.grid = map,
                _ => set.degen = map,
            }
        }
        let dictionary = PhraseDictionary::from_source(source.as_ref())?;
        set.dictionary = dictionary.phrases()?.into_iter().collect();
        if let Some(features) = source.features() {
            for id in features.feature_ids()? {
                if let Some(doc) = features.get_feature(id)? {
                    set.docs.push(doc);
                }
            }
        }
        Ok(set)
    }
}

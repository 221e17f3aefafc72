//! Federation of opened indexes: per-index metadata, lookup registries and
//! the stack compatibility matrix.

pub mod index;
pub mod language;
pub mod loader;
pub mod open_handle;
pub mod storage;

pub use index::{DeriveOptions, LoadedIndex};
pub use language::{closest_lang_label, LanguageSet};
pub use loader::{load, SourceList};
pub use open_handle::OpenHandle;
pub use storage::{IndexStorage, StorageRegistry};

use std::collections::BTreeMap;
use std::sync::Arc;

use atlas_core::traits::SourceId;

/// Every opened index with registries by name, type, subtype and stack.
/// Registries hold `idx` values into `by_idx`.
#[derive(Debug)]
pub struct Federation {
    by_idx: Vec<Arc<LoadedIndex>>,
    by_name: BTreeMap<String, Vec<usize>>,
    by_type: BTreeMap<String, Vec<usize>>,
    by_subtype: BTreeMap<String, Vec<usize>>,
    by_stack: BTreeMap<String, Vec<usize>>,
    storage: StorageRegistry,
    options: DeriveOptions,
}

fn register(map: &mut BTreeMap<String, Vec<usize>>, key: &str, idx: usize) {
    map.entry(key.to_string()).or_default().push(idx);
}

impl Federation {
    pub(crate) fn new(
        by_idx: Vec<Arc<LoadedIndex>>,
        storage: StorageRegistry,
        options: DeriveOptions,
    ) -> Self {
        let mut by_name = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        let mut by_subtype = BTreeMap::new();
        let mut by_stack = BTreeMap::new();
        for index in &by_idx {
            register(&mut by_name, &index.name, index.idx);
            for t in &index.types {
                register(&mut by_type, t, index.idx);
            }
            for st in index.subtypes() {
                register(&mut by_subtype, &st, index.idx);
            }
            for tag in &index.stack {
                register(&mut by_stack, tag, index.idx);
            }
        }
        Self {
            by_idx,
            by_name,
            by_type,
            by_subtype,
            by_stack,
            storage,
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.by_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_idx.is_empty()
    }

    pub fn indexes(&self) -> &[Arc<LoadedIndex>] {
        &self.by_idx
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<LoadedIndex>> {
        self.by_idx.get(idx)
    }

    fn resolve(&self, map: &BTreeMap<String, Vec<usize>>, key: &str) -> Vec<&Arc<LoadedIndex>> {
        map.get(key)
            .map(|ids| ids.iter().filter_map(|i| self.by_idx.get(*i)).collect())
            .unwrap_or_default()
    }

    pub fn by_name(&self, name: &str) -> Vec<&Arc<LoadedIndex>> {
        self.resolve(&self.by_name, name)
    }

    pub fn by_type(&self, index_type: &str) -> Vec<&Arc<LoadedIndex>> {
        self.resolve(&self.by_type, index_type)
    }

    pub fn by_subtype(&self, subtype: &str) -> Vec<&Arc<LoadedIndex>> {
        self.resolve(&self.by_subtype, subtype)
    }

    pub fn by_stack(&self, tag: &str) -> Vec<&Arc<LoadedIndex>> {
        self.resolve(&self.by_stack, tag)
    }

    /// The loaded index backed by the storage of `identity`, if any.
    pub fn by_identity(&self, identity: SourceId) -> Option<&Arc<LoadedIndex>> {
        self.by_idx.iter().find(|i| i.source.identity() == identity)
    }

    pub fn storage(&self) -> &StorageRegistry {
        &self.storage
    }

    pub fn options(&self) -> &DeriveOptions {
        &self.options
    }
}

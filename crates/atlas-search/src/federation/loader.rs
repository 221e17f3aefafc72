//! Opening a set of Sources into a [`Federation`].

use std::sync::Arc;

use atlas_core::errors::{LoadError, StoreError};
use atlas_core::events::types::IndexLoadedEvent;
use atlas_core::events::EventDispatcher;
use atlas_core::traits::Source;
use atlas_core::types::SourceInfo;
use rayon::prelude::*;
use tracing::{debug, info};

use super::index::{derive, stack_mask, DeriveOptions, LoadedIndex};
use super::storage::StorageRegistry;
use super::Federation;

/// Sources to open, in configuration order, keyed by index id.
pub type SourceList = Vec<(String, Arc<dyn Source>)>;

fn open_one(id: &str, source: &Arc<dyn Source>) -> Result<SourceInfo, LoadError> {
    let wrap = |source: StoreError| LoadError::SourceOpen {
        index: id.to_string(),
        source,
    };
    source.open().map_err(wrap)?;
    let info = source.info().map_err(wrap)?;
    debug!(index = id, "opened source");
    Ok(info)
}

/// Open every source on a pool of `concurrency` threads, then derive the
/// indexes in configuration order. The first failure aborts the load.
pub fn load(
    sources: SourceList,
    options: DeriveOptions,
    concurrency: usize,
    events: &EventDispatcher,
) -> Result<Federation, LoadError> {
    if sources.is_empty() {
        return Err(LoadError::NoIndexes);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .thread_name(|i| format!("atlas-open-{i}"))
        .build()
        .map_err(|_| LoadError::Interrupted)?;
    let infos: Vec<SourceInfo> = pool.install(|| {
        sources
            .par_iter()
            .map(|(id, source)| open_one(id, source))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let storage = StorageRegistry::new();
    let mut names: Vec<String> = Vec::new();
    let mut indexes: Vec<LoadedIndex> = Vec::with_capacity(sources.len());

    for (idx, ((id, source), info)) in sources.into_iter().zip(infos).enumerate() {
        let derived = derive(&id, &info, &options)?;
        let ndx = match names.iter().position(|n| *n == derived.name) {
            Some(ndx) => ndx,
            None => {
                names.push(derived.name.clone());
                names.len() - 1
            }
        };
        let handles = storage
            .get_or_create(&source, derived.shardlevel, info.use_normalization_cache)
            .map_err(|source| LoadError::SourceOpen {
                index: id.clone(),
                source,
            })?;

        let index = LoadedIndex::assemble(id, &info, derived, source, handles, idx, ndx);
        info!(
            index = %index.id,
            name = %index.name,
            idx,
            version = index.version,
            zoom = index.zoom,
            "index loaded"
        );
        events.emit_index_loaded(&IndexLoadedEvent {
            id: index.id.clone(),
            name: index.name.clone(),
            idx,
            version: index.version,
        });
        indexes.push(index);
    }

    let stacks: Vec<Vec<String>> = indexes.iter().map(|i| i.stack.clone()).collect();
    for index in &mut indexes {
        index.bmask = stacks.iter().map(|other| stack_mask(&index.stack, other)).collect();
    }

    Ok(Federation::new(
        indexes.into_iter().map(Arc::new).collect(),
        storage,
        options,
    ))
}

//! Merge stored shard sets of several Sources into one.

use std::sync::Arc;

use atlas_core::errors::StoreError;
use atlas_core::traits::Source;
use tracing::info;

use super::{shardlevel_of, while_writing, IndexTarget};
use crate::shard_set::{ShardSet, ShardStats};

/// Merge `sources` in order into `target`. Later sources append postings;
/// the first source to define a phrase keeps it.
pub fn merge_sources(
    sources: &[Arc<dyn Source>],
    target: IndexTarget<'_>,
) -> Result<ShardStats, StoreError> {
    let mut merged = ShardSet::default();
    for source in sources {
        let level = shardlevel_of(source.as_ref())?;
        merged.merge(ShardSet::load(source.clone(), level)?);
    }

    let to = target.source.as_ref();
    while_writing(to, || merged.persist(to, target.store, target.dictionary))?;

    let stats = merged.stats();
    info!(sources = sources.len(), phrases = stats.phrase, "merged sources");
    Ok(stats)
}

//! Shard statistics for a stored index.

use std::sync::Arc;

use atlas_core::errors::StoreError;
use atlas_core::traits::Source;

use super::shardlevel_of;
use crate::shard_set::{ShardSet, ShardStats};

pub fn analyze_source(source: Arc<dyn Source>) -> Result<ShardStats, StoreError> {
    let level = shardlevel_of(source.as_ref())?;
    Ok(ShardSet::load(source, level)?.stats())
}

//! Page documents out of one Source and index them into another.

use std::sync::Arc;

use atlas_core::errors::{AtlasResult, StoreError};
use atlas_core::traits::{DocPointer, Source};
use atlas_core::types::Document;
use atlas_store::{PhraseDictionary, SourceShardStore};
use serde::Serialize;
use tracing::info;

use crate::builder::IndexBuilder;
use crate::freq::FreqTable;

use super::while_writing;

/// Where an index run writes: the target Source and the storage handles
/// readers of that Source already hold.
pub struct IndexTarget<'a> {
    pub source: Arc<dyn Source>,
    pub store: &'a SourceShardStore,
    pub dictionary: &'a PhraseDictionary,
    pub zoom: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub pages: usize,
    pub phrases: usize,
}

/// Read every page of indexable documents starting at `pointer`.
pub fn collect_docs(
    from: &dyn Source,
    pointer: DocPointer,
) -> Result<(Vec<Document>, usize), StoreError> {
    let indexable = from.indexable().ok_or(StoreError::Unsupported {
        capability: "indexable docs",
    })?;
    let mut docs = Vec::new();
    let mut pages = 0;
    let mut next = Some(pointer);
    while let Some(pointer) = next {
        let (page, following) = indexable.indexable_docs(pointer)?;
        pages += 1;
        docs.extend(page);
        next = following;
    }
    Ok((docs, pages))
}

/// Index the documents of `from` into `target`: frequency pass, parallel
/// build, then persistence of shards, dictionary and features. Nothing is
/// written unless the build succeeds.
pub fn index_source(
    builder: &IndexBuilder,
    from: &dyn Source,
    target: IndexTarget<'_>,
    pointer: DocPointer,
) -> AtlasResult<IndexReport> {
    let (docs, pages) = collect_docs(from, pointer)?;
    let freq = FreqTable::compute(&docs, builder.replacer());
    let documents = docs.len();

    let set = builder.build(docs, &freq, target.zoom)?;
    while_writing(target.source.as_ref(), || {
        set.persist(target.source.as_ref(), target.store, target.dictionary)
    })?;

    info!(documents, pages, phrases = set.dictionary.len(), "indexed source");
    Ok(IndexReport {
        documents,
        pages,
        phrases: set.dictionary.len(),
    })
}

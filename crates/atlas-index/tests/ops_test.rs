//! Tests for index, merge, analyze and copy.

use std::sync::Arc;

use atlas_core::text::phrase_id;
use atlas_core::traits::{Dictionary, DocPointer, FeatureStore, GeocoderData, ShardStore, Source};
use atlas_core::types::{Document, ShardKind, SourceInfo};
use atlas_core::errors::StoreError;
use atlas_index::ops::{
    analyze_source, copy_source, index_source, merge_sources, while_writing, IndexTarget,
};
use atlas_index::{BuildOptions, IndexBuilder};
use atlas_store::{MemorySource, PhraseDictionary, SourceShardStore};

fn info() -> SourceInfo {
    serde_json::from_str(r#"{"geocoder_version":8,"maxzoom":6}"#).unwrap()
}

fn source_with_docs(docs: Vec<Document>) -> MemorySource {
    let source = MemorySource::new(info());
    source.add_docs(docs).unwrap();
    source
}

fn index_into(from: &MemorySource, to: &MemorySource) {
    let target: Arc<dyn Source> = Arc::new(to.clone());
    let store = SourceShardStore::new(target.clone(), 0);
    let dictionary = PhraseDictionary::from_source(to).unwrap();
    let builder = IndexBuilder::new(BuildOptions {
        workers: 2,
        flush_threshold: 10,
    });
    let report = index_source(
        &builder,
        from,
        IndexTarget {
            source: target,
            store: &store,
            dictionary: &dictionary,
            zoom: Some(6),
        },
        DocPointer::new(2),
    )
    .unwrap();
    assert!(report.pages >= 1);
}

#[test]
fn test_index_writes_shards_dictionary_and_features() {
    let from = source_with_docs(vec![
        Document::new(1, "main street").with_center(1.0, 1.0),
        Document::new(2, "oak avenue").with_center(2.0, 2.0),
        Document::new(3, "pine road").with_center(3.0, 3.0),
    ]);
    let to = MemorySource::new(info());
    index_into(&from, &to);

    let store = SourceShardStore::new(Arc::new(to.clone()), 0);
    assert!(store.get(ShardKind::Phrase, phrase_id("oak avenue")).unwrap().is_some());
    assert_eq!(store.get(ShardKind::Freq, 0).unwrap(), Some(vec![6]));

    let dict = PhraseDictionary::from_source(&to).unwrap();
    assert!(dict.has_phrase("pine road", false).unwrap());
    assert_eq!(to.feature_ids().unwrap(), vec![1, 2, 3]);
    assert!(!to.is_writing());
}

#[test]
fn test_failed_index_writes_nothing_and_leaves_writing() {
    let from = source_with_docs(vec![
        Document::new(1, "main street").with_center(1.0, 1.0),
        Document::new(2, " ").with_center(2.0, 2.0),
    ]);
    let to = MemorySource::new(info());
    let target: Arc<dyn Source> = Arc::new(to.clone());
    let store = SourceShardStore::new(target.clone(), 0);
    let dictionary = PhraseDictionary::new();
    let builder = IndexBuilder::new(BuildOptions {
        workers: 2,
        flush_threshold: 10,
    });
    let result = index_source(
        &builder,
        &from,
        IndexTarget {
            source: target,
            store: &store,
            dictionary: &dictionary,
            zoom: Some(6),
        },
        DocPointer::new(2),
    );

    assert!(result.is_err());
    assert!(!to.is_writing());
    assert!(to.feature_ids().unwrap().is_empty());
    assert!(to.geocoder_data_keys().unwrap().is_empty());
}

#[test]
fn test_writing_stops_when_the_body_fails() {
    let to = MemorySource::new(info());
    let result: Result<(), StoreError> = while_writing(&to, || {
        assert!(to.is_writing());
        Err(StoreError::Unsupported { capability: "tiles" })
    });
    assert!(matches!(result, Err(StoreError::Unsupported { capability: "tiles" })));
    assert!(!to.is_writing());

    assert_eq!(while_writing(&to, || Ok(3)).unwrap(), 3);
    assert!(!to.is_writing());
}

#[test]
fn test_merge_appends_and_unions() {
    let a_docs = source_with_docs(vec![Document::new(1, "main street").with_center(1.0, 1.0)]);
    let b_docs = source_with_docs(vec![
        Document::new(2, "main street").with_center(5.0, 5.0),
        Document::new(3, "elm street").with_center(6.0, 6.0),
    ]);
    let a = MemorySource::new(info());
    let b = MemorySource::new(info());
    index_into(&a_docs, &a);
    index_into(&b_docs, &b);

    let to = MemorySource::new(info());
    let target: Arc<dyn Source> = Arc::new(to.clone());
    let store = SourceShardStore::new(target.clone(), 0);
    let dictionary = PhraseDictionary::new();
    let stats = merge_sources(
        &[Arc::new(a) as Arc<dyn Source>, Arc::new(b) as Arc<dyn Source>],
        IndexTarget {
            source: target,
            store: &store,
            dictionary: &dictionary,
            zoom: None,
        },
    )
    .unwrap();
    assert_eq!(stats.features, 3);

    let store = SourceShardStore::new(Arc::new(to.clone()), 0);
    let grid = store.get(ShardKind::Grid, phrase_id("main street")).unwrap().unwrap();
    assert_eq!(grid.len(), 2);
    // "street" appears in three phrases across both sources.
    assert_eq!(store.get(ShardKind::Freq, atlas_core::text::term_id("street")).unwrap(), Some(vec![3]));
    let dict = PhraseDictionary::from_source(&to).unwrap();
    assert_eq!(dict.len(), 2);
}

#[test]
fn test_analyze_counts_shards() {
    let from = source_with_docs(vec![Document::new(1, "main street").with_center(1.0, 1.0)]);
    let to = MemorySource::new(info());
    index_into(&from, &to);

    let stats = analyze_source(Arc::new(to)).unwrap();
    assert_eq!(stats.phrase, 1);
    assert_eq!(stats.term, 2);
    assert_eq!(stats.grid, 1);
    assert_eq!(stats.dictionary, 1);
    assert_eq!(stats.features, 1);
    assert!(stats.degen >= 2);
}

#[test]
fn test_copy_moves_info_blobs_and_features() {
    let from = source_with_docs(vec![Document::new(1, "main street").with_center(1.0, 1.0)]);
    let indexed = MemorySource::new(info());
    index_into(&from, &indexed);

    let copy = MemorySource::default();
    let report = copy_source(&indexed, &copy).unwrap();
    assert_eq!(report.features, 1);
    assert_eq!(
        copy.geocoder_data_keys().unwrap(),
        indexed.geocoder_data_keys().unwrap()
    );
    assert_eq!(report.blobs, indexed.geocoder_data_keys().unwrap().len());
    assert_eq!(copy.info().unwrap().geocoder_version, Some(8));
}

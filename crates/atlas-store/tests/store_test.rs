//! Integration tests for the in-memory storage collaborators.

use std::sync::Arc;
use std::thread;

use atlas_core::traits::{Dictionary, GeocoderData, ShardStore, Source};
use atlas_core::types::{Document, ShardKind, SourceInfo};
use atlas_store::{MemoryShardStore, MemorySource, PhraseDictionary, SourceShardStore};

#[test]
fn test_concurrent_reads_see_consistent_postings() {
    let store = Arc::new(MemoryShardStore::new());
    for key in 0..100u64 {
        store.put(ShardKind::Term, key, vec![key, key + 1]).unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                let keys: Vec<u64> = (0..100).collect();
                store.get_all(ShardKind::Term, &keys).unwrap().len()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), 200);
    }
}

#[test]
fn test_dictionary_loads_from_source_blob() {
    let source = MemorySource::default();
    let dict = PhraseDictionary::from_phrases(["fake street", "# fake street"]);
    source
        .put_geocoder_data("dictionary", 0, dict.to_bytes().unwrap())
        .unwrap();

    let loaded = PhraseDictionary::from_source(&source).unwrap();
    assert!(loaded.has_phrase("# fake street", false).unwrap());
    assert!(loaded.has_phrase("fake", true).unwrap());
    assert!(!loaded.load_normalization_from(&source).unwrap());
}

#[test]
fn test_source_store_reads_level_zero_blob() {
    let source = MemorySource::new(SourceInfo::default());
    source
        .put_geocoder_data("freq", 0, br#"{"0":[12],"7":[3]}"#.to_vec())
        .unwrap();
    let store = SourceShardStore::new(Arc::new(source), 0);
    assert_eq!(store.get(ShardKind::Freq, 0).unwrap(), Some(vec![12]));
    assert_eq!(store.get(ShardKind::Freq, 7).unwrap(), Some(vec![3]));
    assert_eq!(store.get(ShardKind::Freq, 8).unwrap(), None);
    assert_eq!(store.keys(ShardKind::Freq).unwrap(), vec![0, 7]);
}

#[test]
fn test_feature_round_trip_and_listing() {
    let source = MemorySource::default();
    let features = source.features().unwrap();
    features
        .put_feature(&Document::new(3, "fake street").with_center(0.0, 0.0))
        .unwrap();
    features.put_feature(&Document::new(1, "main street")).unwrap();
    assert_eq!(features.feature_ids().unwrap(), vec![1, 3]);
    let doc = features.get_feature(3).unwrap().unwrap();
    assert_eq!(doc.text, "fake street");
    assert!(features.put_feature(&Document::default()).is_err());
}

#[test]
fn test_every_capability_is_offered() {
    let source = MemorySource::default();
    assert!(source.writer().is_some());
    assert!(source.geocoder_data().is_some());
    assert!(source.indexable().is_some());
    assert!(source.features().is_some());
}

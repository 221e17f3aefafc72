//! Tests for turning query text into phrase candidates.

use std::sync::Arc;

use atlas_core::text::phrase_id;
use atlas_core::traits::{Dictionary, ShardStore, Source};
use atlas_core::types::shard::FREQ_MAX_KEY;
use atlas_core::types::{BBox, ShardKind, SourceInfo};
use atlas_search::{phrasematch, Geocoder, GeocoderOptions, LoadedIndex, PhrasematchOptions};
use atlas_store::MemorySource;

fn open(entries: &[(&str, &str)]) -> Geocoder {
    let sources = entries
        .iter()
        .map(|(id, json)| {
            let info: SourceInfo = serde_json::from_str(json).unwrap();
            (id.to_string(), Arc::new(MemorySource::new(info)) as Arc<dyn Source>)
        })
        .collect();
    Geocoder::open(sources, GeocoderOptions::default()).unwrap()
}

fn add_phrases(index: &LoadedIndex, phrases: &[&str]) {
    for p in phrases {
        index.storage.dictionary.insert(*p).unwrap();
    }
}

fn exact() -> PhrasematchOptions {
    PhrasematchOptions::default()
}

fn texts(index: &LoadedIndex, query: &str, options: &PhrasematchOptions) -> Vec<String> {
    phrasematch(index, query, options)
        .unwrap()
        .phrasematches
        .iter()
        .map(|pm| pm.subquery.join(" "))
        .collect()
}

#[test]
fn test_weight_is_covered_over_total() {
    let geocoder = open(&[("streets", r#"{"geocoder_version":8,"maxzoom":6}"#)]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["main street", "springfield"]);

    let result = phrasematch(index, "Main Street, Springfield", &exact()).unwrap();
    assert_eq!(result.phrasematches.len(), 2);
    let main = &result.phrasematches[0];
    assert_eq!(main.subquery, vec!["main", "street"]);
    assert_eq!(main.weight, 2.0 / 3.0);
    assert_eq!(main.mask, 0b011);
    assert_eq!(main.phrase, phrase_id("main street"));
    assert_eq!(main.zoom, 6);
    let city = &result.phrasematches[1];
    assert_eq!(city.weight, 1.0 / 3.0);
    assert_eq!(city.mask, 0b100);
}

#[test]
fn test_literal_match_without_normalizations() {
    let geocoder = open(&[("streets", r#"{"geocoder_version":8}"#)]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["main street"]);

    assert_eq!(texts(index, "main street", &exact()), vec!["main street"]);
    assert!(texts(index, "elm street", &exact()).is_empty());
}

#[test]
fn test_prefix_scan_only_for_the_last_token() {
    let geocoder = open(&[("streets", r#"{"geocoder_version":8}"#)]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["main street"]);

    let auto = PhrasematchOptions {
        autocomplete: true,
        ..Default::default()
    };
    let result = phrasematch(index, "main str", &auto).unwrap();
    assert_eq!(result.phrasematches.len(), 1);
    assert!(result.phrasematches[0].prefix);
    // without autocomplete only whole phrases match
    assert!(texts(index, "main", &exact()).is_empty());
}

#[test]
fn test_normalization_variants() {
    let geocoder = open(&[(
        "streets",
        r#"{"geocoder_version":8,"use_normalization_cache":true}"#,
    )]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["st marks", "saint marks"]);
    index
        .storage
        .dictionary
        .load_normalization_cache(br#"{"st marks":["saint marks"]}"#)
        .unwrap();

    let result = phrasematch(index, "st marks", &exact()).unwrap();
    assert_eq!(result.phrasematches.len(), 1);
    assert_eq!(result.phrasematches[0].subquery, vec!["saint", "marks"]);
    assert_eq!(result.phrasematches[0].weight, 1.0);

    let auto = PhrasematchOptions {
        autocomplete: true,
        ..Default::default()
    };
    let result = phrasematch(index, "st marks", &auto).unwrap();
    let variants: Vec<(String, bool)> = result
        .phrasematches
        .iter()
        .map(|pm| (pm.subquery.join(" "), pm.prefix))
        .collect();
    assert_eq!(
        variants,
        vec![("st marks".to_string(), true), ("saint marks".to_string(), false)]
    );
    assert!(result.phrasematches.iter().all(|pm| pm.weight == 1.0));
}

#[test]
fn test_short_prefix_skips_normalizations_by_characters() {
    let geocoder = open(&[(
        "schools",
        r#"{"geocoder_version":8,"use_normalization_cache":true}"#,
    )]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["éc", "ecole"]);
    index
        .storage
        .dictionary
        .load_normalization_cache(r#"{"éc":["ecole"]}"#.as_bytes())
        .unwrap();

    let auto = PhrasematchOptions {
        autocomplete: true,
        ..Default::default()
    };
    // two characters, three bytes
    let result = phrasematch(index, "éc", &auto).unwrap();
    let variants: Vec<(String, bool)> = result
        .phrasematches
        .iter()
        .map(|pm| (pm.subquery.join(" "), pm.prefix))
        .collect();
    assert_eq!(variants, vec![("éc".to_string(), true)]);
}

#[test]
fn test_address_numbers_are_tokenized() {
    let geocoder = open(&[("address", r#"{"geocoder_version":8,"geocoder_address":true}"#)]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["# fake street"]);

    let result = phrasematch(index, "9 fake street", &exact()).unwrap();
    assert_eq!(result.phrasematches.len(), 1);
    assert_eq!(result.phrasematches[0].subquery, vec!["#", "fake", "street"]);
    assert_eq!(result.phrasematches[0].mask, 0b111);
    assert_eq!(result.phrasematches[0].weight, 1.0);

    let auto = PhrasematchOptions {
        autocomplete: true,
        ..Default::default()
    };
    let result = phrasematch(index, "9", &auto).unwrap();
    assert_eq!(result.phrasematches.len(), 1);
    assert!(!result.phrasematches[0].prefix);
}

#[test]
fn test_stack_and_bbox_filters() {
    let geocoder = open(&[
        ("us", r#"{"geocoder_version":8,"geocoder_stack":"us","bounds":[-125,24,-66,49]}"#),
        ("global", r#"{"geocoder_version":8}"#),
    ]);
    let us = geocoder.federation().get(0).unwrap();
    let global = geocoder.federation().get(1).unwrap();
    add_phrases(us, &["main street"]);
    add_phrases(global, &["main street"]);

    let ca = PhrasematchOptions {
        stacks: Some(vec!["ca".to_string()]),
        ..Default::default()
    };
    assert!(texts(us, "main street", &ca).is_empty());
    assert_eq!(texts(global, "main street", &ca).len(), 1);

    let europe = PhrasematchOptions {
        bbox: Some(BBox([0.0, 40.0, 10.0, 50.0])),
        ..Default::default()
    };
    assert!(texts(us, "main street", &europe).is_empty());
    assert_eq!(texts(global, "main street", &europe).len(), 1);
}

#[test]
fn test_language_slots() {
    let geocoder = open(&[("place", r#"{"geocoder_version":8,"geocoder_languages":["en","de"]}"#)]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["berlin"]);

    let slot = |language: Option<&str>| {
        let options = PhrasematchOptions {
            language: language.map(|l| vec![l.to_string()]),
            ..Default::default()
        };
        phrasematch(index, "berlin", &options).unwrap().phrasematches[0].languages.clone()
    };
    assert_eq!(slot(None), vec![0]);
    assert_eq!(slot(Some("de")), vec![1]);
    assert_eq!(slot(Some("en-GB")), vec![2]);
    assert_eq!(slot(Some("fr")), vec![128]);
}

#[test]
fn test_result_carries_index_masks_and_scorefactor() {
    let geocoder = open(&[
        ("a", r#"{"geocoder_version":8,"geocoder_stack":"us"}"#),
        ("b", r#"{"geocoder_version":8,"geocoder_stack":"ca"}"#),
    ]);
    let b = geocoder.federation().get(1).unwrap();
    add_phrases(b, &["main street"]);
    let result = phrasematch(b, "main street", &exact()).unwrap();
    assert_eq!(result.idx, 1);
    assert_eq!(result.nmask, 1 << 1);
    assert_eq!(result.bmask, vec![1, 0]);
    assert_eq!(result.phrasematches[0].scorefactor, 1);

    b.storage.store.put(ShardKind::Freq, FREQ_MAX_KEY, vec![40]).unwrap();
    let result = phrasematch(b, "main street", &exact()).unwrap();
    assert_eq!(result.phrasematches[0].scorefactor, 40);
}

#[test]
fn test_index_token_rules_apply_to_the_query() {
    let geocoder = open(&[(
        "streets",
        r#"{"geocoder_version":8,"geocoder_tokens":{"Street":"St"}}"#,
    )]);
    let index = geocoder.federation().get(0).unwrap();
    add_phrases(index, &["main st"]);
    assert_eq!(texts(index, "Main Street", &exact()), vec!["main st"]);
}

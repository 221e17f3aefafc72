use std::sync::Arc;

use atlas_core::text::{phrase_id, term_id};
use atlas_core::traits::{ShardStore, Source};
use atlas_core::types::grid::GridPosting;
use atlas_core::types::shard::FREQ_TOTAL_KEY;
use atlas_core::types::{ShardKind, SourceInfo};
use atlas_search::federation::index::stack_mask;
use atlas_search::relevance::{
    resolve_features, score_phrases, PhraseScore, QueryHit, QueryMap, ScoredPhrases,
};
use atlas_search::{phrasematch, Geocoder, GeocoderOptions, PhrasematchOptions};
use atlas_store::{MemorySource, MemoryShardStore};
use proptest::prelude::*;

const WORDS: [&str; 8] = [
    "north", "main", "street", "spring", "field", "river", "oak", "hill",
];

fn arb_stack() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(prop::sample::select(vec!["us", "ca", "mx", "gb"]), 0..3)
        .prop_map(|s| s.into_iter().map(str::to_string).collect())
}

// ── Stack mask ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn stack_mask_marks_only_disjoint_non_empty_pairs(a in arb_stack(), b in arb_stack()) {
        let disjoint = !a.iter().any(|s| b.contains(s));
        let expected = u8::from(!a.is_empty() && !b.is_empty() && disjoint);
        prop_assert_eq!(stack_mask(&a, &b), expected);
        prop_assert_eq!(stack_mask(&a, &b), stack_mask(&b, &a));
    }
}

// ── Phrasematch weight ──────────────────────────────────────────────────────

fn arb_query() -> impl Strategy<Value = (Vec<String>, usize, usize)> {
    Just(WORDS.to_vec())
        .prop_shuffle()
        .prop_flat_map(|words| (1..=6usize).prop_map(move |n| words[..n].to_vec()))
        .prop_flat_map(|words| {
            let n = words.len();
            (0..n).prop_flat_map(move |start| {
                let words = words.clone();
                ((start + 1)..=n).prop_map(move |end| {
                    (words.iter().map(|w| w.to_string()).collect(), start, end)
                })
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn weight_is_the_covered_share_of_the_query((words, start, end) in arb_query()) {
        let info: SourceInfo = serde_json::from_str(r#"{"geocoder_version":8}"#).unwrap();
        let source: Arc<dyn Source> = Arc::new(MemorySource::new(info));
        let geocoder =
            Geocoder::open(vec![("idx".to_string(), source)], GeocoderOptions::default()).unwrap();
        let index = geocoder.federation().get(0).unwrap();
        let phrase = words[start..end].join(" ");
        index.storage.dictionary.insert(phrase.clone()).unwrap();

        let result = phrasematch(index, &words.join(" "), &PhrasematchOptions::default()).unwrap();
        prop_assert_eq!(result.phrasematches.len(), 1);
        let pm = &result.phrasematches[0];
        prop_assert_eq!(pm.subquery.join(" "), phrase);
        prop_assert_eq!(pm.weight, (end - start) as f64 / words.len() as f64);
        prop_assert_eq!(pm.positions(), (start..end).collect::<Vec<_>>());
    }
}

// ── Phrase scoring ──────────────────────────────────────────────────────────

fn arb_phrase() -> impl Strategy<Value = (Vec<&'static str>, Vec<u64>, Vec<bool>)> {
    Just(WORDS.to_vec())
        .prop_shuffle()
        .prop_flat_map(|words| (1..=5usize).prop_map(move |n| words[..n].to_vec()))
        .prop_flat_map(|words| {
            let n = words.len();
            (
                Just(words),
                prop::collection::vec(1u64..50, n),
                prop::collection::vec(any::<bool>(), n),
            )
        })
}

fn store_for(words: &[&str], freqs: &[u64]) -> MemoryShardStore {
    let store = MemoryShardStore::new();
    let terms: Vec<u64> = words.iter().map(|w| term_id(w)).collect();
    store
        .put(ShardKind::Phrase, phrase_id(&words.join(" ")), terms)
        .unwrap();
    for (w, f) in words.iter().zip(freqs) {
        store.put(ShardKind::Freq, term_id(w), vec![*f]).unwrap();
    }
    let corpus: u64 = freqs.iter().sum();
    store.put(ShardKind::Freq, FREQ_TOTAL_KEY, vec![corpus]).unwrap();
    store
}

proptest! {
    #[test]
    fn kept_scores_lie_between_threshold_and_one((words, freqs, mapped) in arb_phrase()) {
        let store = store_for(&words, &freqs);
        let querymap: QueryMap = words
            .iter()
            .enumerate()
            .filter(|(i, _)| mapped[*i])
            .map(|(i, w)| (term_id(w), QueryHit { position: i, distance: 0 }))
            .collect();
        let phrase = phrase_id(&words.join(" "));
        let scored = score_phrases(&store, &[phrase], &querymap, 0.6).unwrap();

        if let Some(score) = scored.scores.get(&phrase) {
            prop_assert!(score.relev > 0.6 && score.relev <= 1.0);
            prop_assert!(score.reason != 0);
        }
        if mapped.iter().all(|m| *m) {
            let score = scored.scores[&phrase];
            prop_assert_eq!(score.relev, 1.0);
            prop_assert_eq!(score.reason, (1u64 << words.len()) - 1);
        }
        let again = score_phrases(&store, &[phrase, phrase], &querymap, 0.6).unwrap();
        prop_assert_eq!(again, scored);
    }
}

// ── Winner per feature ──────────────────────────────────────────────────────

/// Distinct relevances with their features, in shuffled order so phrase
/// ids do not rise with relevance.
fn arb_assignments() -> impl Strategy<Value = Vec<(f64, Vec<u64>)>> {
    prop::collection::btree_set(61u32..100, 1..6)
        .prop_flat_map(|relevs| {
            relevs
                .into_iter()
                .map(|r| {
                    (
                        Just(f64::from(r) / 100.0),
                        prop::collection::btree_set(1u64..6, 1..4)
                            .prop_map(|s| s.into_iter().collect::<Vec<_>>()),
                    )
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

proptest! {
    #[test]
    fn each_feature_keeps_its_best_phrase(assignments in arb_assignments()) {
        let store = MemoryShardStore::new();
        let mut scored = ScoredPhrases::default();
        for (i, (relev, features)) in assignments.iter().enumerate() {
            let phrase = i as u64 + 1;
            let postings = features
                .iter()
                .map(|f| GridPosting::new(*f, 0, 0, 0).encode())
                .collect();
            store.put(ShardKind::Grid, phrase, postings).unwrap();
            scored.phrases.push(phrase);
            scored.scores.insert(
                phrase,
                PhraseScore { relev: *relev, reason: 1, sort_key: relev * 1e6 + 1.0 },
            );
        }

        let resolved = resolve_features(&store, &scored, 2, "idx").unwrap();
        for (feature, relev) in &resolved.features {
            let best = assignments
                .iter()
                .filter(|(_, fs)| fs.contains(feature))
                .map(|(r, _)| *r)
                .fold(f64::MIN, f64::max);
            prop_assert_eq!(relev.relev, best);
            prop_assert_eq!(relev.global_id, 2 * 100_000_000_000_000 + feature);
        }
        let covered: std::collections::BTreeSet<u64> =
            assignments.iter().flat_map(|(_, fs)| fs.iter().copied()).collect();
        prop_assert_eq!(resolved.features.len(), covered.len());
    }
}

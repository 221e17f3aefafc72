use atlas_core::FxHashMap;
use atlas_index::{Patch, ShardSet};
use proptest::prelude::*;

fn arb_postings() -> impl Strategy<Value = FxHashMap<u64, Vec<u64>>> {
    prop::collection::hash_map(0u64..20, prop::collection::vec(any::<u64>(), 1..4), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

fn arb_patch() -> impl Strategy<Value = Patch> {
    (arb_postings(), arb_postings(), arb_postings()).prop_map(|(term, phrase, grid)| Patch {
        term,
        phrase,
        grid,
        ..Default::default()
    })
}

fn sorted(map: &FxHashMap<u64, Vec<u64>>) -> Vec<(u64, Vec<u64>)> {
    let mut out: Vec<(u64, Vec<u64>)> = map
        .iter()
        .map(|(k, v)| {
            let mut v = v.clone();
            v.sort_unstable();
            (*k, v)
        })
        .collect();
    out.sort();
    out
}

// ── Appended kinds do not depend on patch arrival order ─────────────────────

proptest! {
    #[test]
    fn term_and_grid_merge_is_order_independent(patches in prop::collection::vec(arb_patch(), 1..6)) {
        let mut forward = ShardSet::default();
        for p in patches.iter().cloned() {
            forward.merge_patch(p);
        }
        let mut backward = ShardSet::default();
        for p in patches.iter().rev().cloned() {
            backward.merge_patch(p);
        }
        prop_assert_eq!(sorted(&forward.term), sorted(&backward.term));
        prop_assert_eq!(sorted(&forward.grid), sorted(&backward.grid));
    }

    #[test]
    fn term_merge_is_concatenation(a in arb_patch(), b in arb_patch()) {
        let mut set = ShardSet::default();
        set.merge_patch(a.clone());
        set.merge_patch(b.clone());
        for (key, postings) in &set.term {
            let mut expected = a.term.get(key).cloned().unwrap_or_default();
            expected.extend(b.term.get(key).cloned().unwrap_or_default());
            prop_assert_eq!(postings, &expected);
        }
    }

    #[test]
    fn first_merged_phrase_wins(a in arb_patch(), b in arb_patch()) {
        let mut set = ShardSet::default();
        set.merge_patch(a.clone());
        set.merge_patch(b.clone());
        for (key, terms) in &set.phrase {
            let expected = a.phrase.get(key).or_else(|| b.phrase.get(key)).unwrap();
            prop_assert_eq!(terms, expected);
        }
    }
}

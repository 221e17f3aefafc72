use atlas_core::text::{
    degenerates, encode_degen, num_tokenize, permutations, sort_mod4, term_id, tokenize,
    uniq_permutations,
};
use atlas_core::types::grid::{feature_id, GridPosting, FEATURE_ID_MOD};
use proptest::prelude::*;

fn arb_query() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9]{1,6}", 1..7)
}

// ── Subqueries cover every contiguous run exactly once ─────────────────────

proptest! {
    #[test]
    fn permutation_count_is_triangular(tokens in arb_query()) {
        let n = tokens.len();
        let subs = permutations(&tokens);
        prop_assert_eq!(subs.len(), n * (n + 1) / 2);
        for s in &subs {
            prop_assert_eq!(s.mask.count_ones() as usize, s.len());
            prop_assert_eq!(s.ender, s.start() + s.len() == n);
        }
    }

    #[test]
    fn permutations_are_longest_first(tokens in arb_query()) {
        let subs = permutations(&tokens);
        for pair in subs.windows(2) {
            prop_assert!(pair[0].len() >= pair[1].len());
        }
    }

    #[test]
    fn uniq_leaves_no_duplicates(tokens in arb_query()) {
        let mut subs = permutations(&tokens);
        for variant in num_tokenize(&tokens) {
            subs.extend(permutations(&variant));
        }
        let uniq = uniq_permutations(subs);
        let mut keys: Vec<_> = uniq.iter().map(|s| (s.mask, s.text())).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(before, keys.len());
    }
}

// ── Tokens and degenerates ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn tokens_are_lowercase_and_nonempty(text in "[A-Za-z0-9 ,.#-]{0,40}") {
        for token in tokenize(&text) {
            prop_assert!(!token.is_empty());
            prop_assert_eq!(token.clone(), token.to_lowercase());
        }
    }

    #[test]
    fn degenerates_are_prefixes(term in "[a-z]{1,12}") {
        for (degen, dist) in degenerates(&term) {
            prop_assert!(term.starts_with(&degen));
            prop_assert_eq!(term.len() - degen.len(), dist as usize);
            prop_assert!(dist == 0 || degen.len() >= 2);
            prop_assert_eq!(encode_degen(&term, dist) / 4, term_id(&term));
        }
    }

    #[test]
    fn sort_mod4_puts_lower_distance_first(values in prop::collection::vec(any::<u32>(), 1..30)) {
        let mut v: Vec<u64> = values.into_iter().map(u64::from).collect();
        v.sort_by(sort_mod4);
        for pair in v.windows(2) {
            prop_assert!(pair[0] % 4 <= pair[1] % 4);
        }
    }
}

// ── Grid postings keep their feature id ─────────────────────────────────────

proptest! {
    #[test]
    fn posting_feature_id_survives(id in any::<u64>(), score in 0u8..8, x in 0u32..16384, y in 0u32..16384) {
        let posting = GridPosting::new(id, score, x, y).encode();
        prop_assert_eq!(feature_id(posting), id % FEATURE_ID_MOD);
        let decoded = GridPosting::decode(posting);
        prop_assert_eq!((decoded.x, decoded.y, decoded.score), (x, y, score));
    }
}

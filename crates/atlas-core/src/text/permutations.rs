//! Contiguous subqueries of a tokenized query.

use rustc_hash::FxHashSet;

use super::tokenize::{is_address_number, num_token};

/// A contiguous run of query tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    pub tokens: Vec<String>,
    /// Bit `i` is set when original query position `i` is covered.
    pub mask: u64,
    /// Covers the final query token.
    pub ender: bool,
}

impl Subquery {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Original query position of the first token.
    pub fn start(&self) -> usize {
        self.mask.trailing_zeros() as usize
    }

    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Every contiguous subquery, longest first; equal lengths run left to right.
pub fn permutations(tokens: &[String]) -> Vec<Subquery> {
    let n = tokens.len().min(64);
    let mut out = Vec::with_capacity(n * (n + 1) / 2);
    for len in (1..=n).rev() {
        for start in 0..=(n - len) {
            let end = start + len;
            let mask = (start..end).fold(0u64, |m, i| m | (1 << i));
            out.push(Subquery {
                tokens: tokens[start..end].to_vec(),
                mask,
                ender: end == n,
            });
        }
    }
    out
}

/// One copy of `tokens` per address-number position, with that token
/// replaced by its `#` form.
pub fn num_tokenize(tokens: &[String]) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if !is_address_number(token) || token.starts_with('#') {
            continue;
        }
        let mut copy = tokens.to_vec();
        copy[i] = num_token(token);
        out.push(copy);
    }
    out
}

/// Drop repeated subqueries, keyed by coverage mask and text. First wins.
pub fn uniq_permutations(subqueries: Vec<Subquery>) -> Vec<Subquery> {
    let mut seen = FxHashSet::default();
    subqueries
        .into_iter()
        .filter(|s| seen.insert((s.mask, s.text())))
        .collect()
}

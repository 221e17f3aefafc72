//! Degenerate terms: truncated spellings that recall a full term.

use std::cmp::Ordering;

use super::ids::term_id;

/// Largest number of trailing characters a degenerate may drop.
pub const DEGEN_MAX_DISTANCE: usize = 3;

/// The term itself plus prefixes dropping 1..=3 trailing characters, as
/// long as at least two characters remain. Pairs are `(text, distance)`.
pub fn degenerates(term: &str) -> Vec<(String, u64)> {
    let chars: Vec<char> = term.chars().collect();
    let mut out = vec![(term.to_string(), 0)];
    for dist in 1..=DEGEN_MAX_DISTANCE {
        if chars.len() < dist + 2 {
            break;
        }
        let prefix: String = chars[..chars.len() - dist].iter().collect();
        out.push((prefix, dist as u64));
    }
    out
}

/// Posting stored under a degenerate's id: canonical term and distance.
pub fn encode_degen(term: &str, distance: u64) -> u64 {
    term_id(term) * 4 + distance
}

/// Order degen postings by distance class first, then by value.
pub fn sort_mod4(a: &u64, b: &u64) -> Ordering {
    (a % 4).cmp(&(b % 4)).then(a.cmp(b))
}

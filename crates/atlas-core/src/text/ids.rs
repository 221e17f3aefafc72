//! Stable numeric ids for terms, phrases and language sets.

use xxhash_rust::xxh3::xxh3_64;

/// Id of a single token. Ids fit in 52 bits so `id * 4 + distance` never
/// overflows, and key `0` stays reserved for the corpus total.
pub fn term_id(token: &str) -> u64 {
    match xxh3_64(token.as_bytes()) >> 12 {
        0 => 1,
        id => id,
    }
}

/// Id of a space-joined phrase text.
pub fn phrase_id(text: &str) -> u64 {
    term_id(text)
}

/// 8 hex character hash of an ordered language label list.
pub fn lang_hash(labels: &[String]) -> String {
    let joined = labels.join("\u{1f}");
    format!("{:08x}", xxh3_64(joined.as_bytes()) >> 32)
}

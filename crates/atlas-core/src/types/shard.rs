//! Named postings types and shard numbering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of the corpus-wide term total in the `freq` shard.
pub const FREQ_TOTAL_KEY: u64 = 0;

/// Key of the `__MAX__` entry in the `freq` shard: the per-index score
/// normalization scalar.
pub const FREQ_MAX_KEY: u64 = u64::MAX;

/// The postings types a shard store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardKind {
    /// term id → phrase ids containing it
    Term,
    /// phrase id → term id sequence
    Phrase,
    /// phrase id → packed grid postings
    Grid,
    /// degenerate term id → `canonical_term * 4 + distance`
    Degen,
    /// term id → occurrence count, plus the total and `__MAX__` entries
    Freq,
}

impl ShardKind {
    pub const ALL: [ShardKind; 5] = [
        ShardKind::Term,
        ShardKind::Phrase,
        ShardKind::Grid,
        ShardKind::Degen,
        ShardKind::Freq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShardKind::Term => "term",
            ShardKind::Phrase => "phrase",
            ShardKind::Grid => "grid",
            ShardKind::Degen => "degen",
            ShardKind::Freq => "freq",
        }
    }

    pub fn parse(name: &str) -> Option<ShardKind> {
        ShardKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ShardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shard number holding `key` at the given shard level (`16^level` shards).
/// Level 0 keeps everything in shard 0.
pub fn shard_number(key: u64, level: u32) -> u64 {
    if level == 0 {
        return 0;
    }
    let bits = (4 * level).min(63);
    key & ((1u64 << bits) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_names() {
        for kind in ShardKind::ALL {
            assert_eq!(ShardKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ShardKind::parse("dictionary"), None);
    }

    #[test]
    fn shard_level_zero_is_single_shard() {
        assert_eq!(shard_number(12345, 0), 0);
        assert_eq!(shard_number(FREQ_MAX_KEY, 0), 0);
    }

    #[test]
    fn shard_level_masks_low_nibbles() {
        assert_eq!(shard_number(0x1234, 1), 0x4);
        assert_eq!(shard_number(0x1234, 2), 0x34);
    }
}

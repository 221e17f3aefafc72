//! Packed grid postings and the UTFGrid raster consumed by context lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Feature ids occupy the low 25 bits of a grid posting.
pub const FEATURE_ID_BITS: u32 = 25;
/// Modulus applied to a posting to recover its feature id.
pub const FEATURE_ID_MOD: u64 = 1 << FEATURE_ID_BITS;

const SCORE_SHIFT: u32 = 25;
const SCORE_BITS: u32 = 3;
const Y_SHIFT: u32 = 28;
const X_SHIFT: u32 = 42;
const COORD_BITS: u32 = 14;

/// Maximum score class a posting can carry.
pub const MAX_SCORE_CLASS: u8 = (1 << SCORE_BITS) - 1;

/// Decoded view of a grid posting.
///
/// | bits   | field          |
/// |--------|----------------|
/// | 0..25  | feature id     |
/// | 25..28 | score class    |
/// | 28..42 | tile y         |
/// | 42..56 | tile x         |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosting {
    pub feature_id: u64,
    pub score: u8,
    pub x: u32,
    pub y: u32,
}

impl GridPosting {
    pub fn new(feature_id: u64, score: u8, x: u32, y: u32) -> Self {
        Self {
            feature_id: feature_id % FEATURE_ID_MOD,
            score: score.min(MAX_SCORE_CLASS),
            x: x & coord_mask(),
            y: y & coord_mask(),
        }
    }

    pub fn encode(&self) -> u64 {
        (self.feature_id % FEATURE_ID_MOD)
            | (u64::from(self.score.min(MAX_SCORE_CLASS)) << SCORE_SHIFT)
            | (u64::from(self.y & coord_mask()) << Y_SHIFT)
            | (u64::from(self.x & coord_mask()) << X_SHIFT)
    }

    pub fn decode(posting: u64) -> Self {
        Self {
            feature_id: feature_id(posting),
            score: ((posting >> SCORE_SHIFT) & u64::from(MAX_SCORE_CLASS)) as u8,
            y: ((posting >> Y_SHIFT) as u32) & coord_mask(),
            x: ((posting >> X_SHIFT) as u32) & coord_mask(),
        }
    }
}

/// Feature id carried by a packed posting; the high bits are opaque here.
pub fn feature_id(posting: u64) -> u64 {
    posting % FEATURE_ID_MOD
}

/// Score class for `score` relative to the index's `max_score`.
pub fn score_class(score: f64, max_score: f64) -> u8 {
    if !(score > 0.0) || !(max_score > 0.0) {
        return 0;
    }
    let class = (f64::from(MAX_SCORE_CLASS) * score / max_score).ceil();
    class.clamp(0.0, f64::from(MAX_SCORE_CLASS)) as u8
}

fn coord_mask() -> u32 {
    (1 << COORD_BITS) - 1
}

/// Side length of a UTFGrid in cells.
pub const GRID_CELLS: usize = 64;
/// Pixels per UTFGrid cell within a 256 pixel tile.
pub const GRID_RESOLUTION: f64 = 4.0;

/// A decoded UTFGrid: 64 rows of 64 encoded characters, a key table, and
/// the feature properties per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtfGrid {
    pub grid: Vec<String>,
    pub keys: Vec<String>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

impl UtfGrid {
    /// Key stored at cell (`x`, `y`), or `None` for an empty or missing cell.
    pub fn key_at(&self, x: usize, y: usize) -> Option<&str> {
        let row = self.grid.get(y)?;
        let ch = row.chars().nth(x)?;
        let index = resolve_code(ch as u32)?;
        let key = self.keys.get(index)?;
        if key.is_empty() {
            None
        } else {
            Some(key.as_str())
        }
    }
}

/// Map a UTFGrid character code to its key index, skipping the `"` and `\`
/// codepoints the encoding never uses.
pub fn resolve_code(code: u32) -> Option<usize> {
    let mut key = code;
    if key >= 93 {
        key -= 1;
    }
    if key >= 35 {
        key -= 1;
    }
    key.checked_sub(32).map(|k| k as usize)
}

/// Inverse of [`resolve_code`].
pub fn encode_code(index: usize) -> Option<char> {
    let mut code = index as u32 + 32;
    if code >= 34 {
        code += 1;
    }
    if code >= 92 {
        code += 1;
    }
    char::from_u32(code)
}

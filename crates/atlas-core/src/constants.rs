/// Atlas version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The only geocoder format version the federation accepts.
pub const SUPPORTED_GEOCODER_VERSION: u32 = 8;

/// Version recorded for indexes that declare none (shard-level layout).
pub const LEGACY_GEOCODER_VERSION: u32 = 0;

/// Maximum zoom a document may be indexed at.
pub const MAX_INDEX_ZOOM: u8 = 14;

/// Language slot for labels the index does not carry.
pub const UNMATCHED_LANGUAGE_SLOT: u32 = 128;

/// Default index bounds.
pub const DEFAULT_BOUNDS: [f64; 4] = [-180.0, -85.0, 180.0, 85.0];

/// Default `geocoder_address_order`.
pub const DEFAULT_ADDRESS_ORDER: &str = "ascending";

/// Queries are truncated to this many tokens before matching.
pub const MAX_QUERY_TOKENS: usize = 20;

/// Normalization lookups during prefix scans need at least this many chars.
pub const MIN_NORMALIZATION_PREFIX_LEN: usize = 3;

/// Per-character-distance penalty applied to relevance.
pub const CHARDIST_PENALTY: f64 = 0.01;

/// Multiplier combining a relevance score and a matched-term count into a
/// single sort key.
pub const SORT_KEY_SCALE: f64 = 1e6;

/// Multiplier combining an index idx and a feature id into a global id.
pub const GLOBAL_ID_SCALE: u64 = 100_000_000_000_000;

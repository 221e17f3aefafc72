//! # atlas-search
//!
//! Query side of the Atlas geocoder. Opens a federation of indexes, turns
//! query text into phrase candidates, scores them against term
//! frequencies, resolves features through their grids and answers spatial
//! context lookups through a single-flight tile cache.

pub mod context;
pub mod federation;
pub mod geocoder;
pub mod phrasematch;
pub mod relevance;

pub use atlas_core::init_logging;
pub use context::{reset_context_cache, resolve_context, ContextFeature};
pub use federation::{Federation, LoadedIndex, OpenHandle};
pub use geocoder::{GeocodeOptions, GeocodeResult, Geocoder, GeocoderOptions};
pub use phrasematch::{phrasematch, Phrasematch, PhrasematchOptions, PhrasematchResult};
pub use relevance::{Relev, ScoringOptions};

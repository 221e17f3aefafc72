//! # atlas-core
//!
//! Foundation crate for the Atlas geocoder.
//! Defines types, collaborator traits, errors, config, events, tracing
//! setup and the text operations shared by indexing and search.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod text;
pub mod tracing_setup;
pub mod traits;
pub mod types;

pub use config::AtlasConfig;
pub use errors::{AtlasError, AtlasErrorCode, AtlasResult};
pub use tracing_setup::{init_logging, init_tracing};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::{BBox, Document, Geometry, ShardKind, SourceInfo, TileCoord, UtfGrid};

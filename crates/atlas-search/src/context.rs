//! Spatial context: the features found under a point, one per index type.
//!
//! Grids are fetched through a per-index single-flight cache keyed by tile;
//! concurrent lookups of one tile share one fetch.

use std::sync::Arc;

use atlas_core::errors::{SearchError, StoreError};
use atlas_core::traits::Source;
use atlas_core::types::grid::GRID_CELLS;
use atlas_core::types::tile::{pixel, TILE_SIZE};
use atlas_core::types::{TileCoord, UtfGrid};
use moka::sync::Cache;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::federation::{Federation, LoadedIndex};

/// The point itself and the eight cells around it, in scan order.
pub const SCAN_DIRECTIONS: [[i64; 2]; 9] = [
    [-1, 1],
    [-1, 0],
    [-1, -1],
    [0, -1],
    [0, 0],
    [0, 1],
    [1, -1],
    [1, 0],
    [1, 1],
];

const GRID_RESOLUTION: f64 = atlas_core::types::grid::GRID_RESOLUTION;

/// Single-flight grid cache of one index. Entries live until reset.
pub struct GridCache {
    cache: Cache<TileCoord, Option<Arc<UtfGrid>>>,
}

impl GridCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    /// Cached grid of `tile`, fetching it from `source` at most once while
    /// concurrent callers wait for the same result.
    pub fn get_or_fetch(
        &self,
        source: &dyn Source,
        tile: TileCoord,
    ) -> Result<Option<Arc<UtfGrid>>, SearchError> {
        self.cache
            .try_get_with(tile, || {
                debug!(z = tile.z, x = tile.x, y = tile.y, "context cache miss");
                source.get_grid(tile).map(|grid| grid.map(Arc::new))
            })
            .map_err(|e: Arc<StoreError>| SearchError::Context(e.to_string()))
    }

    pub fn reset(&self) {
        self.cache.invalidate_all();
    }

    pub fn contains(&self, tile: &TileCoord) -> bool {
        self.cache.contains_key(tile)
    }
}

impl Default for GridCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A feature found under the point, cleaned for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextFeature {
    /// `type.key`
    pub id: String,
    #[serde(rename = "type")]
    pub feature_type: String,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ContextFeature {
    fn new(key: &str, index_type: &str, data: Option<&Value>) -> Self {
        let mut properties = match data {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        let feature_type = match properties.remove("type") {
            Some(Value::String(t)) => t,
            _ => index_type.to_string(),
        };
        properties.remove("id");
        properties.remove("search");
        properties.remove("rank");
        if let Some(Value::String(bounds)) = properties.get("bounds") {
            let parsed: Vec<Value> = bounds
                .split(',')
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number)
                })
                .collect();
            properties.insert("bounds".to_string(), Value::Array(parsed));
        }
        Self {
            id: format!("{index_type}.{key}"),
            feature_type,
            properties,
        }
    }
}

/// Grid cell of a point inside its tile.
pub fn grid_cell(lon: f64, lat: f64, zoom: u8) -> (usize, usize) {
    let max = (GRID_CELLS - 1) as f64;
    let [px, py] = pixel(lon, lat, zoom);
    let x = ((px % TILE_SIZE) / GRID_RESOLUTION).round().min(max);
    let y = ((py % TILE_SIZE) / GRID_RESOLUTION).round().min(max);
    (x as usize, y as usize)
}

/// First non-empty key found scanning `SCAN_DIRECTIONS` around (x, y).
pub fn scan_grid(grid: &UtfGrid, x: usize, y: usize) -> Option<&str> {
    let max = (GRID_CELLS - 1) as i64;
    SCAN_DIRECTIONS.iter().find_map(|[dx, dy]| {
        let sx = (x as i64 + dx).clamp(0, max) as usize;
        let sy = (y as i64 + dy).clamp(0, max) as usize;
        grid.key_at(sx, sy)
    })
}

fn lookup(index: &LoadedIndex, lon: f64, lat: f64) -> Result<Option<ContextFeature>, SearchError> {
    let tile = TileCoord::containing(lon, lat, index.zoom);
    let Some(grid) = index.grids.get_or_fetch(index.source.as_ref(), tile)? else {
        return Ok(None);
    };
    let (x, y) = grid_cell(lon, lat, index.zoom);
    Ok(scan_grid(&grid, x, y)
        .map(|key| ContextFeature::new(key, &index.index_type, grid.data.get(key))))
}

/// Context of a point across the federation. Indexes are visited in load
/// order up to, not including, the first index of `max_type`; the result
/// is innermost first with empty slots dropped.
pub fn resolve_context(
    federation: &Federation,
    lon: f64,
    lat: f64,
    max_type: Option<&str>,
) -> Result<Vec<ContextFeature>, SearchError> {
    let span = atlas_core::context_span!(lon, lat);
    let _guard = span.enter();

    let indexes = federation.indexes();
    let end = match max_type {
        Some(t) => indexes
            .iter()
            .position(|i| i.index_type == t)
            .ok_or_else(|| SearchError::UnknownType(t.to_string()))?,
        None => indexes.len(),
    };

    let slots: Vec<Option<ContextFeature>> = indexes[..end]
        .par_iter()
        .map(|index| lookup(index, lon, lat))
        .collect::<Result<_, _>>()?;
    Ok(slots.into_iter().rev().flatten().collect())
}

/// Drop every cached grid of every index.
pub fn reset_context_cache(federation: &Federation) {
    for index in federation.indexes() {
        index.grids.reset();
    }
}

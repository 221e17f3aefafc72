//! Spherical mercator tile math and bounding boxes.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Tile edge in pixels.
pub const TILE_SIZE: f64 = 256.0;

const D2R: f64 = PI / 180.0;

/// `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox(pub [f64; 4]);

impl BBox {
    pub const WORLD: BBox = BBox([-180.0, -85.0, 180.0, 85.0]);

    pub fn intersects(&self, other: &BBox) -> bool {
        let a = self.0;
        let b = other.0;
        !(a[0] > b[2] || a[2] < b[0] || a[1] > b[3] || a[3] < b[1])
    }
}

impl Default for BBox {
    fn default() -> Self {
        BBox::WORLD
    }
}

/// A tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Parse a `z/x/y` string.
    pub fn parse(value: &str) -> Option<TileCoord> {
        let mut parts = value.trim().split('/');
        let z = parts.next()?.parse::<u8>().ok()?;
        let x = parts.next()?.parse::<u32>().ok()?;
        let y = parts.next()?.parse::<u32>().ok()?;
        if parts.next().is_some() || z > 30 {
            return None;
        }
        Some(TileCoord { z, x, y })
    }

    /// The tile containing a lon/lat at `zoom`.
    pub fn containing(lon: f64, lat: f64, zoom: u8) -> TileCoord {
        let [px, py] = pixel(lon, lat, zoom);
        let x = ((px - 1.0) / TILE_SIZE).floor().max(0.0);
        let y = ((py - 1.0) / TILE_SIZE).floor().max(0.0);
        TileCoord {
            z: zoom,
            x: x as u32,
            y: y as u32,
        }
    }
}

/// Global pixel coordinates of a lon/lat at `zoom`, clamped to the world.
pub fn pixel(lon: f64, lat: f64, zoom: u8) -> [f64; 2] {
    let size = TILE_SIZE * 2f64.powi(i32::from(zoom));
    let d = size / 2.0;
    let bc = size / 360.0;
    let cc = size / (2.0 * PI);
    let f = (lat * D2R).sin().clamp(-0.9999, 0.9999);
    let x = (d + lon * bc).round();
    let y = (d + 0.5 * ((1.0 + f) / (1.0 - f)).ln() * -cc).round();
    [x.min(size), y.min(size)]
}

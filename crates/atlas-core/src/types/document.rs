//! Documents fed to the index builder.

use serde::{Deserialize, Serialize};

use super::tile::BBox;

/// A feature to be indexed.
///
/// `text` holds comma-separated synonyms; each synonym becomes its own phrase.
/// `zxy` lists explicit `z/x/y` tiles; when empty the builder derives tiles
/// from `center`/`geometry` at the build's default zoom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub center: Option<[f64; 2]>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub zxy: Vec<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub address_numbers: Vec<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_center(mut self, lon: f64, lat: f64) -> Self {
        self.center = Some([lon, lat]);
        self
    }

    pub fn with_zxy(mut self, tiles: &[&str]) -> Self {
        self.zxy = tiles.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_address_numbers(mut self, numbers: &[&str]) -> Self {
        self.address_numbers = numbers.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Non-empty synonyms in declaration order.
    pub fn synonyms(&self) -> impl Iterator<Item = &str> {
        self.text.split(',').map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn has_text(&self) -> bool {
        self.synonyms().next().is_some()
    }

    /// Extent used for tile coverage: the geometry's bbox, or the center.
    pub fn extent(&self) -> Option<BBox> {
        if let Some(bbox) = self.geometry.as_ref().and_then(Geometry::bbox) {
            return Some(bbox);
        }
        self.center.map(|[lon, lat]| BBox([lon, lat, lon, lat]))
    }

    /// The center, falling back to the middle of the geometry's bbox.
    pub fn representative_point(&self) -> Option<[f64; 2]> {
        if let Some(center) = self.center {
            return Some(center);
        }
        let b = self.geometry.as_ref()?.bbox()?.0;
        Some([(b[0] + b[2]) / 2.0, (b[1] + b[3]) / 2.0])
    }
}

/// GeoJSON geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    MultiPoint { coordinates: Vec<[f64; 2]> },
    LineString { coordinates: Vec<[f64; 2]> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    fn for_each_position(&self, f: &mut dyn FnMut([f64; 2])) {
        match self {
            Geometry::Point { coordinates } => f(*coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().copied().for_each(f)
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().copied().for_each(f)
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().for_each(f)
            }
            Geometry::GeometryCollection { geometries } => {
                for g in geometries {
                    g.for_each_position(f);
                }
            }
        }
    }

    /// Bounding box of every position, `None` for an empty geometry.
    pub fn bbox(&self) -> Option<BBox> {
        let mut acc: Option<[f64; 4]> = None;
        self.for_each_position(&mut |[x, y]| {
            acc = Some(match acc {
                None => [x, y, x, y],
                Some([a, b, c, d]) => [a.min(x), b.min(y), c.max(x), d.max(y)],
            });
        });
        acc.map(BBox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_skip_blanks() {
        let doc = Document::new(1, "Main Street, , Main St");
        let syns: Vec<_> = doc.synonyms().collect();
        assert_eq!(syns, vec!["Main Street", "Main St"]);
        assert!(!Document::new(2, " , ").has_text());
    }

    #[test]
    fn geometry_bbox_spans_all_rings() {
        let g: Geometry = serde_json::from_str(
            r#"{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,3],[0,3],[0,0]]]}"#,
        )
        .unwrap();
        assert_eq!(g.bbox(), Some(BBox([0.0, 0.0, 2.0, 3.0])));
        let doc = Document {
            geometry: Some(g),
            ..Document::new(1, "park")
        };
        assert_eq!(doc.representative_point(), Some([1.0, 1.5]));
    }

    #[test]
    fn empty_collection_has_no_bbox() {
        let g = Geometry::GeometryCollection { geometries: vec![] };
        assert_eq!(g.bbox(), None);
    }
}

//! Document validation, phrase extraction and tile coverage.

use atlas_core::constants::MAX_INDEX_ZOOM;
use atlas_core::errors::BuildError;
use atlas_core::text::{num_token, tokenize, TokenReplacer};
use atlas_core::types::{Document, TileCoord};

/// Check every document before any work is dispatched. The first invalid
/// document fails the whole batch.
pub fn validate(docs: &[Document], default_zoom: Option<i64>) -> Result<(), BuildError> {
    for doc in docs {
        let id = match doc.id {
            Some(id) => id,
            None => return Err(BuildError::MissingId),
        };
        if !doc.has_text() {
            return Err(BuildError::MissingText { id });
        }
        if doc.center.is_none() && doc.geometry.is_none() {
            return Err(BuildError::MissingGeometry { id });
        }
        if doc.zxy.is_empty() {
            match default_zoom {
                None => return Err(BuildError::MissingZoom { id }),
                Some(zoom) if !(0..=i64::from(MAX_INDEX_ZOOM)).contains(&zoom) => {
                    return Err(BuildError::ZoomOutOfRange { id, zoom })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Token sequences indexed for a document: one per synonym, plus, for
/// documents carrying address numbers, one per distinct number shape with
/// the `#` form prepended.
pub fn phrases_for(doc: &Document, replacer: &TokenReplacer) -> Vec<Vec<String>> {
    let mut shapes: Vec<String> = doc
        .address_numbers
        .iter()
        .map(|n| num_token(&n.to_lowercase()))
        .filter(|n| n.starts_with('#'))
        .collect();
    shapes.sort();
    shapes.dedup();

    let mut out: Vec<Vec<String>> = Vec::new();
    for synonym in doc.synonyms() {
        let tokens = tokenize(&replacer.replace(synonym));
        if tokens.is_empty() {
            continue;
        }
        for shape in &shapes {
            let mut with_number = Vec::with_capacity(tokens.len() + 1);
            with_number.push(shape.clone());
            with_number.extend(tokens.iter().cloned());
            if !out.contains(&with_number) {
                out.push(with_number);
            }
        }
        if !out.contains(&tokens) {
            out.push(tokens);
        }
    }
    out
}

/// Tiles a document is indexed under: its explicit `zxy` list, or the
/// tiles covering its extent at `zoom`.
pub fn tiles_for(doc: &Document, zoom: Option<i64>) -> Result<Vec<TileCoord>, BuildError> {
    let id = doc.id.unwrap_or_default();
    if !doc.zxy.is_empty() {
        return doc
            .zxy
            .iter()
            .map(|value| {
                TileCoord::parse(value).ok_or_else(|| BuildError::InvalidTile {
                    id,
                    value: value.clone(),
                })
            })
            .collect();
    }

    let zoom = match zoom {
        Some(z) if (0..=i64::from(MAX_INDEX_ZOOM)).contains(&z) => z as u8,
        Some(z) => return Err(BuildError::ZoomOutOfRange { id, zoom: z }),
        None => return Err(BuildError::MissingZoom { id }),
    };
    let extent = doc.extent().ok_or(BuildError::MissingGeometry { id })?;
    let [w, s, e, n] = extent.0;
    let top_left = TileCoord::containing(w, n, zoom);
    let bottom_right = TileCoord::containing(e, s, zoom);

    let mut tiles = Vec::new();
    for x in top_left.x..=bottom_right.x {
        for y in top_left.y..=bottom_right.y {
            tiles.push(TileCoord::new(zoom, x, y));
        }
    }
    Ok(tiles)
}

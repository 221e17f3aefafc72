//! One worker's contribution for one document.

use atlas_core::errors::BuildError;
use atlas_core::text::{degenerates, encode_degen, phrase_id, term_id, TokenReplacer};
use atlas_core::types::grid::{score_class, GridPosting};
use atlas_core::types::Document;
use atlas_core::FxHashMap;

use crate::documents::{phrases_for, tiles_for};
use crate::freq::FreqTable;

/// Postings, payloads and dictionary texts produced for a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub term: FxHashMap<u64, Vec<u64>>,
    pub phrase: FxHashMap<u64, Vec<u64>>,
    pub grid: FxHashMap<u64, Vec<u64>>,
    pub degen: FxHashMap<u64, Vec<u64>>,
    pub docs: Vec<Document>,
    pub texts: Vec<String>,
}

/// Everything a worker needs besides the document itself.
#[derive(Debug, Clone)]
pub struct IndexContext {
    pub freq: FreqTable,
    pub zoom: Option<i64>,
    pub replacer: TokenReplacer,
}

/// Index a single document. Pure given the document and context.
pub fn index_document(doc: &Document, ctx: &IndexContext) -> Result<Patch, BuildError> {
    let id = doc.id.ok_or(BuildError::MissingId)?;
    let tiles = tiles_for(doc, ctx.zoom)?;
    let score = score_class(doc.score.unwrap_or(0.0), ctx.freq.max_score());
    let postings: Vec<u64> = tiles
        .iter()
        .map(|t| GridPosting::new(id, score, t.x, t.y).encode())
        .collect();

    let mut patch = Patch::default();
    for tokens in phrases_for(doc, &ctx.replacer) {
        let text = tokens.join(" ");
        let phrase = phrase_id(&text);
        let terms: Vec<u64> = tokens.iter().map(|t| term_id(t)).collect();

        for (token, term) in tokens.iter().zip(&terms) {
            let phrases = patch.term.entry(*term).or_default();
            if !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
            for (degen, dist) in degenerates(token) {
                let value = encode_degen(token, dist);
                let entry = patch.degen.entry(term_id(&degen)).or_default();
                if !entry.contains(&value) {
                    entry.push(value);
                }
            }
        }
        patch.phrase.entry(phrase).or_insert(terms);
        patch.grid.entry(phrase).or_default().extend(&postings);
        patch.texts.push(text);
    }
    patch.docs.push(doc.clone());
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::types::grid::feature_id;

    fn ctx() -> IndexContext {
        IndexContext {
            freq: FreqTable::default(),
            zoom: Some(6),
            replacer: TokenReplacer::default(),
        }
    }

    #[test]
    fn document_contributes_every_shard_type() {
        let doc = Document::new(7, "Main Street").with_center(1.0, 1.0);
        let patch = index_document(&doc, &ctx()).unwrap();
        let phrase = phrase_id("main street");

        assert_eq!(patch.phrase[&phrase], vec![term_id("main"), term_id("street")]);
        assert_eq!(patch.term[&term_id("main")], vec![phrase]);
        assert_eq!(patch.grid[&phrase].len(), 1);
        assert_eq!(feature_id(patch.grid[&phrase][0]), 7);
        assert!(patch.degen[&term_id("stre")].contains(&encode_degen("street", 2)));
        assert_eq!(patch.texts, vec!["main street"]);
        assert_eq!(patch.docs.len(), 1);
    }

    #[test]
    fn missing_zoom_without_tiles_fails() {
        let doc = Document::new(7, "Main").with_center(1.0, 1.0);
        let ctx = IndexContext { zoom: None, ..ctx() };
        assert!(matches!(index_document(&doc, &ctx), Err(BuildError::MissingZoom { id: 7 })));
    }
}

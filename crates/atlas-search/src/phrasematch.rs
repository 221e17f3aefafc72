//! Query text to weighted phrase candidates for one index.

use std::sync::Arc;

use atlas_core::constants::{MAX_QUERY_TOKENS, MIN_NORMALIZATION_PREFIX_LEN};
use atlas_core::errors::SearchError;
use atlas_core::text::{
    encodable_text, is_address_number, num_tokenize, permutations, phrase_id, tokenize,
    uniq_permutations, Subquery,
};
use atlas_core::traits::{Dictionary, ShardStore};
use atlas_core::types::shard::FREQ_MAX_KEY;
use atlas_core::types::{BBox, ShardKind};
use atlas_store::SourceShardStore;
use tracing::debug;

use crate::federation::language::DEFAULT_LANGUAGE;
use crate::federation::LoadedIndex;

#[derive(Debug, Clone, Default)]
pub struct PhrasematchOptions {
    pub autocomplete: bool,
    /// Only indexes whose stack shares a tag with this list are searched.
    pub stacks: Option<Vec<String>>,
    pub bbox: Option<BBox>,
    /// Requested languages; only the first is used.
    pub language: Option<Vec<String>>,
}

/// A phrase candidate: a subquery variant known to the dictionary.
#[derive(Debug, Clone)]
pub struct Phrasematch {
    pub subquery: Vec<String>,
    /// Tokens covered by the original subquery over all query tokens.
    pub weight: f64,
    pub mask: u64,
    pub phrase: u64,
    pub scorefactor: u64,
    pub idx: usize,
    pub grid: Arc<SourceShardStore>,
    pub zoom: u8,
    pub prefix: bool,
    pub languages: Vec<u32>,
}

impl Phrasematch {
    /// Original query positions covered, ascending.
    pub fn positions(&self) -> Vec<usize> {
        (0..64).filter(|i| self.mask & (1 << i) != 0).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PhrasematchResult {
    pub phrasematches: Vec<Phrasematch>,
    pub idx: usize,
    pub nmask: u64,
    pub bmask: Vec<u8>,
}

impl PhrasematchResult {
    fn empty(index: &LoadedIndex) -> Self {
        Self {
            phrasematches: Vec::new(),
            idx: index.idx,
            nmask: 1u64 << (index.ndx % 64),
            bmask: index.bmask.clone(),
        }
    }
}

struct Variant {
    text: String,
    prefix: bool,
}

/// Score factor recorded at indexing time, `1` when absent.
fn scorefactor(store: &dyn ShardStore) -> Result<u64, SearchError> {
    let max = store
        .get(ShardKind::Freq, FREQ_MAX_KEY)?
        .and_then(|v| v.first().copied())
        .unwrap_or(0);
    Ok(if max == 0 { 1 } else { max })
}

fn candidate_subqueries(index: &LoadedIndex, tokens: &[String]) -> Vec<Subquery> {
    let mut subqueries = permutations(tokens);
    if index.address {
        for numbered in num_tokenize(tokens) {
            subqueries.extend(permutations(&numbered));
        }
    }
    let mut subqueries = uniq_permutations(subqueries);
    subqueries.sort_by(|a, b| b.len().cmp(&a.len()));
    subqueries
}

fn language_slots(index: &LoadedIndex, options: &PhrasematchOptions) -> Vec<u32> {
    let requested = options
        .language
        .as_ref()
        .and_then(|langs| langs.first())
        .map_or(DEFAULT_LANGUAGE, String::as_str);
    vec![index.lang.slot(requested)]
}

/// Candidate phrases of `query` in `index`.
pub fn phrasematch(
    index: &LoadedIndex,
    query: &str,
    options: &PhrasematchOptions,
) -> Result<PhrasematchResult, SearchError> {
    let span = atlas_core::phrasematch_span!(index.id, query);
    let _guard = span.enter();

    let mut tokens = tokenize(&index.token_replacer.replace(query));
    tokens.truncate(MAX_QUERY_TOKENS);

    if let Some(stacks) = &options.stacks {
        if !index.matches_stacks(stacks) {
            debug!(index = %index.id, "stack filter excludes index");
            return Ok(PhrasematchResult::empty(index));
        }
    }
    if let Some(bbox) = &options.bbox {
        if !bbox.intersects(&index.bounds) {
            debug!(index = %index.id, "bbox does not intersect index bounds");
            return Ok(PhrasematchResult::empty(index));
        }
    }

    let store = &index.storage.store;
    let dictionary = index.storage.dictionary.as_ref();
    let scorefactor = scorefactor(store.as_ref())?;
    let languages = language_slots(index, options);
    let mut phrasematches = Vec::new();

    for subquery in candidate_subqueries(index, &tokens) {
        let text = encodable_text(&subquery.tokens);
        if text.is_empty() {
            continue;
        }
        let scan_prefix = subquery.ender && options.autocomplete;
        let try_normalization = index.use_normalization_cache
            && (!scan_prefix || text.chars().count() >= MIN_NORMALIZATION_PREFIX_LEN);

        let literal = Variant {
            text: subquery.text(),
            prefix: scan_prefix,
        };
        let variants = if try_normalization {
            let Some(found) = dictionary.has_phrase_or_normalizations(&text, scan_prefix)? else {
                continue;
            };
            if scan_prefix {
                let mut variants = vec![literal];
                variants.extend(found.normalizations.into_iter().map(|text| Variant { text, prefix: false }));
                variants
            } else if found.normalizations.is_empty() {
                vec![literal]
            } else {
                found
                    .normalizations
                    .into_iter()
                    .map(|text| Variant {
                        text,
                        prefix: scan_prefix,
                    })
                    .collect()
            }
        } else {
            if !dictionary.has_phrase(&text, scan_prefix)? {
                continue;
            }
            vec![literal]
        };

        let weight = subquery.len() as f64 / tokens.len() as f64;
        let numeric = index.address && is_address_number(&text);
        for variant in variants {
            phrasematches.push(Phrasematch {
                subquery: variant.text.split(' ').map(str::to_string).collect(),
                weight,
                mask: subquery.mask,
                phrase: phrase_id(&variant.text),
                scorefactor,
                idx: index.idx,
                grid: store.clone(),
                zoom: index.zoom,
                prefix: variant.prefix && !numeric,
                languages: languages.clone(),
            });
        }
    }

    debug!(index = %index.id, count = phrasematches.len(), "phrasematch");
    Ok(PhrasematchResult {
        phrasematches,
        ..PhrasematchResult::empty(index)
    })
}

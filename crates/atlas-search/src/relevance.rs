//! Relevance resolution: degenerate expansion, term-frequency scoring of
//! candidate phrases and grid lookups down to features.

use atlas_core::constants::{CHARDIST_PENALTY, GLOBAL_ID_SCALE, SORT_KEY_SCALE};
use atlas_core::errors::{ScoringError, SearchError};
use atlas_core::text::{sort_mod4, term_id};
use atlas_core::traits::ShardStore;
use atlas_core::types::grid::feature_id;
use atlas_core::types::shard::FREQ_TOTAL_KEY;
use atlas_core::types::ShardKind;
use atlas_core::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;

/// Scoring knobs, normally taken from `[search]` configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScoringOptions {
    pub max_degens: usize,
    pub relev_threshold: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            max_degens: 10,
            relev_threshold: 0.6,
        }
    }
}

/// Where a term was matched: query position and degenerate distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryHit {
    pub position: usize,
    pub distance: u64,
}

pub type QueryMap = FxHashMap<u64, QueryHit>;

/// Full terms recalled by each query token, and where each was matched.
/// Later positions overwrite earlier ones in the map.
pub fn expand_terms(
    store: &dyn ShardStore,
    tokens: &[(usize, String)],
    max_degens: usize,
) -> Result<(Vec<u64>, QueryMap), SearchError> {
    let mut terms = Vec::new();
    let mut querymap = QueryMap::default();
    for (position, token) in tokens {
        let mut degens: SmallVec<[u64; 16]> = store
            .get_all(ShardKind::Degen, &[term_id(token)])?
            .into_iter()
            .collect();
        degens.sort_by(sort_mod4);
        for value in degens.iter().take(max_degens) {
            let term = value / 4;
            querymap.insert(
                term,
                QueryHit {
                    position: *position,
                    distance: value % 4,
                },
            );
            terms.push(term);
        }
    }
    Ok((terms, querymap))
}

/// Score of a kept phrase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhraseScore {
    pub relev: f64,
    pub reason: u64,
    /// `relev * 1e6 + count`, used to pick a winner per feature.
    pub sort_key: f64,
}

/// Kept phrase ids (sorted, unique) and their scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredPhrases {
    pub phrases: Vec<u64>,
    pub scores: FxHashMap<u64, PhraseScore>,
}

fn term_weights(
    store: &dyn ShardStore,
    terms: &FxHashSet<u64>,
) -> Result<FxHashMap<u64, f64>, SearchError> {
    let corpus = store
        .get(ShardKind::Freq, FREQ_TOTAL_KEY)?
        .and_then(|v| v.first().copied())
        .unwrap_or(0) as f64;
    let mut weights = FxHashMap::default();
    for &term in terms {
        let freq = store
            .get(ShardKind::Freq, term)?
            .and_then(|v| v.first().copied())
            .filter(|f| *f > 0)
            .ok_or(ScoringError::MissingFrequency { term })?;
        weights.insert(term, (1.0 + corpus / freq as f64).ln());
    }
    Ok(weights)
}

/// Score every candidate phrase against `querymap`.
///
/// Terms are walked left to right. The first mapped term starts a run; a
/// later mapped term joins only when its query position directly follows
/// the previous contributor; an unmapped term after the run has started
/// ends the walk.
pub fn score_phrases(
    store: &dyn ShardStore,
    candidates: &[u64],
    querymap: &QueryMap,
    threshold: f64,
) -> Result<ScoredPhrases, SearchError> {
    let mut sequences: FxHashMap<u64, Vec<u64>> = FxHashMap::default();
    for &phrase in candidates {
        if sequences.contains_key(&phrase) {
            continue;
        }
        let terms = store
            .get(ShardKind::Phrase, phrase)?
            .ok_or(ScoringError::MissingPhrase { phrase })?;
        sequences.insert(phrase, terms);
    }
    let all_terms: FxHashSet<u64> = sequences.values().flatten().copied().collect();
    let weights = term_weights(store, &all_terms)?;

    let mut scored = ScoredPhrases::default();
    for (&phrase, terms) in &sequences {
        let total: f64 = terms.iter().map(|t| weights[t]).sum();
        if !(total >= 0.0) {
            return Err(ScoringError::NegativeTotal { phrase, total }.into());
        }

        let mut relev = 0.0;
        let mut reason = 0u64;
        let mut chardist = 0u64;
        let mut count = 0u64;
        let mut last: Option<usize> = None;
        for term in terms {
            let Some(hit) = querymap.get(term) else {
                if last.is_some() {
                    break;
                }
                continue;
            };
            if last.is_none() || last.map(|p| p + 1) == Some(hit.position) {
                relev += weights[term] / total;
                reason |= 1 << hit.position;
                chardist += hit.distance;
                count += 1;
                last = Some(hit.position);
            }
        }

        if relev > threshold {
            let relev = (if relev > 0.99 { 1.0 } else { relev }) - chardist as f64 * CHARDIST_PENALTY;
            scored.phrases.push(phrase);
            scored.scores.insert(
                phrase,
                PhraseScore {
                    relev,
                    reason,
                    sort_key: relev * SORT_KEY_SCALE + count as f64,
                },
            );
        }
    }
    scored.phrases.sort_unstable();
    Ok(scored)
}

/// A feature reached through a scored phrase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relev {
    pub feature_id: u64,
    pub relev: f64,
    pub reason: u64,
    pub idx: usize,
    pub name: String,
    /// `idx * 1e14 + feature_id`, unique across the federation.
    pub global_id: u64,
}

/// Winning relevance per feature and every grid posting read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFeatures {
    pub features: FxHashMap<u64, Relev>,
    pub grids: Vec<u64>,
}

/// Look up the grid postings of every kept phrase. Each feature keeps the
/// phrase with the highest sort key; ties keep the first seen.
pub fn resolve_features(
    store: &dyn ShardStore,
    scored: &ScoredPhrases,
    idx: usize,
    name: &str,
) -> Result<ResolvedFeatures, SearchError> {
    let mut resolved = ResolvedFeatures::default();
    let mut best: FxHashMap<u64, f64> = FxHashMap::default();
    for phrase in &scored.phrases {
        let Some(score) = scored.scores.get(phrase) else {
            continue;
        };
        let postings = store.get(ShardKind::Grid, *phrase)?.unwrap_or_default();
        for &posting in &postings {
            let feature = feature_id(posting);
            let wins = best.get(&feature).map_or(true, |current| *current < score.sort_key);
            if wins {
                best.insert(feature, score.sort_key);
                resolved.features.insert(
                    feature,
                    Relev {
                        feature_id: feature,
                        relev: score.relev,
                        reason: score.reason,
                        idx,
                        name: name.to_string(),
                        global_id: idx as u64 * GLOBAL_ID_SCALE + feature,
                    },
                );
            }
        }
        resolved.grids.extend(postings);
    }
    Ok(resolved)
}

/// Full relevance pass for tokens at their query positions.
pub fn search(
    store: &dyn ShardStore,
    tokens: &[(usize, String)],
    idx: usize,
    name: &str,
    options: ScoringOptions,
) -> Result<ResolvedFeatures, SearchError> {
    let span = atlas_core::relevance_span!(name, tokens.len());
    let _guard = span.enter();

    let (terms, querymap) = expand_terms(store, tokens, options.max_degens)?;
    let phrases = store.get_all(ShardKind::Term, &terms)?;
    let scored = score_phrases(store, &phrases, &querymap, options.relev_threshold)?;
    resolve_features(store, &scored, idx, name)
}

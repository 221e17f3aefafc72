//! Frequency pass: term occurrence counts, the corpus total and the
//! per-index `__MAX__` score.

use atlas_core::errors::StoreError;
use atlas_core::text::{term_id, TokenReplacer};
use atlas_core::traits::ShardStore;
use atlas_core::types::shard::{FREQ_MAX_KEY, FREQ_TOTAL_KEY};
use atlas_core::types::{Document, ShardKind};
use atlas_core::FxHashMap;

use crate::documents::phrases_for;

/// Term frequencies for one index.
#[derive(Debug, Clone, PartialEq)]
pub struct FreqTable {
    counts: FxHashMap<u64, u64>,
    total: u64,
    max_score: f64,
}

impl Default for FreqTable {
    fn default() -> Self {
        Self {
            counts: FxHashMap::default(),
            total: 0,
            max_score: 1.0,
        }
    }
}

impl FreqTable {
    /// Count every term of every indexed phrase of `docs`.
    pub fn compute(docs: &[Document], replacer: &TokenReplacer) -> Self {
        let mut table = Self::default();
        let mut max_score: f64 = 0.0;
        for doc in docs {
            for phrase in phrases_for(doc, replacer) {
                for token in &phrase {
                    table.add(term_id(token), 1);
                }
            }
            if let Some(score) = doc.score {
                max_score = max_score.max(score);
            }
        }
        if max_score > 0.0 {
            table.max_score = max_score;
        }
        table
    }

    fn add(&mut self, term: u64, count: u64) {
        *self.counts.entry(term).or_insert(0) += count;
        self.total += count;
    }

    pub fn get(&self, term: u64) -> Option<u64> {
        self.counts.get(&term).copied()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum counts and totals; keep the larger `__MAX__`.
    pub fn merge(&mut self, other: &FreqTable) {
        for (term, count) in &other.counts {
            self.add(*term, *count);
        }
        self.max_score = self.max_score.max(other.max_score);
    }

    /// Shard entries: every term, the total under key `0` and `__MAX__`.
    pub fn entries(&self) -> Vec<(u64, Vec<u64>)> {
        let mut out: Vec<(u64, Vec<u64>)> = self
            .counts
            .iter()
            .map(|(term, count)| (*term, vec![*count]))
            .collect();
        out.sort_unstable_by_key(|(term, _)| *term);
        out.push((FREQ_TOTAL_KEY, vec![self.total]));
        out.push((FREQ_MAX_KEY, vec![self.max_score.ceil().max(1.0) as u64]));
        out
    }

    /// Rebuild a table from the `freq` shard of a store.
    pub fn from_store(store: &dyn ShardStore) -> Result<Self, StoreError> {
        let mut table = Self::default();
        for key in store.keys(ShardKind::Freq)? {
            let value = store
                .get(ShardKind::Freq, key)?
                .and_then(|v| v.first().copied())
                .unwrap_or(0);
            match key {
                FREQ_TOTAL_KEY => {}
                FREQ_MAX_KEY => table.max_score = (value as f64).max(1.0),
                term => {
                    table.counts.insert(term, value);
                }
            }
        }
        table.total = table.counts.values().sum();
        Ok(table)
    }
}

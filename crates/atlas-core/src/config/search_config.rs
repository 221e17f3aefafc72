//! Query path configuration.

use serde::{Deserialize, Serialize};

/// Tunables for phrasematch and relevance scoring.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Degenerate candidates kept per query position. Default: 10.
    pub max_degens: Option<usize>,
    /// Minimum term-weight relevance for a phrase to be kept. Default: 0.6.
    pub relev_threshold: Option<f64>,
    /// Default autocomplete mode when a query does not say. Default: true.
    pub autocomplete: Option<bool>,
}

impl SearchConfig {
    pub fn effective_max_degens(&self) -> usize {
        self.max_degens.unwrap_or(10)
    }

    pub fn effective_relev_threshold(&self) -> f64 {
        self.relev_threshold.unwrap_or(0.6)
    }

    pub fn effective_autocomplete(&self) -> bool {
        self.autocomplete.unwrap_or(true)
    }
}

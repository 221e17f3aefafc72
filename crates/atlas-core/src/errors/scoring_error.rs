//! Relevance scoring invariant violations.

use super::error_code::{self, AtlasErrorCode};

/// Defects detected while scoring phrases. These are never skipped silently.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Failed to get phrase {phrase}")]
    MissingPhrase { phrase: u64 },

    #[error("Bad freq total {total} for phrase {phrase}")]
    NegativeTotal { phrase: u64, total: f64 },

    #[error("No frequency entry for term {term}")]
    MissingFrequency { term: u64 },
}

impl AtlasErrorCode for ScoringError {
    fn error_code(&self) -> &'static str {
        error_code::SCORING_ERROR
    }
}

//! Query-path errors.

use super::error_code::{self, AtlasErrorCode};
use super::{ScoringError, StoreError};

/// Errors raised by phrasematch, relevance resolution and context lookups.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Unknown index type: {0}")]
    UnknownType(String),

    #[error("Context fetch failed: {0}")]
    Context(String),
}

impl AtlasErrorCode for SearchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Scoring(e) => e.error_code(),
            Self::UnknownType(_) | Self::Context(_) => error_code::SEARCH_ERROR,
        }
    }
}

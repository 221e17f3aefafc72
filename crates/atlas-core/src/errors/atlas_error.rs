//! Top-level error aggregating every subsystem via `From` conversions.

use super::error_code::{self, AtlasErrorCode};
use super::{BuildError, ConfigError, LoadError, ScoringError, SearchError, StoreError};

/// Error returned by the `Geocoder` operations.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Federation failed to open: {0}")]
    NotOpen(String),
}

pub type AtlasResult<T> = Result<T, AtlasError>;

impl AtlasErrorCode for AtlasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Load(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Build(e) => e.error_code(),
            Self::Scoring(e) => e.error_code(),
            Self::Search(e) => e.error_code(),
            Self::NotOpen(_) => error_code::NOT_OPEN,
        }
    }
}

//! Federation load errors.

use super::error_code::{self, AtlasErrorCode};
use super::{ConfigError, StoreError};

/// Errors that abort opening a federation. No partial federation is usable
/// after any of these.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No indexes configured")]
    NoIndexes,

    #[error("Failed to open index {index}: {source}")]
    SourceOpen {
        index: String,
        #[source]
        source: StoreError,
    },

    #[error("Geocoder version is not 8, index: {index} (found {version})")]
    UnsupportedVersion { index: String, version: u32 },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Federation loader terminated before completion")]
    Interrupted,
}

impl AtlasErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoIndexes | Self::Interrupted => error_code::SOURCE_OPEN_ERROR,
            Self::SourceOpen { .. } => error_code::SOURCE_OPEN_ERROR,
            Self::UnsupportedVersion { .. } => error_code::UNSUPPORTED_VERSION,
            Self::Config(e) => e.error_code(),
        }
    }
}

//! Configuration errors.

use super::error_code::{self, AtlasErrorCode};

/// Errors raised while reading or validating configuration, either the
/// process-level `AtlasConfig` or per-index metadata.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Index {index} uses scoreranges but does not provide both minscore and maxscore")]
    ScoreRangesWithoutBounds { index: String },

    #[error("Index {index} declares token rules containing whitespace while global tokens are in use")]
    AmbiguousTokens { index: String },

    #[error("Invalid token rule {pattern:?}: {message}")]
    InvalidTokenRule { pattern: String, message: String },
}

impl AtlasErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}

//! Index build errors.

use super::error_code::{self, AtlasErrorCode};
use super::StoreError;

/// Errors that abort an index build. Validation errors are reported before
/// any work is dispatched; worker failures abort the whole build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("doc has no id")]
    MissingId,

    #[error("doc has no text on id: {id}")]
    MissingText { id: u64 },

    #[error("doc has no center or geometry on id: {id}")]
    MissingGeometry { id: u64 },

    #[error("index has no zoom on id: {id}")]
    MissingZoom { id: u64 },

    #[error("zoom must be between 0 and 14, zoom was {zoom} on id: {id}")]
    ZoomOutOfRange { id: u64, zoom: i64 },

    #[error("invalid tile coordinate {value:?} on id: {id}")]
    InvalidTile { id: u64, value: String },

    #[error("Index worker {worker} failed: {message}")]
    WorkerFailed { worker: usize, message: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl BuildError {
    /// True for errors raised by document validation, before dispatch.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::WorkerFailed { .. } | Self::Store(_))
    }
}

impl AtlasErrorCode for BuildError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WorkerFailed { .. } => error_code::WORKER_FAILED,
            Self::Store(e) => e.error_code(),
            _ => error_code::VALIDATION_ERROR,
        }
    }
}

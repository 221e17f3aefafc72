//! Storage collaborator errors.

use super::error_code::{self, AtlasErrorCode};

/// Errors surfaced by a Source, Shard Store or Dictionary implementation.
/// Propagated unchanged to the caller; the core never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Corrupt {kind} data: {message}")]
    Corrupt { kind: String, message: String },

    #[error("Source does not support {capability}")]
    Unsupported { capability: &'static str },

    #[error("Source is not open")]
    NotOpen,

    #[error("Lock poisoned: {what}")]
    Poisoned { what: &'static str },
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt {
            kind: "json".to_string(),
            message: e.to_string(),
        }
    }
}

impl AtlasErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        error_code::STORE_ERROR
    }
}

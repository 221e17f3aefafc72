//! Stable error codes shared by every subsystem error.

/// Implemented by every error enum so callers can branch on a stable string
/// instead of matching variants across crate boundaries.
pub trait AtlasErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const UNSUPPORTED_VERSION: &str = "UNSUPPORTED_VERSION";
pub const SOURCE_OPEN_ERROR: &str = "SOURCE_OPEN_ERROR";
pub const STORE_ERROR: &str = "STORE_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const WORKER_FAILED: &str = "WORKER_FAILED";
pub const SCORING_ERROR: &str = "SCORING_ERROR";
pub const SEARCH_ERROR: &str = "SEARCH_ERROR";
pub const NOT_OPEN: &str = "NOT_OPEN";

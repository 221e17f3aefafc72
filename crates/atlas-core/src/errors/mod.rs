//! Error handling for Atlas.
//! One error enum per subsystem, `thiserror` only.

pub mod atlas_error;
pub mod build_error;
pub mod config_error;
pub mod error_code;
pub mod load_error;
pub mod scoring_error;
pub mod search_error;
pub mod store_error;

pub use atlas_error::{AtlasError, AtlasResult};
pub use build_error::BuildError;
pub use config_error::ConfigError;
pub use error_code::AtlasErrorCode;
pub use load_error::LoadError;
pub use scoring_error::ScoringError;
pub use search_error::SearchError;
pub use store_error::StoreError;

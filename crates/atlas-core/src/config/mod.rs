//! Configuration system for Atlas.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod atlas_config;
pub mod build_config;
pub mod federation_config;
pub mod logging_config;
pub mod search_config;

pub use atlas_config::{AtlasConfig, ConfigOverrides};
pub use build_config::BuildConfig;
pub use federation_config::FederationConfig;
pub use logging_config::LoggingConfig;
pub use search_config::SearchConfig;

//! Tracing subscriber setup and span helpers.

pub mod spans;

use tracing_subscriber::EnvFilter;

use crate::config::AtlasConfig;

/// Install a global fmt subscriber filtered by `level`, unless `ATLAS_LOG`
/// is set, in which case it wins. Calling this twice is harmless; the second
/// call reports `false`.
pub fn init_tracing(level: &str) -> bool {
    let filter = EnvFilter::try_from_env("ATLAS_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Install the subscriber at the level named by `[logging] level`.
pub fn init_logging(config: &AtlasConfig) -> bool {
    init_tracing(config.logging.effective_level())
}

//! Logging configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive for the tracing subscriber, e.g. `info` or
    /// `atlas_search=debug`. Default: `info`.
    pub level: Option<String>,
}

impl LoggingConfig {
    pub fn effective_level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }
}

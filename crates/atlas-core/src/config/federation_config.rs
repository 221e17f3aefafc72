//! Federation loader configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FederationConfig {
    /// Maximum number of sources opened concurrently. Default: 10.
    pub open_concurrency: Option<usize>,
}

impl FederationConfig {
    pub fn effective_open_concurrency(&self) -> usize {
        self.open_concurrency.unwrap_or(10)
    }
}

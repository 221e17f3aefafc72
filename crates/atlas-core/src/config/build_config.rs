//! Index build configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the sharded indexing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BuildConfig {
    /// Worker thread count. Default: available parallelism.
    pub workers: Option<usize>,
    /// Pending patches that trigger a synchronous merge. Default: 10,000.
    pub flush_threshold: Option<usize>,
    /// Zoom used for documents without explicit tile coordinates.
    pub default_zoom: Option<u8>,
    /// Documents requested per indexable page. Default: 10,000.
    pub page_size: Option<usize>,
}

impl BuildConfig {
    /// Returns the effective worker count, defaulting to available parallelism.
    pub fn effective_workers(&self) -> usize {
        self.workers.filter(|w| *w > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Returns the effective flush threshold, defaulting to 10,000.
    pub fn effective_flush_threshold(&self) -> usize {
        self.flush_threshold.unwrap_or(10_000)
    }

    /// Returns the effective page size, defaulting to 10,000.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(10_000)
    }
}

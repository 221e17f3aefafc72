//! Event payload types.

/// Payload for `on_index_loaded`.
#[derive(Debug, Clone)]
pub struct IndexLoadedEvent {
    pub id: String,
    pub name: String,
    pub idx: usize,
    pub version: u32,
}

/// Payload for `on_federation_opened`. `error` carries the display form of
/// the first fatal load error, if any.
#[derive(Debug, Clone)]
pub struct FederationOpenedEvent {
    pub index_count: usize,
    pub error: Option<String>,
}

/// Payload for `on_build_progress`.
#[derive(Debug, Clone)]
pub struct BuildProgressEvent {
    pub acknowledged: usize,
    pub total: usize,
}

/// Payload for `on_patch_flush`.
#[derive(Debug, Clone)]
pub struct PatchFlushEvent {
    pub patches: usize,
}

/// Payload for `on_build_complete`.
#[derive(Debug, Clone)]
pub struct BuildCompleteEvent {
    pub documents: usize,
    pub workers: usize,
    pub duration_ms: u64,
}

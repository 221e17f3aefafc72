//! Event handler trait with no-op defaults.

use super::types::*;

/// Receives lifecycle events. Every method defaults to a no-op so handlers
/// only implement what they care about.
pub trait AtlasEventHandler: Send + Sync {
    fn on_index_loaded(&self, _event: &IndexLoadedEvent) {}
    fn on_federation_opened(&self, _event: &FederationOpenedEvent) {}
    fn on_build_progress(&self, _event: &BuildProgressEvent) {}
    fn on_patch_flush(&self, _event: &PatchFlushEvent) {}
    fn on_build_complete(&self, _event: &BuildCompleteEvent) {}
}

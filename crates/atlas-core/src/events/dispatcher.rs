//! Synchronous event dispatch, free when no handler is registered.

use std::sync::Arc;

use tracing::warn;

use super::handler::AtlasEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn AtlasEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn AtlasEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler is logged and does not stop the others.
    fn emit<F: Fn(&dyn AtlasEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                warn!("event handler panicked");
            }
        }
    }

    pub fn emit_index_loaded(&self, event: &IndexLoadedEvent) {
        self.emit(|h| h.on_index_loaded(event));
    }

    pub fn emit_federation_opened(&self, event: &FederationOpenedEvent) {
        self.emit(|h| h.on_federation_opened(event));
    }

    pub fn emit_build_progress(&self, event: &BuildProgressEvent) {
        self.emit(|h| h.on_build_progress(event));
    }

    pub fn emit_patch_flush(&self, event: &PatchFlushEvent) {
        self.emit(|h| h.on_patch_flush(event));
    }

    pub fn emit_build_complete(&self, event: &BuildCompleteEvent) {
        self.emit(|h| h.on_build_complete(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

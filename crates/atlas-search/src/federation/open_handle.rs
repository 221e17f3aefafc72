//! Completion latch for a federation opened in the background.

use std::sync::{Arc, Condvar, Mutex};

use atlas_core::errors::{AtlasError, LoadError};

type Outcome<T> = Result<Arc<T>, Arc<LoadError>>;

struct Latch<T> {
    outcome: Mutex<Option<Outcome<T>>>,
    done: Condvar,
}

/// Handle returned by a background open. [`OpenHandle::wait`] blocks until
/// the load finished; later waits return the stored outcome at once.
pub struct OpenHandle<T> {
    latch: Arc<Latch<T>>,
}

impl<T> Clone for OpenHandle<T> {
    fn clone(&self) -> Self {
        Self {
            latch: self.latch.clone(),
        }
    }
}

impl<T> OpenHandle<T> {
    pub(crate) fn pending() -> Self {
        Self {
            latch: Arc::new(Latch {
                outcome: Mutex::new(None),
                done: Condvar::new(),
            }),
        }
    }

    /// Store the outcome and wake every waiter. Only the first call counts.
    pub(crate) fn complete(&self, outcome: Result<T, LoadError>) {
        let Ok(mut slot) = self.latch.outcome.lock() else {
            return;
        };
        if slot.is_none() {
            *slot = Some(outcome.map(Arc::new).map_err(Arc::new));
        }
        self.latch.done.notify_all();
    }

    pub fn is_finished(&self) -> bool {
        self.latch.outcome.lock().map(|s| s.is_some()).unwrap_or(true)
    }

    pub fn wait(&self) -> Result<Arc<T>, AtlasError> {
        let poisoned = || AtlasError::NotOpen("loader latch poisoned".to_string());
        let mut slot = self.latch.outcome.lock().map_err(|_| poisoned())?;
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome
                    .clone()
                    .map_err(|e| AtlasError::NotOpen(e.to_string()));
            }
            slot = self.latch.done.wait(slot).map_err(|_| poisoned())?;
        }
    }
}

//! Parallel shard builder.
//!
//! Documents are validated, then dispatched round-robin to a fixed pool of
//! worker threads. Each worker sends one patch per document back over a
//! shared channel; the calling thread is the only merge point and flushes
//! buffered patches into the shard set every `flush_threshold` patches.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use atlas_core::config::BuildConfig;
use atlas_core::errors::BuildError;
use atlas_core::events::types::{BuildCompleteEvent, BuildProgressEvent, PatchFlushEvent};
use atlas_core::events::EventDispatcher;
use atlas_core::text::TokenReplacer;
use atlas_core::types::Document;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::documents::validate;
use crate::freq::FreqTable;
use crate::patch::{index_document, IndexContext, Patch};
use crate::shard_set::ShardSet;

/// Per-document indexing function run by the workers.
pub type IndexFn = dyn Fn(&Document, &IndexContext) -> Result<Patch, BuildError> + Send + Sync;

/// Knobs for a single build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub workers: usize,
    pub flush_threshold: usize,
}

impl BuildOptions {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            workers: config.effective_workers(),
            flush_threshold: config.effective_flush_threshold(),
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

enum WorkerMessage {
    Patch(Box<Patch>),
    Failed { worker: usize, message: String },
}

/// Builds a [`ShardSet`] from documents.
pub struct IndexBuilder {
    options: BuildOptions,
    replacer: TokenReplacer,
    events: EventDispatcher,
    index_fn: Arc<IndexFn>,
}

impl IndexBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            replacer: TokenReplacer::default(),
            events: EventDispatcher::default(),
            index_fn: Arc::new(index_document),
        }
    }

    /// Token rules applied to document text before tokenizing.
    pub fn with_replacer(mut self, replacer: TokenReplacer) -> Self {
        self.replacer = replacer;
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Replace the per-document indexing function.
    pub fn with_index_fn(mut self, index_fn: Arc<IndexFn>) -> Self {
        self.index_fn = index_fn;
        self
    }

    pub fn replacer(&self) -> &TokenReplacer {
        &self.replacer
    }

    /// Validate and index `docs`. Fails before dispatch on the first invalid
    /// document; fails with [`BuildError::WorkerFailed`] if any worker
    /// errors, panics, or exits without acknowledging its documents.
    pub fn build(
        &self,
        docs: Vec<Document>,
        freq: &FreqTable,
        default_zoom: Option<i64>,
    ) -> Result<ShardSet, BuildError> {
        validate(&docs, default_zoom)?;

        let total = docs.len();
        let worker_count = self.options.workers.max(1).min(total.max(1));
        let threshold = self.options.flush_threshold.max(1);
        let started = Instant::now();
        let span = atlas_core::build_span!(total, worker_count);
        let _guard = span.enter();

        let ctx = Arc::new(IndexContext {
            freq: freq.clone(),
            zoom: default_zoom,
            replacer: self.replacer.clone(),
        });
        let (patch_tx, patch_rx) = unbounded::<WorkerMessage>();
        let mut doc_txs = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let (doc_tx, doc_rx) = unbounded::<Document>();
            doc_txs.push(doc_tx);
            handles.push(spawn_worker(
                worker,
                doc_rx,
                patch_tx.clone(),
                ctx.clone(),
                self.index_fn.clone(),
            )?);
        }
        drop(patch_tx);

        for (i, doc) in docs.into_iter().enumerate() {
            let worker = i % worker_count;
            if doc_txs[worker].send(doc).is_err() {
                drop(doc_txs);
                join_all(handles);
                return Err(BuildError::WorkerFailed {
                    worker,
                    message: "worker exited before accepting its documents".to_string(),
                });
            }
        }
        // Workers exit once their queue drains.
        drop(doc_txs);
        info!(documents = total, workers = worker_count, "dispatched documents");

        let mut set = ShardSet::new(freq.clone());
        let mut buffer: Vec<Patch> = Vec::new();
        let mut acknowledged = 0usize;
        while acknowledged < total {
            match patch_rx.recv() {
                Ok(WorkerMessage::Patch(patch)) => {
                    acknowledged += 1;
                    buffer.push(*patch);
                    if buffer.len() >= threshold {
                        self.flush(&mut set, &mut buffer);
                        self.events.emit_build_progress(&BuildProgressEvent {
                            acknowledged,
                            total,
                        });
                    }
                }
                Ok(WorkerMessage::Failed { worker, message }) => {
                    warn!(worker, error = %message, "index worker failed");
                    drop(patch_rx);
                    join_all(handles);
                    return Err(BuildError::WorkerFailed { worker, message });
                }
                Err(_) => {
                    let worker = join_all(handles).unwrap_or(0);
                    warn!(worker, acknowledged, total, "index workers disconnected");
                    return Err(BuildError::WorkerFailed {
                        worker,
                        message: format!(
                            "workers exited after acknowledging {acknowledged} of {total} documents"
                        ),
                    });
                }
            }
        }
        self.flush(&mut set, &mut buffer);

        if let Some(worker) = join_all(handles) {
            return Err(BuildError::WorkerFailed {
                worker,
                message: "worker panicked during shutdown".to_string(),
            });
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            documents = total,
            phrases = set.phrase.len(),
            terms = set.term.len(),
            duration_ms,
            "build complete"
        );
        self.events.emit_build_complete(&BuildCompleteEvent {
            documents: total,
            workers: worker_count,
            duration_ms,
        });
        Ok(set)
    }

    fn flush(&self, set: &mut ShardSet, buffer: &mut Vec<Patch>) {
        if buffer.is_empty() {
            return;
        }
        let patches = buffer.len();
        for patch in buffer.drain(..) {
            set.merge_patch(patch);
        }
        debug!(patches, "flushed patches");
        self.events.emit_patch_flush(&PatchFlushEvent { patches });
    }
}

fn spawn_worker(
    worker: usize,
    docs: Receiver<Document>,
    patches: Sender<WorkerMessage>,
    ctx: Arc<IndexContext>,
    index_fn: Arc<IndexFn>,
) -> Result<JoinHandle<()>, BuildError> {
    thread::Builder::new()
        .name(format!("atlas-index-{worker}"))
        .spawn(move || {
            for doc in docs {
                let result =
                    catch_unwind(AssertUnwindSafe(|| (index_fn.as_ref())(&doc, ctx.as_ref())));
                let message = match result {
                    Ok(Ok(patch)) => WorkerMessage::Patch(Box::new(patch)),
                    Ok(Err(e)) => WorkerMessage::Failed {
                        worker,
                        message: e.to_string(),
                    },
                    Err(panic) => WorkerMessage::Failed {
                        worker,
                        message: panic_message(panic.as_ref()),
                    },
                };
                let failed = matches!(message, WorkerMessage::Failed { .. });
                if patches.send(message).is_err() || failed {
                    return;
                }
            }
        })
        .map_err(|e| BuildError::WorkerFailed {
            worker,
            message: format!("failed to spawn worker: {e}"),
        })
}

/// Join every worker; returns the first one that panicked.
fn join_all(handles: Vec<JoinHandle<()>>) -> Option<usize> {
    let mut failed = None;
    for (worker, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() && failed.is_none() {
            failed = Some(worker);
        }
    }
    failed
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

//! A Source held entirely in memory, offering every optional capability.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use atlas_core::errors::StoreError;
use atlas_core::traits::{
    DocPointer, FeatureStore, GeocoderData, IndexableDocs, Source, SourceId, SourceWriter,
};
use atlas_core::types::{Document, SourceInfo, TileCoord, UtfGrid};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Default)]
struct State {
    info: SourceInfo,
    tiles: BTreeMap<TileCoord, Vec<u8>>,
    grids: BTreeMap<TileCoord, UtfGrid>,
    geocoder_data: BTreeMap<(String, u64), Vec<u8>>,
    features: BTreeMap<u64, Document>,
    docs: Vec<Document>,
}

#[derive(Debug)]
struct Inner {
    identity: SourceId,
    name: Option<String>,
    state: RwLock<State>,
    opened: AtomicBool,
    writing: AtomicBool,
    fail_open: Option<String>,
    grid_delay_ms: AtomicU64,
    grid_fetches: AtomicUsize,
}

/// In-memory Source. Clones share storage and identity.
#[derive(Debug, Clone)]
pub struct MemorySource {
    inner: Arc<Inner>,
}

impl MemorySource {
    pub fn new(info: SourceInfo) -> Self {
        Self::build(info, None, None)
    }

    /// A source whose `base_filename` reports `name`.
    pub fn named(name: &str, info: SourceInfo) -> Self {
        Self::build(info, Some(name.to_string()), None)
    }

    /// A source whose `open` always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::build(SourceInfo::default(), None, Some(message.to_string()))
    }

    /// Sleep for `delay` inside every `get_grid` call.
    pub fn set_grid_delay(&self, delay: Duration) {
        self.inner
            .grid_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    fn build(
        info: SourceInfo,
        name: Option<String>,
        fail_open: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
                name,
                state: RwLock::new(State {
                    info,
                    ..Default::default()
                }),
                opened: AtomicBool::new(false),
                writing: AtomicBool::new(false),
                fail_open,
                grid_delay_ms: AtomicU64::new(0),
                grid_fetches: AtomicUsize::new(0),
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T, StoreError> {
        let state = self
            .inner
            .state
            .read()
            .map_err(|_| StoreError::Poisoned { what: "memory source" })?;
        Ok(f(&state))
    }

    fn with_state_mut<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, StoreError> {
        let mut state = self
            .inner
            .state
            .write()
            .map_err(|_| StoreError::Poisoned { what: "memory source" })?;
        Ok(f(&mut state))
    }

    pub fn set_info(&self, info: SourceInfo) -> Result<(), StoreError> {
        self.with_state_mut(|s| s.info = info)
    }

    pub fn put_grid(&self, tile: TileCoord, grid: UtfGrid) -> Result<(), StoreError> {
        self.with_state_mut(|s| {
            s.grids.insert(tile, grid);
        })
    }

    /// Queue documents for `indexable_docs`.
    pub fn add_docs(&self, docs: impl IntoIterator<Item = Document>) -> Result<(), StoreError> {
        self.with_state_mut(|s| s.docs.extend(docs))
    }

    /// Number of `get_grid` calls served so far.
    pub fn grid_fetches(&self) -> usize {
        self.inner.grid_fetches.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.inner.opened.load(Ordering::Acquire)
    }

    pub fn is_writing(&self) -> bool {
        self.inner.writing.load(Ordering::Acquire)
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new(SourceInfo::default())
    }
}

impl Source for MemorySource {
    fn open(&self) -> Result<(), StoreError> {
        if let Some(message) = &self.inner.fail_open {
            return Err(StoreError::Io {
                message: message.clone(),
            });
        }
        self.inner.opened.store(true, Ordering::Release);
        Ok(())
    }

    fn info(&self) -> Result<SourceInfo, StoreError> {
        self.with_state(|s| s.info.clone())
    }

    fn get_tile(&self, tile: TileCoord) -> Result<Option<Vec<u8>>, StoreError> {
        self.with_state(|s| s.tiles.get(&tile).cloned())
    }

    fn get_grid(&self, tile: TileCoord) -> Result<Option<UtfGrid>, StoreError> {
        self.inner.grid_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.inner.grid_delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        self.with_state(|s| s.grids.get(&tile).cloned())
    }

    fn identity(&self) -> SourceId {
        self.inner.identity
    }

    fn base_filename(&self) -> Option<String> {
        self.inner
            .name
            .as_ref()
            .map(|n| n.trim_end_matches(".mbtiles").to_string())
    }

    fn writer(&self) -> Option<&dyn SourceWriter> {
        Some(self)
    }

    fn geocoder_data(&self) -> Option<&dyn GeocoderData> {
        Some(self)
    }

    fn indexable(&self) -> Option<&dyn IndexableDocs> {
        Some(self)
    }

    fn features(&self) -> Option<&dyn FeatureStore> {
        Some(self)
    }
}

impl SourceWriter for MemorySource {
    fn start_writing(&self) -> Result<(), StoreError> {
        self.inner.writing.store(true, Ordering::Release);
        Ok(())
    }

    fn put_info(&self, info: &SourceInfo) -> Result<(), StoreError> {
        self.set_info(info.clone())
    }

    fn put_tile(&self, tile: TileCoord, data: Vec<u8>) -> Result<(), StoreError> {
        self.with_state_mut(|s| {
            s.tiles.insert(tile, data);
        })
    }

    fn stop_writing(&self) -> Result<(), StoreError> {
        self.inner.writing.store(false, Ordering::Release);
        Ok(())
    }
}

impl GeocoderData for MemorySource {
    fn get_geocoder_data(&self, kind: &str, shard: u64) -> Result<Option<Vec<u8>>, StoreError> {
        self.with_state(|s| s.geocoder_data.get(&(kind.to_string(), shard)).cloned())
    }

    fn put_geocoder_data(&self, kind: &str, shard: u64, data: Vec<u8>) -> Result<(), StoreError> {
        self.with_state_mut(|s| {
            s.geocoder_data.insert((kind.to_string(), shard), data);
        })
    }

    fn geocoder_data_keys(&self) -> Result<Vec<(String, u64)>, StoreError> {
        self.with_state(|s| s.geocoder_data.keys().cloned().collect())
    }
}

impl IndexableDocs for MemorySource {
    fn indexable_docs(
        &self,
        pointer: DocPointer,
    ) -> Result<(Vec<Document>, Option<DocPointer>), StoreError> {
        self.with_state(|s| {
            let limit = pointer.limit.max(1);
            let start = pointer.offset.min(s.docs.len());
            let end = (start + limit).min(s.docs.len());
            let page = s.docs[start..end].to_vec();
            let next = (end < s.docs.len()).then_some(DocPointer { offset: end, limit });
            (page, next)
        })
    }
}

impl FeatureStore for MemorySource {
    fn get_feature(&self, id: u64) -> Result<Option<Document>, StoreError> {
        self.with_state(|s| s.features.get(&id).cloned())
    }

    fn put_feature(&self, doc: &Document) -> Result<(), StoreError> {
        let id = doc.id.ok_or_else(|| StoreError::Corrupt {
            kind: "feature".to_string(),
            message: "feature has no id".to_string(),
        })?;
        self.with_state_mut(|s| {
            s.features.insert(id, doc.clone());
        })
    }

    fn feature_ids(&self) -> Result<Vec<u64>, StoreError> {
        self.with_state(|s| s.features.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity_and_state() {
        let a = MemorySource::default();
        let b = a.clone();
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), MemorySource::default().identity());

        b.put_geocoder_data("term", 0, b"{}".to_vec()).unwrap();
        assert_eq!(a.get_geocoder_data("term", 0).unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn failing_source_reports_io_error() {
        let s = MemorySource::failing("disk gone");
        assert!(matches!(s.open(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn docs_are_paged() {
        let s = MemorySource::default();
        s.add_docs((1..=5).map(|i| Document::new(i, "x"))).unwrap();
        let (page, next) = s.indexable_docs(DocPointer::new(2)).unwrap();
        assert_eq!(page.len(), 2);
        let next = next.unwrap();
        assert_eq!(next.offset, 2);
        let (page, next) = s.indexable_docs(DocPointer { offset: 4, limit: 2 }).unwrap();
        assert_eq!(page.len(), 1);
        assert!(next.is_none());
    }

    #[test]
    fn grid_fetches_are_counted() {
        let s = MemorySource::default();
        let tile = TileCoord::new(1, 0, 0);
        assert_eq!(s.get_grid(tile).unwrap(), None);
        assert_eq!(s.grid_fetches(), 1);
    }

    #[test]
    fn base_filename_strips_extension() {
        let s = MemorySource::named("places.mbtiles", SourceInfo::default());
        assert_eq!(s.base_filename().as_deref(), Some("places"));
    }
}

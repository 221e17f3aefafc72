//! The `Geocoder`: an opened federation and the operations served on it.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use atlas_core::config::AtlasConfig;
use atlas_core::errors::{AtlasResult, LoadError, SearchError};
use atlas_core::events::types::FederationOpenedEvent;
use atlas_core::events::EventDispatcher;
use atlas_core::text::TokenReplacer;
use atlas_core::traits::{DocPointer, Source};
use atlas_core::types::{BBox, Document, SourceInfo};
use atlas_core::FxHashMap;
use atlas_index::ops::{
    analyze_source, copy_source, index_source, merge_sources, shardlevel_of, CopyReport,
    IndexReport, IndexTarget,
};
use atlas_index::{BuildOptions, IndexBuilder, ShardStats};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::context::{reset_context_cache, resolve_context, ContextFeature};
use crate::federation::{
    self, DeriveOptions, Federation, IndexStorage, LoadedIndex, OpenHandle, SourceList,
};
use crate::phrasematch::{phrasematch, PhrasematchOptions, PhrasematchResult};
use crate::relevance::{self, Relev, ScoringOptions};

/// Results returned when a query does not set a limit.
pub const DEFAULT_LIMIT: usize = 5;

/// Options for opening a federation.
#[derive(Clone, Default)]
pub struct GeocoderOptions {
    /// Global token rules applied to every query before per-index rules.
    pub tokens: Option<BTreeMap<String, String>>,
    /// Rules appended to each index's rules at indexing time.
    pub geocoder_inverse_tokens: BTreeMap<String, String>,
    pub config: AtlasConfig,
    pub events: EventDispatcher,
}

#[derive(Debug, Clone, Default)]
pub struct GeocodeOptions {
    /// Falls back to `[search] autocomplete`.
    pub autocomplete: Option<bool>,
    pub stacks: Option<Vec<String>>,
    pub bbox: Option<BBox>,
    pub language: Option<Vec<String>>,
    pub limit: Option<usize>,
}

/// One ranked feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    /// Phrase relevance scaled by the phrasematch weight.
    pub relevance: f64,
    pub relev: Relev,
    pub index: String,
    pub feature: Option<Document>,
}

pub struct Geocoder {
    federation: Federation,
    config: AtlasConfig,
    events: EventDispatcher,
    replacer: TokenReplacer,
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("indexes", &self.federation.len())
            .finish()
    }
}

impl Geocoder {
    /// Open every source and build the federation. Completion, successful
    /// or not, is reported to the event handlers.
    pub fn open(sources: SourceList, options: GeocoderOptions) -> Result<Self, LoadError> {
        let count = sources.len();
        let events = options.events.clone();
        let result = Self::load(sources, options);
        let error = result.as_ref().err().map(ToString::to_string);
        match &error {
            None => info!(indexes = count, "federation opened"),
            Some(message) => warn!(error = %message, "federation failed to open"),
        }
        events.emit_federation_opened(&FederationOpenedEvent {
            index_count: count,
            error,
        });
        result
    }

    fn load(sources: SourceList, options: GeocoderOptions) -> Result<Self, LoadError> {
        let replacer = match &options.tokens {
            Some(tokens) => TokenReplacer::new(tokens)?,
            None => TokenReplacer::default(),
        };
        let derive = DeriveOptions {
            global_tokens: options.tokens.clone(),
            inverse_tokens: options.geocoder_inverse_tokens.clone(),
        };
        let federation = federation::load(
            sources,
            derive,
            options.config.federation.effective_open_concurrency(),
            &options.events,
        )?;
        Ok(Self {
            federation,
            config: options.config,
            events: options.events,
            replacer,
        })
    }

    /// Open in the background. The handle's `wait` returns the federation
    /// once loading finished.
    pub fn spawn(sources: SourceList, options: GeocoderOptions) -> OpenHandle<Geocoder> {
        let handle = OpenHandle::pending();
        let completer = handle.clone();
        let spawned = thread::Builder::new()
            .name("atlas-loader".to_string())
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(|| Self::open(sources, options)))
                    .unwrap_or(Err(LoadError::Interrupted));
                completer.complete(outcome);
            });
        if spawned.is_err() {
            handle.complete(Err(LoadError::Interrupted));
        }
        handle
    }

    pub fn federation(&self) -> &Federation {
        &self.federation
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    fn scoring(&self) -> ScoringOptions {
        ScoringOptions {
            max_degens: self.config.search.effective_max_degens(),
            relev_threshold: self.config.search.effective_relev_threshold(),
        }
    }

    /// Phrase candidates for `query` in every index, in load order.
    pub fn phrasematch(
        &self,
        query: &str,
        options: &PhrasematchOptions,
    ) -> Result<Vec<PhrasematchResult>, SearchError> {
        let query = self.replacer.replace(query);
        self.federation
            .indexes()
            .par_iter()
            .map(|index| phrasematch(index, &query, options))
            .collect()
    }

    /// Ranked features for `query`. Each index is searched on its own;
    /// a feature keeps its best relevance across phrase candidates.
    pub fn geocode(
        &self,
        query: &str,
        options: &GeocodeOptions,
    ) -> AtlasResult<Vec<GeocodeResult>> {
        let query = self.replacer.replace(query);
        let pm_options = PhrasematchOptions {
            autocomplete: options
                .autocomplete
                .unwrap_or_else(|| self.config.search.effective_autocomplete()),
            stacks: options.stacks.clone(),
            bbox: options.bbox,
            language: options.language.clone(),
        };
        let scoring = self.scoring();

        let per_index: Vec<Vec<GeocodeResult>> = self
            .federation
            .indexes()
            .par_iter()
            .map(|index| geocode_index(index, &query, &pm_options, scoring))
            .collect::<Result<_, _>>()?;

        let mut results: Vec<GeocodeResult> = per_index.into_iter().flatten().collect();
        results.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then(a.relev.global_id.cmp(&b.relev.global_id))
        });
        results.truncate(options.limit.unwrap_or(DEFAULT_LIMIT));
        Ok(results)
    }

    /// Storage handles for a write target: the live ones when the target
    /// is part of the federation.
    fn target_storage(&self, to: &Arc<dyn Source>) -> AtlasResult<Arc<IndexStorage>> {
        let level = shardlevel_of(to.as_ref())?;
        Ok(self.federation.storage().get_or_create(to, level, false)?)
    }

    fn indexing_replacer(
        &self,
        to: &Arc<dyn Source>,
        info: &SourceInfo,
    ) -> AtlasResult<TokenReplacer> {
        if let Some(index) = self.federation.by_identity(to.identity()) {
            return Ok(index.indexing_replacer.clone());
        }
        Ok(TokenReplacer::indexing(
            &info.geocoder_tokens,
            &self.federation.options().inverse_tokens,
        )?)
    }

    /// Index the documents of `from` into `to`, starting at `pointer` (the
    /// first page of `[build] page_size` documents when absent).
    pub fn index(
        &self,
        from: &dyn Source,
        to: &Arc<dyn Source>,
        pointer: Option<DocPointer>,
    ) -> AtlasResult<IndexReport> {
        let info = to.info()?;
        let zoom = info
            .maxzoom
            .map(|z| i64::from(z) + i64::from(info.geocoder_resolution.unwrap_or(0)))
            .or(self.config.build.default_zoom.map(i64::from));
        let builder = IndexBuilder::new(BuildOptions::from_config(&self.config.build))
            .with_replacer(self.indexing_replacer(to, &info)?)
            .with_events(self.events.clone());
        let storage = self.target_storage(to)?;
        let pointer =
            pointer.unwrap_or_else(|| DocPointer::new(self.config.build.effective_page_size()));
        index_source(
            &builder,
            from,
            IndexTarget {
                source: to.clone(),
                store: &storage.store,
                dictionary: &storage.dictionary,
                zoom,
            },
            pointer,
        )
    }

    pub fn merge(
        &self,
        a: Arc<dyn Source>,
        b: Arc<dyn Source>,
        to: &Arc<dyn Source>,
    ) -> AtlasResult<ShardStats> {
        self.multimerge(&[a, b], to)
    }

    pub fn multimerge(
        &self,
        sources: &[Arc<dyn Source>],
        to: &Arc<dyn Source>,
    ) -> AtlasResult<ShardStats> {
        let storage = self.target_storage(to)?;
        Ok(merge_sources(
            sources,
            IndexTarget {
                source: to.clone(),
                store: &storage.store,
                dictionary: &storage.dictionary,
                zoom: None,
            },
        )?)
    }

    pub fn analyze(&self, source: Arc<dyn Source>) -> AtlasResult<ShardStats> {
        Ok(analyze_source(source)?)
    }

    pub fn copy(&self, from: &dyn Source, to: &dyn Source) -> AtlasResult<CopyReport> {
        Ok(copy_source(from, to)?)
    }

    /// Features under a point, innermost first, for every index type
    /// loaded before `max_type`.
    pub fn context(
        &self,
        lon: f64,
        lat: f64,
        max_type: Option<&str>,
    ) -> AtlasResult<Vec<ContextFeature>> {
        Ok(resolve_context(&self.federation, lon, lat, max_type)?)
    }

    pub fn reset_context_cache(&self) {
        reset_context_cache(&self.federation);
    }
}

fn geocode_index(
    index: &LoadedIndex,
    query: &str,
    options: &PhrasematchOptions,
    scoring: ScoringOptions,
) -> Result<Vec<GeocodeResult>, SearchError> {
    let matched = phrasematch(index, query, options)?;
    let mut best: FxHashMap<u64, (f64, Relev)> = FxHashMap::default();

    for pm in &matched.phrasematches {
        let tokens: Vec<(usize, String)> = pm
            .positions()
            .into_iter()
            .zip(pm.subquery.iter().cloned())
            .collect();
        let resolved =
            relevance::search(pm.grid.as_ref(), &tokens, index.idx, &index.name, scoring)?;
        for (feature, relev) in resolved.features {
            let relevance = relev.relev * pm.weight;
            let better = best.get(&feature).map_or(true, |(current, _)| *current < relevance);
            if better {
                best.insert(feature, (relevance, relev));
            }
        }
    }

    let features = index.source.features();
    best.into_values()
        .map(|(relevance, relev)| -> Result<GeocodeResult, SearchError> {
            let feature = match features {
                Some(store) => store.get_feature(relev.feature_id)?,
                None => None,
            };
            Ok(GeocodeResult {
                relevance,
                relev,
                index: index.id.clone(),
                feature,
            })
        })
        .collect()
}

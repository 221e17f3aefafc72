//! One opened index and the metadata derived from its info.

use std::collections::BTreeMap;
use std::sync::Arc;

use atlas_core::constants::{DEFAULT_ADDRESS_ORDER, LEGACY_GEOCODER_VERSION, SUPPORTED_GEOCODER_VERSION};
use atlas_core::errors::{ConfigError, LoadError};
use atlas_core::text::TokenReplacer;
use atlas_core::traits::Source;
use atlas_core::types::{BBox, SourceInfo};

use super::language::LanguageSet;
use super::storage::IndexStorage;
use crate::context::GridCache;

/// Geocoder-level settings every index derivation needs.
#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    pub global_tokens: Option<BTreeMap<String, String>>,
    pub inverse_tokens: BTreeMap<String, String>,
}

/// An opened index. Immutable after load apart from its context cache.
pub struct LoadedIndex {
    pub id: String,
    pub name: String,
    pub index_type: String,
    pub types: Vec<String>,
    pub maxzoom: u8,
    pub zoom: u8,
    pub bounds: BBox,
    pub format: BTreeMap<String, Option<String>>,
    pub address: bool,
    pub address_order: String,
    pub layer: String,
    pub stack: Vec<String>,
    pub lang: LanguageSet,
    pub scoreranges: BTreeMap<String, [f64; 2]>,
    pub minscore: Option<f64>,
    pub maxscore: Option<f64>,
    pub token_replacer: TokenReplacer,
    pub indexing_replacer: TokenReplacer,
    pub inherit_score: bool,
    pub universal_text: bool,
    pub reverse_mode: bool,
    pub version: u32,
    pub shardlevel: u32,
    pub use_normalization_cache: bool,
    pub idx: usize,
    pub ndx: usize,
    /// `bmask[j] == 1` when this index and index `j` cannot share a result.
    pub bmask: Vec<u8>,
    pub source: Arc<dyn Source>,
    pub storage: Arc<IndexStorage>,
    pub(crate) grids: GridCache,
}

impl std::fmt::Debug for LoadedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedIndex")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.index_type)
            .field("idx", &self.idx)
            .field("zoom", &self.zoom)
            .field("stack", &self.stack)
            .finish()
    }
}

/// Version and legacy shard level from info. Only version 8 is served;
/// an absent version is the legacy format.
pub fn index_version(id: &str, info: &SourceInfo) -> Result<(u32, u32), LoadError> {
    match info.geocoder_version {
        Some(SUPPORTED_GEOCODER_VERSION) => Ok((SUPPORTED_GEOCODER_VERSION, 0)),
        Some(version) if version != LEGACY_GEOCODER_VERSION => Err(LoadError::UnsupportedVersion {
            index: id.to_string(),
            version,
        }),
        _ => Ok((LEGACY_GEOCODER_VERSION, info.geocoder_shardlevel.unwrap_or(0))),
    }
}

/// Fields derived from info alone, before registries and masks exist.
pub(crate) struct Derived {
    pub name: String,
    pub index_type: String,
    pub types: Vec<String>,
    pub version: u32,
    pub shardlevel: u32,
    pub token_replacer: TokenReplacer,
    pub indexing_replacer: TokenReplacer,
}

pub(crate) fn derive(id: &str, info: &SourceInfo, options: &DeriveOptions) -> Result<Derived, LoadError> {
    let name = info.geocoder_name.clone().unwrap_or_else(|| id.to_string());
    let index_type = info
        .geocoder_type
        .clone()
        .or_else(|| info.geocoder_name.clone())
        .unwrap_or_else(|| id.trim_end_matches(".mbtiles").to_string());
    let types = info
        .geocoder_types
        .clone()
        .unwrap_or_else(|| vec![index_type.clone()]);

    let (version, shardlevel) = index_version(id, info)?;

    let token_replacer = TokenReplacer::new(&info.geocoder_tokens)?;
    if options.global_tokens.is_some() && token_replacer.has_whitespace_rules() {
        return Err(ConfigError::AmbiguousTokens { index: id.to_string() }.into());
    }
    let indexing_replacer = TokenReplacer::indexing(&info.geocoder_tokens, &options.inverse_tokens)?;

    if info.scoreranges.is_some() && (info.minscore.is_none() || info.maxscore.is_none()) {
        return Err(ConfigError::ScoreRangesWithoutBounds { index: id.to_string() }.into());
    }

    Ok(Derived {
        name,
        index_type,
        types,
        version,
        shardlevel,
        token_replacer,
        indexing_replacer,
    })
}

impl LoadedIndex {
    pub(crate) fn assemble(
        id: String,
        info: &SourceInfo,
        derived: Derived,
        source: Arc<dyn Source>,
        storage: Arc<IndexStorage>,
        idx: usize,
        ndx: usize,
    ) -> Self {
        let maxzoom = info.maxzoom.unwrap_or(0);
        let layer = info
            .geocoder_layer
            .as_deref()
            .unwrap_or("")
            .split('.')
            .next()
            .unwrap_or("")
            .to_string();

        Self {
            id,
            name: derived.name,
            index_type: derived.index_type,
            types: derived.types,
            maxzoom,
            zoom: maxzoom.saturating_add(info.geocoder_resolution.unwrap_or(0)),
            bounds: info.bounds.unwrap_or_default(),
            format: info.format_templates(),
            address: info.geocoder_address,
            address_order: info
                .geocoder_address_order
                .clone()
                .unwrap_or_else(|| DEFAULT_ADDRESS_ORDER.to_string()),
            layer,
            stack: info.stack(),
            lang: LanguageSet::new(&info.geocoder_languages),
            scoreranges: info.scoreranges.clone().unwrap_or_default(),
            minscore: info.minscore,
            maxscore: info.maxscore,
            token_replacer: derived.token_replacer,
            indexing_replacer: derived.indexing_replacer,
            inherit_score: info.geocoder_inherit_score,
            universal_text: info.geocoder_universal_text,
            reverse_mode: info.geocoder_reverse_mode,
            version: derived.version,
            shardlevel: derived.shardlevel,
            use_normalization_cache: info.use_normalization_cache,
            idx,
            ndx,
            bmask: Vec::new(),
            source,
            storage,
            grids: GridCache::new(),
        }
    }

    /// Subtype keys, `type.rangeKey`, one per score range.
    pub fn subtypes(&self) -> Vec<String> {
        self.scoreranges
            .keys()
            .map(|key| format!("{}.{}", self.index_type, key))
            .collect()
    }

    /// Whether a stack filter admits this index. An index without stacks
    /// is global and always admitted.
    pub fn matches_stacks(&self, stacks: &[String]) -> bool {
        self.stack.is_empty() || self.stack.iter().any(|s| stacks.contains(s))
    }
}

/// `1` iff both stacks are non-empty and share no tag.
pub fn stack_mask(a: &[String], b: &[String]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    u8::from(!a.iter().any(|tag| b.contains(tag)))
}

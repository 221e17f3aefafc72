//! Phrase dictionary and spelling normalizations.

use crate::errors::StoreError;

/// A positive dictionary answer with the canonical spellings known for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictMatch {
    pub normalizations: Vec<String>,
}

pub trait Dictionary: Send + Sync {
    /// Exact match, or any phrase starting with `text` when `prefix` is set.
    fn has_phrase(&self, text: &str, prefix: bool) -> Result<bool, StoreError>;

    fn has_phrase_or_normalizations(
        &self,
        text: &str,
        prefix: bool,
    ) -> Result<Option<DictMatch>, StoreError>;

    /// Load a serialized normalization table, replacing any previous one.
    fn load_normalization_cache(&self, data: &[u8]) -> Result<(), StoreError>;

    fn has_normalization_cache(&self) -> bool;
}

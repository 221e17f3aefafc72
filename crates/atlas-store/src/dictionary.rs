//! Sorted-set phrase dictionary with an optional normalization table.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::RwLock;

use atlas_core::errors::StoreError;
use atlas_core::traits::{DictMatch, Dictionary, Source};
use tracing::debug;

/// Geocoder data blob holding the phrase list.
pub const DICTIONARY_BLOB: &str = "dictionary";
/// Geocoder data blob holding the normalization table.
pub const NORMALIZATION_BLOB: &str = "normalization";

/// Known phrase texts. Prefix scans are range scans over the sorted set.
/// The normalization table maps a spelling to its canonical forms.
#[derive(Debug, Default)]
pub struct PhraseDictionary {
    phrases: RwLock<BTreeSet<String>>,
    normalizations: RwLock<Option<BTreeMap<String, Vec<String>>>>,
}

impl PhraseDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: RwLock::new(phrases.into_iter().map(Into::into).collect()),
            normalizations: RwLock::new(None),
        }
    }

    /// Load the `dictionary` blob of a Source. A Source without geocoder
    /// data, or without the blob, yields an empty dictionary.
    pub fn from_source(source: &dyn Source) -> Result<Self, StoreError> {
        let Some(data) = source.geocoder_data() else {
            return Ok(Self::new());
        };
        match data.get_geocoder_data(DICTIONARY_BLOB, 0)? {
            Some(bytes) => Self::from_bytes(&bytes),
            None => Ok(Self::new()),
        }
    }

    /// Load the `normalization` blob of a Source, if present. Returns
    /// whether a table was loaded.
    pub fn load_normalization_from(&self, source: &dyn Source) -> Result<bool, StoreError> {
        let Some(data) = source.geocoder_data() else {
            return Ok(false);
        };
        match data.get_geocoder_data(NORMALIZATION_BLOB, 0)? {
            Some(bytes) => {
                self.load_normalization_cache(&bytes)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let phrases: Vec<String> = serde_json::from_slice(bytes)?;
        Ok(Self::from_phrases(phrases))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let phrases = self.phrases()?;
        Ok(serde_json::to_vec(&phrases)?)
    }

    pub fn insert(&self, text: impl Into<String>) -> Result<bool, StoreError> {
        let mut phrases = self
            .phrases
            .write()
            .map_err(|_| StoreError::Poisoned { what: "dictionary" })?;
        Ok(phrases.insert(text.into()))
    }

    /// Every phrase in sorted order.
    pub fn phrases(&self) -> Result<Vec<String>, StoreError> {
        let phrases = self
            .phrases
            .read()
            .map_err(|_| StoreError::Poisoned { what: "dictionary" })?;
        Ok(phrases.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.phrases.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize a normalization table in the `normalization` blob format.
    pub fn normalization_bytes(
        table: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(table)?)
    }

    /// Phrases equal to `text`, or starting with it when `prefix` is set.
    fn matching(phrases: &BTreeSet<String>, text: &str, prefix: bool) -> Vec<String> {
        if prefix {
            phrases
                .range::<str, _>((Bound::Included(text), Bound::Unbounded))
                .take_while(|p| p.starts_with(text))
                .cloned()
                .collect()
        } else if phrases.contains(text) {
            vec![text.to_string()]
        } else {
            Vec::new()
        }
    }
}

impl Dictionary for PhraseDictionary {
    fn has_phrase(&self, text: &str, prefix: bool) -> Result<bool, StoreError> {
        let phrases = self
            .phrases
            .read()
            .map_err(|_| StoreError::Poisoned { what: "dictionary" })?;
        if prefix {
            Ok(phrases
                .range::<str, _>((Bound::Included(text), Bound::Unbounded))
                .next()
                .is_some_and(|p| p.starts_with(text)))
        } else {
            Ok(phrases.contains(text))
        }
    }

    fn has_phrase_or_normalizations(
        &self,
        text: &str,
        prefix: bool,
    ) -> Result<Option<DictMatch>, StoreError> {
        let phrases = self
            .phrases
            .read()
            .map_err(|_| StoreError::Poisoned { what: "dictionary" })?;
        let matched = Self::matching(&phrases, text, prefix);
        if matched.is_empty() {
            return Ok(None);
        }

        let table = self
            .normalizations
            .read()
            .map_err(|_| StoreError::Poisoned { what: "normalization table" })?;
        let mut normalizations = Vec::new();
        if let Some(table) = table.as_ref() {
            for phrase in &matched {
                for canonical in table.get(phrase).into_iter().flatten() {
                    if !normalizations.contains(canonical) {
                        normalizations.push(canonical.clone());
                    }
                }
            }
        }
        Ok(Some(DictMatch { normalizations }))
    }

    fn load_normalization_cache(&self, data: &[u8]) -> Result<(), StoreError> {
        let table: BTreeMap<String, Vec<String>> = serde_json::from_slice(data)?;
        debug!(entries = table.len(), "loaded normalization table");
        let mut slot = self
            .normalizations
            .write()
            .map_err(|_| StoreError::Poisoned { what: "normalization table" })?;
        *slot = Some(table);
        Ok(())
    }

    fn has_normalization_cache(&self) -> bool {
        self.normalizations
            .read()
            .map(|t| t.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> PhraseDictionary {
        PhraseDictionary::from_phrases(["fake street", "main street", "main st"])
    }

    #[test]
    fn exact_and_prefix_lookups() {
        let d = dict();
        assert!(d.has_phrase("main st", false).unwrap());
        assert!(!d.has_phrase("main s", false).unwrap());
        assert!(d.has_phrase("main s", true).unwrap());
        assert!(d.has_phrase("fake street", true).unwrap());
        assert!(!d.has_phrase("fake streets", true).unwrap());
    }

    #[test]
    fn normalizations_are_returned_for_matches() {
        let d = dict();
        let table: BTreeMap<String, Vec<String>> =
            [("main st".to_string(), vec!["main street".to_string()])].into();
        d.load_normalization_cache(&PhraseDictionary::normalization_bytes(&table).unwrap())
            .unwrap();
        assert!(d.has_normalization_cache());

        let m = d.has_phrase_or_normalizations("main st", false).unwrap().unwrap();
        assert_eq!(m.normalizations, vec!["main street"]);

        let m = d.has_phrase_or_normalizations("fake street", false).unwrap().unwrap();
        assert!(m.normalizations.is_empty());

        assert!(d.has_phrase_or_normalizations("nowhere", true).unwrap().is_none());
    }

    #[test]
    fn bytes_round_trip() {
        let d = dict();
        let back = PhraseDictionary::from_bytes(&d.to_bytes().unwrap()).unwrap();
        assert_eq!(back.phrases().unwrap(), d.phrases().unwrap());
        assert_eq!(back.len(), 3);
    }
}

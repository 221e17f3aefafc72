//! Per-index language slots.

use std::collections::BTreeMap;

use atlas_core::constants::UNMATCHED_LANGUAGE_SLOT;
use atlas_core::text::lang_hash;

pub const DEFAULT_LANGUAGE: &str = "default";
pub const UNMATCHED_LANGUAGE: &str = "unmatched";

/// Ordered language labels of an index and the slot each maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    pub has_languages: bool,
    /// `default` first, then the declared languages sorted, `-` as `_`.
    pub languages: Vec<String>,
    pub hash: String,
    pub lang_map: BTreeMap<String, u32>,
}

impl LanguageSet {
    pub fn new(declared: &[String]) -> Self {
        let mut sorted: Vec<String> = declared.iter().map(|l| normalize_label(l)).collect();
        sorted.sort();

        let mut languages = Vec::with_capacity(sorted.len() + 1);
        languages.push(DEFAULT_LANGUAGE.to_string());
        languages.extend(sorted);

        let mut lang_map: BTreeMap<String, u32> = languages
            .iter()
            .enumerate()
            .map(|(slot, label)| (label.clone(), slot as u32))
            .collect();
        lang_map.insert(UNMATCHED_LANGUAGE.to_string(), UNMATCHED_LANGUAGE_SLOT);

        Self {
            has_languages: !declared.is_empty(),
            hash: lang_hash(&languages),
            languages,
            lang_map,
        }
    }

    /// Slot for a requested language: exact label, then the closest label,
    /// then the `unmatched` slot.
    pub fn slot(&self, lang: &str) -> u32 {
        if let Some(slot) = self.lang_map.get(lang) {
            return *slot;
        }
        closest_lang_label(lang, &self.lang_map)
            .and_then(|label| self.lang_map.get(label))
            .copied()
            .unwrap_or(UNMATCHED_LANGUAGE_SLOT)
    }
}

fn normalize_label(lang: &str) -> String {
    lang.replace('-', "_")
}

/// Best label in `map` for `lang`: `-` becomes `_`, then trailing
/// `_segment`s are dropped until a label matches.
pub fn closest_lang_label<'a, V>(lang: &str, map: &'a BTreeMap<String, V>) -> Option<&'a str> {
    let mut candidate = normalize_label(lang);
    loop {
        if let Some((label, _)) = map.get_key_value(candidate.as_str()) {
            return Some(label.as_str());
        }
        let cut = candidate.rfind('_')?;
        candidate.truncate(cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(langs: &[&str]) -> LanguageSet {
        LanguageSet::new(&langs.iter().map(|l| l.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn labels_are_sorted_after_default() {
        let s = set(&["zh-Hant", "en", "de"]);
        assert_eq!(s.languages, vec!["default", "de", "en", "zh_Hant"]);
        assert_eq!(s.lang_map["default"], 0);
        assert_eq!(s.lang_map["zh_Hant"], 3);
        assert_eq!(s.lang_map["unmatched"], 128);
        assert!(s.has_languages);
        assert_eq!(s.hash.len(), 8);
    }

    #[test]
    fn no_languages_still_has_default() {
        let s = set(&[]);
        assert!(!s.has_languages);
        assert_eq!(s.languages, vec!["default"]);
        assert_eq!(s.slot("default"), 0);
    }

    #[test]
    fn closest_label_drops_region_segments() {
        let s = set(&["en", "zh"]);
        assert_eq!(closest_lang_label("en-GB", &s.lang_map), Some("en"));
        assert_eq!(closest_lang_label("zh_Hant_TW", &s.lang_map), Some("zh"));
        assert_eq!(closest_lang_label("fr", &s.lang_map), None);
        assert_eq!(s.slot("en-GB"), s.lang_map["en"]);
        assert_eq!(s.slot("fr"), 128);
    }

    #[test]
    fn hash_follows_label_order() {
        assert_eq!(set(&["en", "de"]).hash, set(&["de", "en"]).hash);
        assert_ne!(set(&["en"]).hash, set(&["de"]).hash);
    }
}

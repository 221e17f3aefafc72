//! Per-index metadata as reported by a Source's `info()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::tile::BBox;

/// One tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Index metadata. Unknown keys, including every `geocoder_format_<lang>`
/// template, are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_stack: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geocoder_languages: Vec<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub geocoder_address: bool,
    #[serde(
        default,
        deserialize_with = "version_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub geocoder_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_shardlevel: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_resolution: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_address_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_layer: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub geocoder_tokens: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "truthy")]
    pub geocoder_inherit_score: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub geocoder_universal_text: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub geocoder_reverse_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxscore: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minscore: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoreranges: Option<BTreeMap<String, [f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BBox>,
    #[serde(default, deserialize_with = "truthy")]
    pub use_normalization_cache: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

const FORMAT_PREFIX: &str = "geocoder_format_";

impl SourceInfo {
    /// Format templates keyed by language, with the unscoped template under
    /// `default`.
    pub fn format_templates(&self) -> BTreeMap<String, Option<String>> {
        let mut out = BTreeMap::new();
        out.insert("default".to_string(), self.geocoder_format.clone());
        for (key, value) in &self.extra {
            if let Some(lang) = key.strip_prefix(FORMAT_PREFIX) {
                out.insert(lang.to_string(), value.as_str().map(str::to_string));
            }
        }
        out
    }

    pub fn stack(&self) -> Vec<String> {
        self.geocoder_stack.clone().map(OneOrMany::into_vec).unwrap_or_default()
    }
}

fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Accepts `8`, `"8"` or `"8.1"`: the leading integer is the version.
fn version_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().map(|v| v as u32).or_else(|| n.as_f64().map(|f| f as u32)),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_accepts_string_or_list() {
        let a: SourceInfo = serde_json::from_str(r#"{"geocoder_stack":"us"}"#).unwrap();
        assert_eq!(a.stack(), vec!["us"]);
        let b: SourceInfo = serde_json::from_str(r#"{"geocoder_stack":["us","ca"]}"#).unwrap();
        assert_eq!(b.stack(), vec!["us", "ca"]);
        assert!(SourceInfo::default().stack().is_empty());
    }

    #[test]
    fn version_accepts_number_or_string() {
        let a: SourceInfo = serde_json::from_str(r#"{"geocoder_version":8}"#).unwrap();
        assert_eq!(a.geocoder_version, Some(8));
        let b: SourceInfo = serde_json::from_str(r#"{"geocoder_version":"7"}"#).unwrap();
        assert_eq!(b.geocoder_version, Some(7));
    }

    #[test]
    fn format_templates_collect_language_keys() {
        let info: SourceInfo = serde_json::from_str(
            r#"{"geocoder_format":"{name}","geocoder_format_de":"{name} DE","maxzoom":6}"#,
        )
        .unwrap();
        let formats = info.format_templates();
        assert_eq!(formats["default"].as_deref(), Some("{name}"));
        assert_eq!(formats["de"].as_deref(), Some("{name} DE"));
        assert_eq!(info.maxzoom, Some(6));
    }

    #[test]
    fn truthy_flags() {
        let info: SourceInfo =
            serde_json::from_str(r#"{"geocoder_address":1,"geocoder_reverse_mode":"yes"}"#).unwrap();
        assert!(info.geocoder_address);
        assert!(info.geocoder_reverse_mode);
        assert!(!info.use_normalization_cache);
    }
}

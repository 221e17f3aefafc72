//! Word-level token replacement rules (`"Street" -> "St"`).

use std::collections::BTreeMap;

use regex::Regex;

use crate::errors::ConfigError;

/// One replacement rule. `from` is a regex matched on word boundaries,
/// case-insensitively; `to` may reference capture groups.
#[derive(Debug, Clone)]
pub struct TokenRule {
    pub from: String,
    pub to: String,
    regex: Regex,
}

impl TokenRule {
    pub fn new(from: &str, to: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!(r"(?i)\b(?:{from})\b")).map_err(|e| {
            ConfigError::InvalidTokenRule {
                pattern: from.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            regex,
        })
    }

    fn has_whitespace(&self) -> bool {
        self.from.contains(char::is_whitespace) || self.to.contains(char::is_whitespace)
    }
}

/// An ordered rule set applied to raw text before tokenizing.
#[derive(Debug, Clone, Default)]
pub struct TokenReplacer {
    rules: Vec<TokenRule>,
}

impl TokenReplacer {
    pub fn new(tokens: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let rules = tokens
            .iter()
            .map(|(from, to)| TokenRule::new(from, to))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Rules used at indexing time: the index's own rules followed by the
    /// geocoder-level inverse rules.
    pub fn indexing(
        tokens: &BTreeMap<String, String>,
        inverse: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut replacer = Self::new(tokens)?;
        for (from, to) in inverse {
            replacer.rules.push(TokenRule::new(from, to)?);
        }
        Ok(replacer)
    }

    pub fn rules(&self) -> &[TokenRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when any rule's source or target contains whitespace.
    pub fn has_whitespace_rules(&self) -> bool {
        self.rules.iter().any(TokenRule::has_whitespace)
    }

    pub fn replace(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule.regex.replace_all(&out, rule.to.as_str()).into_owned();
        }
        out
    }
}

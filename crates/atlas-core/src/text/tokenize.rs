//! Tokenizing and address-number detection.

use std::sync::LazyLock;

use regex::Regex;

static ADDRESS_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+[a-z]?|#+)$").ok());

/// Lowercase `text` and split on every non-alphanumeric character except `#`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A single token that looks like a house number: digits with an optional
/// trailing letter, or an already number-tokenized run of `#`.
pub fn is_address_number(text: &str) -> bool {
    !text.contains(' ') && ADDRESS_NUMBER.as_ref().is_some_and(|re| re.is_match(text))
}

/// Replace an address number by one `#` per digit; other tokens pass through.
pub fn num_token(token: &str) -> String {
    if !is_address_number(token) {
        return token.to_string();
    }
    if token.starts_with('#') {
        return token.to_string();
    }
    "#".repeat(token.chars().filter(char::is_ascii_digit).count())
}

/// Dictionary lookup text for a token sequence. Empty when there is
/// nothing to look up.
pub fn encodable_text(tokens: &[String]) -> String {
    tokens.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(tokenize("9 Fake-Street, NJ"), vec!["9", "fake", "street", "nj"]);
        assert_eq!(tokenize("  #12  "), vec!["#12"]);
        assert!(tokenize(" ,.- ").is_empty());
    }

    #[test]
    fn address_numbers() {
        assert!(is_address_number("9"));
        assert!(is_address_number("12a"));
        assert!(is_address_number("###"));
        assert!(!is_address_number("a12"));
        assert!(!is_address_number("9 fake"));
        assert!(!is_address_number("12ab"));
    }

    #[test]
    fn num_token_counts_digits() {
        assert_eq!(num_token("9"), "#");
        assert_eq!(num_token("10"), "##");
        assert_eq!(num_token("12a"), "##");
        assert_eq!(num_token("fake"), "fake");
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?.,!]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercases, trims, strips `? . , !` and collapses whitespace runs to a single space.
///
/// Punctuation is removed after trimming, so input such as `"hello ?"` keeps a
/// trailing space; `tokenize` drops the resulting empty token.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(lower.trim(), "");
    WHITESPACE.replace_all(&stripped, " ").into_owned()
}

/// Splits normalized text on single spaces, dropping empty tokens.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convenience for `tokenize(&normalize(text))`.
pub fn tokens(text: &str) -> Vec<String> {
    tokenize(&normalize(text))
}

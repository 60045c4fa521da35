use lazy_static::lazy_static;
use regex::Regex;

/// Tokens at or below this many characters are dropped.
const MIN_TOKEN_CHARS: usize = 2;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
}

/// Tokenize an overview: lowercase, punctuation to spaces, split on whitespace,
/// keep tokens longer than two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lowered = text.to_lowercase();
    PUNCT
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

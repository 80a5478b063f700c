use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Tokens shorter than this (in characters) never reach the vocabulary.
pub const MIN_TOKEN_CHARS: usize = 3;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\p{L}\p{N}\s]").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","an","and","are","at",
            "be","been","before","being","below","but","by",
            "can","could",
            "did","do","does","during",
            "for","from",
            "had","has","have",
            "in","into","is",
            "may","might","must",
            "of","on","or",
            "should",
            "that","the","these","this","those","through","to",
            "up",
            "was","were","will","with","would",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text for indexing and querying.
///
/// Lowercases, turns every character that is not a letter, digit or
/// whitespace into a space, splits on whitespace and drops short tokens and
/// stopwords. Token order is preserved so callers can count term frequency.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

use concierge_core::tokenizer::{is_stopword, tokenize, MIN_TOKEN_CHARS};

#[test]
fn it_lowercases_and_splits_on_punctuation() {
    let words = tokenize("Spa-Services (9 AM - 8 PM), Free WiFi!");
    assert_eq!(words, vec!["spa", "services", "free", "wifi"]);
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"quick".to_string()));
}

#[test]
fn it_drops_short_tokens() {
    let words = tokenize("an ox by 24 7 spa");
    assert_eq!(words, vec!["spa"]);
    assert!(words.iter().all(|w| w.chars().count() >= MIN_TOKEN_CHARS));
}

#[test]
fn it_keeps_repeats_in_order() {
    let words = tokenize("pool, POOL; Pool");
    assert_eq!(words, vec!["pool", "pool", "pool"]);
}

#[test]
fn it_counts_characters_not_bytes() {
    // two letters, four bytes
    assert!(tokenize("éé").is_empty());
    assert_eq!(tokenize("café"), vec!["café"]);
}

#[test]
fn blank_input_has_no_tokens() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \t\n").is_empty());
    assert!(tokenize("?!... --").is_empty());
}

#[test]
fn stopwords_are_function_words() {
    for w in ["the", "and", "is", "a", "with", "should"] {
        assert!(is_stopword(w), "{w} should be a stopword");
    }
    assert!(!is_stopword("pool"));
}

#[test]
fn underscores_split_words() {
    assert_eq!(tokenize("room_service"), vec!["room", "service"]);
    assert_eq!(tokenize("__spa__pool"), vec!["spa", "pool"]);
}

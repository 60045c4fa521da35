use reelmatch_core::tokenizer::tokenize;

#[test]
fn it_lowercases_and_strips_punctuation() {
    let toks = tokenize("Cobb's DREAM-heist, (again)!");
    assert_eq!(toks, vec!["cobb", "dream", "heist", "again"]);
}

#[test]
fn it_drops_short_tokens() {
    let toks = tokenize("A man in an old city of gold");
    assert!(!toks.contains(&"in".to_string()));
    assert!(!toks.contains(&"an".to_string()));
    assert!(toks.contains(&"man".to_string()));
    assert!(toks.contains(&"old".to_string()));
}

#[test]
fn it_keeps_unicode_words() {
    let toks = tokenize("Amélie visits the café");
    assert_eq!(toks, vec!["amélie", "visits", "the", "café"]);
}

#[test]
fn it_handles_empty_text() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("  .. !! ").is_empty());
}

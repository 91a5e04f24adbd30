use mdsearch_core::tokenizer::{tokenize, Tokenizer, TokenizerOptions};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    let plain = Tokenizer::new(TokenizerOptions { stem: false, stopwords: false });
    // NFKC keeps the composed é; the apostrophe is a boundary
    assert_eq!(plain.tokenize("The CAFÉ's menu"), vec!["the", "café", "s", "menu"]);
}

#[test]
fn it_folds_compatibility_forms() {
    let plain = Tokenizer::new(TokenizerOptions { stem: false, stopwords: false });
    // Fullwidth letters and the "ﬁ" ligature normalize to ASCII
    assert_eq!(plain.tokenize("ＦＡＳＴ ﬁle"), vec!["fast", "file"]);
}

#[test]
fn it_filters_stopwords_when_enabled() {
    let with_stops = Tokenizer::new(TokenizerOptions { stem: false, stopwords: true });
    let words = with_stops.tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));

    let words = tokenize("The quick brown fox");
    assert!(words.contains(&"the".to_string()));
}

#[test]
fn plural_and_singular_share_a_term() {
    assert_eq!(tokenize("tools"), tokenize("tool"));
    assert_eq!(tokenize("Configuration"), tokenize("configurations"));
}

#[test]
fn it_is_deterministic() {
    let text = "docs/getting-started/Installation.mdx: install FastMCP 2.0";
    assert_eq!(tokenize(text), tokenize(text));
    assert_eq!(tokenize(text).len(), 9);
}

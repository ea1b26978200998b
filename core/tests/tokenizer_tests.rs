use webdex_core::tokenizer::{count_terms, is_term, normalize, query_words};

#[test]
fn it_lowercases_and_filters_short_or_symbolic_tokens() {
    let t = count_terms("Rust RUST rust is an OK language! v2 x86_64 2024");
    assert_eq!(t.counts.get("rust"), Some(&3));
    assert_eq!(t.counts.get("2024"), Some(&1));
    // punctuation, underscores and short words are not terms
    assert!(!t.counts.contains_key("language!"));
    assert!(!t.counts.contains_key("x86_64"));
    assert!(!t.counts.contains_key("is"));
    assert!(!t.counts.contains_key("v2"));
    assert_eq!(t.raw_tokens, 10);
}

#[test]
fn it_normalizes_compatibility_forms() {
    // Fullwidth digits and letters fold to ASCII under NFKC.
    assert_eq!(normalize("ＲＵＳＴ"), "rust");
    assert!(is_term(&normalize("ＲＵＳＴ")));
    assert!(!is_term("café"));
}

#[test]
fn indexability_threshold_is_strict() {
    let mut text = String::new();
    for _ in 0..10 {
        text.push_str("word ");
    }
    for _ in 0..90 {
        text.push_str("a ");
    }
    // 10 terms out of 100 tokens
    assert!(!count_terms(&text).is_indexable());
    let text = text.replacen("a ", "word ", 1);
    // 11 terms out of 100 tokens
    assert!(count_terms(&text).is_indexable());
    assert!(!count_terms("").is_indexable());
}

#[test]
fn query_words_are_deduplicated() {
    assert_eq!(query_words("  Nobel prize NOBEL "), vec!["nobel", "prize"]);
}

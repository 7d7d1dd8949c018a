use searchify_core::tokenizer::{is_stopword, tokenize};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The connections, connection.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    assert!(words.iter().filter(|w| *w == "connect").count() == 2);
    // "ed" leaves two consonants behind, the last one goes
    assert_eq!(tokenize("hunted jumping"), vec!["hun", "jum"]);
    // Punctuation never survives cleaning
    assert!(words.iter().all(|w| w.chars().all(|c| c.is_ascii_alphanumeric())));
}

#[test]
fn it_filters_stopwords() {
    let paragraph = "Ten more steps. If he could take ten more steps it would be over, but his legs wouldn't move. \
                     He tried to will them to work, but they wouldn't listen to his brain. \
                     Ten more steps and it would be over but it didn't appear he would be able to do it.";
    let words = tokenize(paragraph);
    assert!(!words.is_empty());
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    // "wouldn't" cleans to "wouldn t", both halves are stop words
    assert!(!words.iter().any(|w| w == "t" || w == "wouldn"));
    assert!(!words.iter().any(|w| is_stopword(w)));
}

#[test]
fn it_is_deterministic_and_keeps_duplicates() {
    let text = "the quick brown fox jumps over the quick dog";
    assert_eq!(tokenize(text), tokenize(text));
    let words = tokenize(text);
    assert_eq!(words.iter().filter(|w| *w == "quick").count(), 2);
    assert_eq!(words[0], "quick");
}

#[test]
fn it_handles_empty_and_symbol_only_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("  %%% ... !!! ").is_empty());
    assert!(tokenize("the of and").is_empty());
}

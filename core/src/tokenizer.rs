use crate::stemmer::stem;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^A-Za-z0-9 ]").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        // apostrophes are already gone by the time tokens are checked
        let words: &[&str] = &[
            "i","me","my","myself","we","our","ours","ourselves",
            "you","youre","youve","youll","youd","your","yours","yourself","yourselves",
            "he","him","his","himself","she","shes","her","hers","herself",
            "it","its","itself","they","them","their","theirs","themselves",
            "what","which","who","whom","this","that","thatll","these","those",
            "am","is","are","was","were","be","been","being",
            "have","has","had","having","do","does","did","doing",
            "a","an","the","and","but","if","or","because","as","until","while",
            "of","at","by","for","with","about","against","between","into","through",
            "during","before","after","above","below","to","from","up","down",
            "in","out","on","off","over","under","again","further","then","once",
            "here","there","when","where","why","how","all","any","both","each",
            "few","more","most","other","some","such","no","nor","not","only",
            "own","same","so","than","too","very","s","t","can","will","just",
            "don","dont","should","shouldve","now","d","ll","m","o","re","ve","y",
            "ain","aren","arent","couldn","couldnt","didn","didnt","doesn","doesnt",
            "hadn","hadnt","hasn","hasnt","haven","havent","isn","isnt","ma",
            "mightn","mightnt","mustn","mustnt","needn","neednt","shan","shant",
            "shouldn","shouldnt","wasn","wasnt","weren","werent","wont","wouldn","wouldnt",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Replaces everything outside `[A-Za-z0-9 ]` with a space, lowercases, and
/// collapses whitespace runs.
pub fn clean_text(text: &str) -> String {
    let replaced = NON_ALNUM.replace_all(text, " ").to_lowercase();
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Cleaned, stop-word filtered, stemmed terms in document order. Repeated
/// terms are kept; their indices are the token positions.
pub fn tokenize(text: &str) -> Vec<String> {
    clean_text(text)
        .split_whitespace()
        .filter(|token| !token.is_empty() && !is_stopword(token))
        .map(stem)
        .filter(|term| !term.is_empty())
        .collect()
}

/// Distinct terms in first-occurrence order.
pub fn distinct_terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text).into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert_eq!(t.iter().filter(|w| *w == "run").count(), 2);
    }

    #[test]
    fn clean_strips_punctuation() {
        assert_eq!(clean_text("Hello % world  . This text is dirty !"), "hello world this text is dirty");
        assert_eq!(clean_text("tabs\tand\nnewlines"), "tabs and newlines");
        assert_eq!(clean_text("café"), "caf");
    }

    #[test]
    fn short_tokens_go_through_the_stemmer() {
        assert_eq!(tokenize("us ox"), vec!["u", "ox"]);
    }

    #[test]
    fn distinct_keeps_first_occurrence_order() {
        assert_eq!(distinct_terms("cat mat cat sat"), vec!["cat", "mat", "sat"]);
    }
}

//! Porter stemmer over lowercase ASCII words.
//!
//! Steps 1a, 1c, 2, 3 and 4 are ordered rule tables. Within a step the first
//! rule whose suffix matches is selected; if its condition fails on the base
//! (the word minus the suffix) the step leaves the word alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Always,
    /// `M(base) > n`
    MeasureAbove(usize),
    /// `M(base) > n` and the base ends in `s` or `t`.
    MeasureAboveEndsSt(usize),
    ContainsVowel,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    suffix: &'static str,
    replacement: &'static str,
    condition: Condition,
}

const fn rule(suffix: &'static str, replacement: &'static str, condition: Condition) -> Rule {
    Rule { suffix, replacement, condition }
}

use Condition::*;

const STEP_1A: &[Rule] = &[
    rule("sses", "ss", Always),
    rule("ies", "i", Always),
    rule("ss", "ss", Always),
    rule("s", "", Always),
];

const STEP_1C: &[Rule] = &[rule("y", "i", ContainsVowel)];

const STEP_2: &[Rule] = &[
    rule("ational", "ate", MeasureAbove(0)),
    rule("tional", "tion", MeasureAbove(0)),
    rule("enci", "ence", MeasureAbove(0)),
    rule("anci", "ance", MeasureAbove(0)),
    rule("izer", "ize", MeasureAbove(0)),
    rule("abli", "able", MeasureAbove(0)),
    rule("alli", "al", MeasureAbove(0)),
    rule("entli", "ent", MeasureAbove(0)),
    rule("eli", "e", MeasureAbove(0)),
    rule("ousli", "ous", MeasureAbove(0)),
    rule("ization", "ize", MeasureAbove(0)),
    rule("ation", "ate", MeasureAbove(0)),
    rule("ator", "ate", MeasureAbove(0)),
    rule("alism", "al", MeasureAbove(0)),
    rule("iveness", "ive", MeasureAbove(0)),
    rule("fulness", "ful", MeasureAbove(0)),
    rule("ousness", "ous", MeasureAbove(0)),
    rule("aliti", "al", MeasureAbove(0)),
    rule("iviti", "ive", MeasureAbove(0)),
    rule("biliti", "ble", MeasureAbove(0)),
];

const STEP_3: &[Rule] = &[
    rule("icate", "ic", MeasureAbove(0)),
    rule("ative", "", MeasureAbove(0)),
    rule("alize", "al", MeasureAbove(0)),
    rule("iciti", "ic", MeasureAbove(0)),
    rule("ical", "ic", MeasureAbove(0)),
    rule("ful", "", MeasureAbove(0)),
    rule("ness", "", MeasureAbove(0)),
];

const STEP_4: &[Rule] = &[
    rule("al", "", MeasureAbove(1)),
    rule("ance", "", MeasureAbove(1)),
    rule("ence", "", MeasureAbove(1)),
    rule("er", "", MeasureAbove(1)),
    rule("ic", "", MeasureAbove(1)),
    rule("able", "", MeasureAbove(1)),
    rule("ible", "", MeasureAbove(1)),
    rule("ant", "", MeasureAbove(1)),
    rule("ement", "", MeasureAbove(1)),
    rule("ment", "", MeasureAbove(1)),
    rule("ent", "", MeasureAbove(1)),
    rule("ion", "", MeasureAboveEndsSt(1)),
    rule("ou", "", MeasureAbove(1)),
    rule("ism", "", MeasureAbove(1)),
    rule("ate", "", MeasureAbove(1)),
    rule("iti", "", MeasureAbove(1)),
    rule("ous", "", MeasureAbove(1)),
    rule("ive", "", MeasureAbove(1)),
    rule("ize", "", MeasureAbove(1)),
];

fn is_plain_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// `y` takes the opposite class of the letter before it; a leading `y` looks
/// at the last letter of the word instead.
fn is_consonant(word: &[u8], i: usize) -> bool {
    match word[i] {
        c if is_plain_vowel(c) => false,
        b'y' if i == 0 => is_plain_vowel(word[word.len() - 1]),
        b'y' => !is_consonant(word, i - 1),
        _ => true,
    }
}

/// Number of `VC` sequences in the collapsed consonant/vowel form.
fn measure(word: &[u8]) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..word.len() {
        let consonant = is_consonant(word, i);
        if consonant && prev_vowel {
            m += 1;
        }
        prev_vowel = !consonant;
    }
    m
}

fn contains_vowel(word: &[u8]) -> bool {
    (0..word.len()).any(|i| !is_consonant(word, i))
}

/// Last two letters are both consonants, not necessarily the same one.
fn ends_two_consonants(word: &[u8]) -> bool {
    let n = word.len();
    n >= 2 && is_consonant(word, n - 1) && is_consonant(word, n - 2)
}

/// Last three letters are consonant-vowel-consonant and the last is not `w`, `x` or `y`.
fn ends_cvc(word: &[u8]) -> bool {
    let n = word.len();
    n >= 3
        && is_consonant(word, n - 3)
        && !is_consonant(word, n - 2)
        && is_consonant(word, n - 1)
        && !matches!(word[n - 1], b'w' | b'x' | b'y')
}

impl Condition {
    fn holds(self, base: &[u8]) -> bool {
        match self {
            Always => true,
            MeasureAbove(n) => measure(base) > n,
            MeasureAboveEndsSt(n) => measure(base) > n && matches!(base.last(), Some(b's' | b't')),
            ContainsVowel => contains_vowel(base),
        }
    }
}

fn apply_rules(word: &mut Vec<u8>, rules: &[Rule]) {
    let Some(rule) = rules.iter().find(|r| word.ends_with(r.suffix.as_bytes())) else {
        return;
    };
    let base_len = word.len() - rule.suffix.len();
    if rule.condition.holds(&word[..base_len]) {
        word.truncate(base_len);
        word.extend_from_slice(rule.replacement.as_bytes());
    }
}

fn step_1a(word: &mut Vec<u8>) { apply_rules(word, STEP_1A) }

fn step_1b(word: &mut Vec<u8>) {
    if word.ends_with(b"eed") {
        if measure(&word[..word.len() - 3]) > 0 {
            word.pop();
        }
        return;
    }
    let suffix_len = if word.ends_with(b"ed") {
        2
    } else if word.ends_with(b"ing") {
        3
    } else {
        return;
    };
    let base_len = word.len() - suffix_len;
    if !contains_vowel(&word[..base_len]) {
        return;
    }
    word.truncate(base_len);

    if word.ends_with(b"at") || word.ends_with(b"bl") || word.ends_with(b"iz") {
        word.push(b'e');
    } else if ends_two_consonants(word) && !matches!(word.last(), Some(b'l' | b's' | b'z')) {
        word.pop();
    } else if measure(word) == 1 && ends_cvc(word) {
        word.push(b'e');
    }
}

fn step_1c(word: &mut Vec<u8>) { apply_rules(word, STEP_1C) }
fn step_2(word: &mut Vec<u8>) { apply_rules(word, STEP_2) }
fn step_3(word: &mut Vec<u8>) { apply_rules(word, STEP_3) }
fn step_4(word: &mut Vec<u8>) { apply_rules(word, STEP_4) }

fn step_5a(word: &mut Vec<u8>) {
    if word.last() != Some(&b'e') {
        return;
    }
    let base = &word[..word.len() - 1];
    let m = measure(base);
    if m > 1 || (m == 1 && !ends_cvc(base)) {
        word.pop();
    }
}

fn step_5b(word: &mut Vec<u8>) {
    if word.ends_with(b"ll") && measure(word) > 1 {
        word.pop();
    }
}

/// Stems a lowercase ASCII word of any length. Anything else is returned
/// unchanged. The result can be empty (`"s"`).
pub fn stem(word: &str) -> String {
    if !word.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()) {
        return word.to_string();
    }
    let mut w = word.as_bytes().to_vec();
    step_1a(&mut w);
    step_1b(&mut w);
    step_1c(&mut w);
    step_2(&mut w);
    step_3(&mut w);
    step_4(&mut w);
    step_5a(&mut w);
    step_5b(&mut w);
    // only ASCII bytes were ever pushed
    String::from_utf8(w).unwrap_or_else(|_| word.to_string())
}

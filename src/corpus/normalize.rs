// Text normalization — whitespace cleanup and tokenization.
//
// Two jobs live here: `clean` puts raw cell text into the canonical form
// used as the counting key for questions (trimmed, internal whitespace
// collapsed, case preserved for display), and `tokenize` turns text into
// the lowercase content tokens every extraction strategy and the
// classifier share. Using one tokenizer everywhere is what makes keyword
// matching between taxonomy and records meaningful.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};

fn word_pattern() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    // Alphabetic start, 3+ chars total — drops numbers and stub tokens
    WORD_RE.get_or_init(|| Regex::new(r"[a-z][a-z0-9]{2,}").unwrap())
}

fn stop_word_set() -> &'static HashSet<String> {
    static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| get(LANGUAGE::English).into_iter().collect())
}

/// Collapse runs of whitespace to single spaces and trim the ends.
///
/// This is the canonical form for question text — two occurrences of the
/// same literal question must compare equal even if one came in with a
/// trailing newline or doubled spaces.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase content tokens of a text, stop words removed.
///
/// Order follows the text; duplicates are kept (frequency matters to the
/// extraction strategies).
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| !stop_word_set().contains(w))
        .collect()
}

/// Stop-word list for the keyword_extraction crate, which wants a Vec.
pub fn stop_word_list() -> Vec<String> {
    get(LANGUAGE::English)
}

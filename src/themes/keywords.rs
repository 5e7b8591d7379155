// Keyword extraction strategy.
//
// The simplest of the three methods: rank candidate terms by raw corpus
// frequency, fold near-duplicates (plural variants) together, keep the
// top `num_themes` candidates meeting `min_freq`, and let each survivor
// become its own theme. The theme's keyword list is the candidate itself
// followed by the terms that most often share a response with it.
//
// Everything runs over BTreeMaps so iteration order — and therefore the
// output — is deterministic without explicit shuffle-proofing.

use std::collections::{BTreeMap, BTreeSet};

use crate::corpus::normalize;
use crate::error::AnalysisError;
use crate::themes::taxonomy::Theme;
use crate::themes::traits::ThemeExtractor;

/// How many co-occurring terms accompany the candidate in its keyword list.
const COOCCURRING_KEYWORDS: usize = 5;

#[derive(Default)]
pub struct KeywordExtractor;

impl ThemeExtractor for KeywordExtractor {
    fn extract(
        &self,
        docs: &[String],
        min_freq: usize,
        num_themes: usize,
    ) -> Result<Vec<Theme>, AnalysisError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let doc_tokens: Vec<Vec<String>> = docs.iter().map(|d| normalize::tokenize(d)).collect();

        // Corpus-wide frequencies, with plural variants folded into their
        // singular form when both occur.
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for tokens in &doc_tokens {
            for token in tokens {
                *counts.entry(token.clone()).or_insert(0) += 1;
            }
        }
        let counts = merge_near_duplicates(counts);

        // Candidates: frequency floor first, then rank by (count desc,
        // term asc) and keep the top num_themes.
        let mut candidates: Vec<(&String, &usize)> =
            counts.iter().filter(|(_, &c)| c >= min_freq).collect();
        candidates.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(num_themes);

        // Canonical-form token sets per document, for co-occurrence lookups
        let doc_sets: Vec<BTreeSet<String>> = doc_tokens
            .iter()
            .map(|tokens| tokens.iter().map(|t| canonical(t, &counts)).collect())
            .collect();

        let mut themes = Vec::new();
        for (term, _count) in candidates {
            let mut keywords = vec![term.clone()];
            keywords.extend(top_cooccurring(term, &doc_sets));
            themes.push(Theme::new(term, keywords));
        }
        Ok(themes)
    }
}

/// Fold plural variants into their base form when the base also occurs.
///
/// "ticket"/"tickets" counted together under "ticket"; a plural with no
/// singular occurrence keeps its own entry. Intentionally conservative —
/// a real stemmer would also merge verb forms, but mis-merges are worse
/// than misses for theme naming.
fn merge_near_duplicates(counts: BTreeMap<String, usize>) -> BTreeMap<String, usize> {
    let mut merged: BTreeMap<String, usize> = BTreeMap::new();
    for (word, count) in &counts {
        let target = base_form(word, &counts);
        *merged.entry(target).or_insert(0) += count;
    }
    merged
}

fn base_form(word: &str, counts: &BTreeMap<String, usize>) -> String {
    if let Some(stem) = word.strip_suffix("es") {
        if counts.contains_key(stem) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if counts.contains_key(stem) {
            return stem.to_string();
        }
    }
    word.to_string()
}

/// Map a token to its merged canonical form.
fn canonical(word: &str, merged: &BTreeMap<String, usize>) -> String {
    if merged.contains_key(word) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if merged.contains_key(stem) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if merged.contains_key(stem) {
            return stem.to_string();
        }
    }
    word.to_string()
}

/// Terms that most often share a document with `term`, by shared-document
/// count descending, alphabetical on ties.
fn top_cooccurring(term: &str, doc_sets: &[BTreeSet<String>]) -> Vec<String> {
    let mut shared: BTreeMap<&str, usize> = BTreeMap::new();
    for set in doc_sets {
        if !set.contains(term) {
            continue;
        }
        for other in set {
            if other != term {
                *shared.entry(other.as_str()).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<(&str, usize)> = shared.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(COOCCURRING_KEYWORDS)
        .map(|(w, _)| w.to_string())
        .collect()
}

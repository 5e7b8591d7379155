// TF-IDF clustering strategy.
//
// Uses the `keyword_extraction` crate to score terms across the corpus,
// with each response treated as a separate document for IDF computation —
// words that appear in every response get downweighted, words distinctive
// to certain responses get boosted. The ranked terms are then grouped into
// at most `num_themes` clusters by greedy co-occurrence: two terms belong
// together when they keep showing up in the same responses.
//
// Determinism: the ranked term list is re-sorted by (score desc, term asc)
// before clustering, so equal-weight terms always break ties
// alphabetically regardless of hash-map iteration order inside the
// library.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};

use crate::corpus::normalize;
use crate::error::AnalysisError;
use crate::themes::taxonomy::Theme;
use crate::themes::traits::ThemeExtractor;

/// How many related terms a cluster pulls in besides its seed.
const CLUSTER_NEIGHBORS: usize = 5;
/// How many top terms form the theme name.
const NAME_TERMS: usize = 3;

pub struct TfIdfClusterExtractor {
    /// Ranked terms considered per theme slot before clustering
    pub terms_per_theme: usize,
    /// Floor on the candidate pool regardless of num_themes
    pub min_candidate_pool: usize,
}

impl Default for TfIdfClusterExtractor {
    fn default() -> Self {
        Self {
            terms_per_theme: 8,
            min_candidate_pool: 40,
        }
    }
}

impl ThemeExtractor for TfIdfClusterExtractor {
    fn extract(
        &self,
        docs: &[String],
        min_freq: usize,
        num_themes: usize,
    ) -> Result<Vec<Theme>, AnalysisError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let stop_words = normalize::stop_word_list();
        let pool = (num_themes * self.terms_per_theme).max(self.min_candidate_pool);

        let params = TfIdfParams::UnprocessedDocuments(docs, &stop_words, None);
        let tfidf = TfIdf::new(params);
        let mut ranked: Vec<(String, f32)> = tfidf.get_ranked_word_scores(pool);

        // Stabilize ordering before any positional decision is made.
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let doc_tokens: Vec<Vec<String>> = docs.iter().map(|d| normalize::tokenize(d)).collect();
        let clusters = cluster_terms(&ranked, &doc_tokens, num_themes);

        let mut themes = Vec::new();
        for cluster in clusters {
            // A cluster only survives if its terms recur enough in the
            // corpus as a whole.
            let frequency: usize = cluster
                .iter()
                .map(|term| corpus_frequency(&doc_tokens, term))
                .sum();
            if frequency < min_freq {
                continue;
            }

            let name = cluster
                .iter()
                .take(NAME_TERMS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" / ");
            themes.push(Theme::new(&name, cluster));
        }

        Ok(themes)
    }
}

/// Group ranked terms into clusters by co-occurrence in documents.
///
/// Greedy: seed a cluster with the highest-ranked unassigned term, then
/// pull in its most co-occurring unassigned neighbors. Returns each
/// cluster's terms in rank order (seed first).
fn cluster_terms(
    ranked: &[(String, f32)],
    doc_tokens: &[Vec<String>],
    max_clusters: usize,
) -> Vec<Vec<String>> {
    let n = ranked.len();

    // Which ranked terms appear in each document
    let doc_members: Vec<Vec<usize>> = doc_tokens
        .iter()
        .map(|tokens| {
            ranked
                .iter()
                .enumerate()
                .filter(|(_, (term, _))| tokens.iter().any(|t| t == term))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let mut cooccurrence = vec![vec![0u32; n]; n];
    for members in &doc_members {
        for &i in members {
            for &j in members {
                if i != j {
                    cooccurrence[i][j] += 1;
                }
            }
        }
    }

    let mut assigned = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if clusters.len() >= max_clusters {
            break;
        }
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut member_indices = vec![seed];

        // Neighbors ordered by co-occurrence count, then rank position
        let mut candidates: Vec<(usize, u32)> = (0..n)
            .filter(|&i| !assigned[i] && cooccurrence[seed][i] > 0)
            .map(|i| (i, cooccurrence[seed][i]))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        for (idx, _count) in candidates.into_iter().take(CLUSTER_NEIGHBORS) {
            assigned[idx] = true;
            member_indices.push(idx);
        }

        // Keywords stay in global rank order within the cluster, except
        // the seed stays first — it is what the cluster is "about".
        let seed_idx = member_indices[0];
        let mut rest: Vec<usize> = member_indices[1..].to_vec();
        rest.sort_unstable();
        let cluster: Vec<String> = std::iter::once(seed_idx)
            .chain(rest)
            .map(|i| ranked[i].0.clone())
            .collect();
        clusters.push(cluster);
    }

    clusters
}

/// Total occurrences of a term across all documents.
fn corpus_frequency(doc_tokens: &[Vec<String>], term: &str) -> usize {
    doc_tokens
        .iter()
        .map(|tokens| tokens.iter().filter(|t| t.as_str() == term).count())
        .sum()
}

// Topic modeling strategy.
//
// A compact LDA-style model: documents are bags of vocabulary indices,
// word-topic and document-topic count matrices get refined over a bounded
// number of argmax passes, and each topic's top-probability terms become
// a theme. Reproducibility is a hard requirement here, so instead of a
// seeded RNG the initial topic assignment is the fixed function
// (doc_index + word_position) % num_topics and every update picks the
// lowest-index topic on score ties. Identical input always yields an
// identical taxonomy.

use std::collections::BTreeMap;

use crate::corpus::normalize;
use crate::error::AnalysisError;
use crate::themes::taxonomy::Theme;
use crate::themes::traits::ThemeExtractor;

const NAME_TERMS: usize = 3;

pub struct TopicModelExtractor {
    /// Document-topic concentration
    pub alpha: f64,
    /// Topic-word concentration
    pub beta: f64,
    /// Refinement passes over the corpus
    pub iterations: usize,
    /// Top terms kept per topic as keywords
    pub terms_per_topic: usize,
}

impl Default for TopicModelExtractor {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 0.01,
            iterations: 10,
            terms_per_topic: 8,
        }
    }
}

impl ThemeExtractor for TopicModelExtractor {
    fn extract(
        &self,
        docs: &[String],
        min_freq: usize,
        num_themes: usize,
    ) -> Result<Vec<Theme>, AnalysisError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        // Vocabulary: corpus tokens meeting the frequency floor, in
        // deterministic (alphabetical) index order.
        let doc_tokens: Vec<Vec<String>> = docs.iter().map(|d| normalize::tokenize(d)).collect();
        let mut freq: BTreeMap<String, usize> = BTreeMap::new();
        for tokens in &doc_tokens {
            for token in tokens {
                *freq.entry(token.clone()).or_insert(0) += 1;
            }
        }
        let vocab: Vec<String> = freq
            .iter()
            .filter(|(_, &c)| c >= min_freq)
            .map(|(w, _)| w.clone())
            .collect();
        if vocab.is_empty() {
            return Ok(Vec::new());
        }
        let vocab_index: BTreeMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i))
            .collect();

        let word_docs: Vec<Vec<usize>> = doc_tokens
            .iter()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter_map(|t| vocab_index.get(t.as_str()).copied())
                    .collect()
            })
            .collect();

        let k = num_themes;
        let mut word_topic = vec![vec![0usize; k]; vocab.len()];
        let mut doc_topic = vec![vec![0usize; k]; word_docs.len()];
        let mut topic_totals = vec![0usize; k];
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(word_docs.len());

        // Fixed initialization in place of a random seed
        for (doc_id, doc) in word_docs.iter().enumerate() {
            let mut topics = Vec::with_capacity(doc.len());
            for (pos, &word_id) in doc.iter().enumerate() {
                let topic = (doc_id + pos) % k;
                word_topic[word_id][topic] += 1;
                doc_topic[doc_id][topic] += 1;
                topic_totals[topic] += 1;
                topics.push(topic);
            }
            assignments.push(topics);
        }

        for _ in 0..self.iterations {
            for (doc_id, doc) in word_docs.iter().enumerate() {
                for (pos, &word_id) in doc.iter().enumerate() {
                    let old = assignments[doc_id][pos];
                    word_topic[word_id][old] -= 1;
                    doc_topic[doc_id][old] -= 1;
                    topic_totals[old] -= 1;

                    let new = self.best_topic(
                        word_id,
                        doc_id,
                        &word_topic,
                        &doc_topic,
                        &topic_totals,
                        vocab.len(),
                        k,
                    );

                    word_topic[word_id][new] += 1;
                    doc_topic[doc_id][new] += 1;
                    topic_totals[new] += 1;
                    assignments[doc_id][pos] = new;
                }
            }
        }

        // Topics -> themes. A topic's mass is the number of word positions
        // assigned to it; low-mass topics fall below the frequency-
        // equivalent threshold and are dropped.
        let mut themes = Vec::new();
        for topic in 0..k {
            if topic_totals[topic] < min_freq {
                continue;
            }

            let mut terms: Vec<(&str, f64)> = vocab
                .iter()
                .enumerate()
                .filter(|(word_id, _)| word_topic[*word_id][topic] > 0)
                .map(|(word_id, word)| {
                    let p = (word_topic[word_id][topic] as f64 + self.beta)
                        / (topic_totals[topic] as f64 + vocab.len() as f64 * self.beta);
                    (word.as_str(), p)
                })
                .collect();
            terms.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });
            terms.truncate(self.terms_per_topic);

            if terms.is_empty() {
                continue;
            }

            let keywords: Vec<String> = terms.iter().map(|(w, _)| w.to_string()).collect();
            let name = keywords
                .iter()
                .take(NAME_TERMS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" / ");
            themes.push(Theme::new(&name, keywords));
        }

        Ok(themes)
    }
}

impl TopicModelExtractor {
    /// Argmax topic for one word position. Strict greater-than keeps the
    /// lowest topic index on ties, which is what makes refinement
    /// deterministic.
    #[allow(clippy::too_many_arguments)]
    fn best_topic(
        &self,
        word_id: usize,
        doc_id: usize,
        word_topic: &[Vec<usize>],
        doc_topic: &[Vec<usize>],
        topic_totals: &[usize],
        vocab_size: usize,
        k: usize,
    ) -> usize {
        let doc_total: usize = doc_topic[doc_id].iter().sum();
        let mut best = 0;
        let mut best_score = f64::MIN;
        for topic in 0..k {
            let word_p = (word_topic[word_id][topic] as f64 + self.beta)
                / (topic_totals[topic] as f64 + vocab_size as f64 * self.beta);
            let doc_p = (doc_topic[doc_id][topic] as f64 + self.alpha)
                / (doc_total as f64 + k as f64 * self.alpha);
            let score = word_p * doc_p;
            if score > best_score {
                best_score = score;
                best = topic;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_docs() -> Vec<String> {
        vec![
            "pricing tiers confuse customers and pricing changes arrive unannounced".to_string(),
            "support tickets languish and support agents rotate constantly".to_string(),
            "pricing increases hit small customers hardest".to_string(),
            "support escalations vanish into the queue".to_string(),
            "onboarding documentation never matches the actual product".to_string(),
            "onboarding sessions get cancelled and documentation stays stale".to_string(),
        ]
    }

    #[test]
    fn test_extract_is_reproducible() {
        let extractor = TopicModelExtractor::default();
        let docs = sample_docs();
        let a = extractor.extract(&docs, 1, 3).unwrap();
        let b = extractor.extract(&docs, 1, 3).unwrap();
        assert_eq!(a.len(), b.len());
        for (ta, tb) in a.iter().zip(&b) {
            assert_eq!(ta.name, tb.name);
            assert_eq!(ta.keywords, tb.keywords);
        }
    }

    #[test]
    fn test_topic_count_bounded() {
        let extractor = TopicModelExtractor::default();
        let themes = extractor.extract(&sample_docs(), 1, 2).unwrap();
        assert!(themes.len() <= 2);
        assert!(!themes.is_empty());
    }

    #[test]
    fn test_min_freq_prunes_vocabulary() {
        let extractor = TopicModelExtractor::default();
        // Nothing repeats 50 times, so the vocabulary is empty.
        let themes = extractor.extract(&sample_docs(), 50, 3).unwrap();
        assert!(themes.is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let extractor = TopicModelExtractor::default();
        assert!(extractor.extract(&[], 1, 3).unwrap().is_empty());
    }

    #[test]
    fn test_keywords_nonempty_and_named() {
        let extractor = TopicModelExtractor::default();
        let themes = extractor.extract(&sample_docs(), 1, 3).unwrap();
        for theme in &themes {
            assert!(!theme.name.is_empty());
            assert!(!theme.keywords.is_empty());
            assert!(theme.keywords.len() <= extractor.terms_per_topic);
        }
    }
}

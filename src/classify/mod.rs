// Question classification and counting.
//
// Each record is scored against every theme's keyword set; a record may
// match zero or more themes — there is no forced single-label assignment.
// The similarity floor is one shared keyword: a record with no keyword
// overlap at all is counted under no theme. The counting unit is the
// normalized question text, incremented once per occurrence (not once per
// distinct question).
//
// Counts are a multiset aggregation over BTreeMaps, so the output is
// identical for any permutation of the input records, and every theme in
// the taxonomy appears in the result — zero-count themes included — so
// downstream views never need a taxonomy re-lookup.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::corpus::{normalize, GroupCorpus, InterviewRecord};
use crate::themes::taxonomy::{Taxonomy, Theme};

/// Occurrence tally of one question text within one theme, for one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCount {
    pub theme_name: String,
    pub question_text: String,
    pub group: String,
    pub count: u32,
}

/// Per-theme record tally for one group, plus the response-length moments
/// the aggregator needs. One entry per taxonomy theme, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeTally {
    pub theme_name: String,
    /// Records in this group matching the theme
    pub matched_records: u32,
    /// Sum of response char lengths over matching records
    pub response_len_sum: f64,
    /// Sum of squared response char lengths over matching records
    pub response_len_sumsq: f64,
}

/// The classification result for one group against one taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupClassification {
    pub group: String,
    pub record_count: u32,
    /// One tally per theme, taxonomy order, zero-count themes included
    pub tallies: Vec<ThemeTally>,
    /// Non-zero per-question counts, ordered by (theme position, question)
    pub question_counts: Vec<QuestionCount>,
}

impl GroupClassification {
    /// Total matched occurrences per theme, taxonomy order, zeros included.
    pub fn theme_totals(&self) -> Vec<(String, u32)> {
        self.tallies
            .iter()
            .map(|t| (t.theme_name.clone(), t.matched_records))
            .collect()
    }

    /// Question counts for one theme (empty slice semantics for themes
    /// with no matches).
    pub fn counts_for_theme(&self, theme_name: &str) -> Vec<&QuestionCount> {
        self.question_counts
            .iter()
            .filter(|qc| qc.theme_name == theme_name)
            .collect()
    }
}

/// Classify one group's records against the active taxonomy.
///
/// An empty taxonomy produces an empty-but-valid table (no tallies, no
/// counts); the pipeline reports that state separately so it is never
/// mistaken for a successful extraction.
pub fn classify_group(corpus: &GroupCorpus, taxonomy: &Taxonomy) -> GroupClassification {
    // (theme position, question text) -> occurrences
    let mut per_question: BTreeMap<(usize, String), u32> = BTreeMap::new();
    let mut matched = vec![0u32; taxonomy.len()];
    let mut len_sum = vec![0f64; taxonomy.len()];
    let mut len_sumsq = vec![0f64; taxonomy.len()];

    for record in &corpus.records {
        let tokens = record_tokens(record);
        let text = normalized_text(record);
        for (pos, theme) in taxonomy.themes().iter().enumerate() {
            if match_score(theme, &tokens, &text) == 0 {
                continue;
            }
            matched[pos] += 1;
            let len = record.response.chars().count() as f64;
            len_sum[pos] += len;
            len_sumsq[pos] += len * len;
            *per_question
                .entry((pos, record.question.clone()))
                .or_insert(0) += 1;
        }
    }

    let tallies = taxonomy
        .themes()
        .iter()
        .enumerate()
        .map(|(pos, theme)| ThemeTally {
            theme_name: theme.name.clone(),
            matched_records: matched[pos],
            response_len_sum: len_sum[pos],
            response_len_sumsq: len_sumsq[pos],
        })
        .collect();

    let question_counts = per_question
        .into_iter()
        .map(|((pos, question), count)| QuestionCount {
            theme_name: taxonomy.themes()[pos].name.clone(),
            question_text: question,
            group: corpus.group.clone(),
            count,
        })
        .collect();

    GroupClassification {
        group: corpus.group.clone(),
        record_count: corpus.records.len() as u32,
        tallies,
        question_counts,
    }
}

/// Number of theme keywords present in the record.
///
/// Single-word keywords match against the token set; multi-word keywords
/// match as substrings of the normalized lowercase text. Any score >= 1
/// clears the similarity floor.
fn match_score(theme: &Theme, tokens: &HashSet<String>, text: &str) -> usize {
    theme
        .keywords
        .iter()
        .filter(|kw| {
            if kw.contains(' ') {
                text.contains(kw.as_str())
            } else {
                tokens.contains(kw.as_str())
            }
        })
        .count()
}

fn record_tokens(record: &InterviewRecord) -> HashSet<String> {
    let mut tokens: HashSet<String> =
        normalize::tokenize(&record.question).into_iter().collect();
    tokens.extend(normalize::tokenize(&record.response));
    tokens
}

fn normalized_text(record: &InterviewRecord) -> String {
    format!("{} {}", record.question, record.response).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ExtractionMethod;

    fn record(question: &str, response: &str) -> InterviewRecord {
        InterviewRecord {
            question: question.to_string(),
            response: response.to_string(),
            respondent_id: "r".to_string(),
            group: "A".to_string(),
        }
    }

    fn taxonomy() -> Taxonomy {
        let mut tax = Taxonomy::new(ExtractionMethod::KeywordExtraction, 0);
        tax.push(Theme::new("pricing", vec!["pricing".into(), "cost".into()]));
        tax.push(Theme::new("support", vec!["support".into(), "ticket".into()]));
        tax
    }

    fn group(records: Vec<InterviewRecord>) -> GroupCorpus {
        GroupCorpus {
            group: "A".to_string(),
            records,
        }
    }

    #[test]
    fn test_matches_and_zero_counts() {
        let corpus = group(vec![
            record("What about pricing?", "The pricing is steep"),
            record("What about pricing?", "Cost keeps climbing"),
            record("Anything else?", "The onboarding was fine"),
        ]);
        let result = classify_group(&corpus, &taxonomy());

        assert_eq!(result.record_count, 3);
        assert_eq!(result.tallies.len(), 2, "every theme gets a tally");
        assert_eq!(result.theme_totals()[0], ("pricing".to_string(), 2));
        assert_eq!(result.theme_totals()[1], ("support".to_string(), 0));
    }

    #[test]
    fn test_record_can_match_multiple_themes() {
        let corpus = group(vec![record(
            "Overall impressions?",
            "Support ignored my pricing complaint",
        )]);
        let result = classify_group(&corpus, &taxonomy());
        assert_eq!(result.theme_totals()[0].1, 1);
        assert_eq!(result.theme_totals()[1].1, 1);
    }

    #[test]
    fn test_record_can_match_no_theme() {
        let corpus = group(vec![record("Anything else?", "The colors are nice")]);
        let result = classify_group(&corpus, &taxonomy());
        assert!(result.theme_totals().iter().all(|(_, c)| *c == 0));
        assert!(result.question_counts.is_empty());
    }

    #[test]
    fn test_same_question_increments_per_occurrence() {
        let corpus = group(vec![
            record("What about pricing?", "pricing is high"),
            record("What about pricing?", "pricing went up"),
            record("What about pricing?", "pricing doubled"),
        ]);
        let result = classify_group(&corpus, &taxonomy());
        let counts = result.counts_for_theme("pricing");
        assert_eq!(counts.len(), 1, "one distinct question");
        assert_eq!(counts[0].count, 3, "counted once per occurrence");
    }

    #[test]
    fn test_order_independence() {
        let records = vec![
            record("Q1?", "pricing hurts"),
            record("Q2?", "support is slow"),
            record("Q3?", "cost and ticket delays"),
            record("Q4?", "nothing to add"),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        let a = classify_group(&group(records), &taxonomy());
        let b = classify_group(&group(reversed), &taxonomy());

        assert_eq!(a.theme_totals(), b.theme_totals());
        let qa: Vec<(String, String, u32)> = a
            .question_counts
            .iter()
            .map(|q| (q.theme_name.clone(), q.question_text.clone(), q.count))
            .collect();
        let qb: Vec<(String, String, u32)> = b
            .question_counts
            .iter()
            .map(|q| (q.theme_name.clone(), q.question_text.clone(), q.count))
            .collect();
        assert_eq!(qa, qb);
    }

    #[test]
    fn test_empty_taxonomy_is_empty_valid_table() {
        let empty = Taxonomy::new(ExtractionMethod::KeywordExtraction, 0);
        let corpus = group(vec![record("Q?", "pricing")]);
        let result = classify_group(&corpus, &empty);
        assert!(result.tallies.is_empty());
        assert!(result.question_counts.is_empty());
        assert_eq!(result.record_count, 1);
    }

    #[test]
    fn test_multiword_keyword_matches_substring() {
        let mut tax = Taxonomy::new(ExtractionMethod::KeywordExtraction, 0);
        tax.push(Theme::new("onboarding", vec!["account setup".into()]));
        let corpus = group(vec![record("Q?", "The account setup dragged on")]);
        let result = classify_group(&corpus, &tax);
        assert_eq!(result.theme_totals()[0].1, 1);
    }
}

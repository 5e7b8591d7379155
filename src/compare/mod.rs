// Cross-group comparison views.
//
// Derived, read-only aggregations over one taxonomy plus the per-group
// classification results. Views are recomputed on demand and never
// persisted — only their inputs are. All three methods tolerate a group
// with zero matching records by emitting 0.0 instead of dividing by zero.

use crate::classify::GroupClassification;
use crate::error::AnalysisError;
use crate::params::ComparisonMethod;
use crate::themes::taxonomy::Taxonomy;

/// Mean/variance of response length for one theme/group cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthStats {
    pub matched: u32,
    pub mean: f64,
    pub variance: f64,
}

/// One theme's prevalence across all groups (values in [0, 1]).
#[derive(Debug, Clone)]
pub struct PrevalenceRow {
    pub theme_name: String,
    pub values: Vec<f64>,
}

/// One question's counts across all groups, within the selected theme.
#[derive(Debug, Clone)]
pub struct DistributionRow {
    pub question_text: String,
    pub counts: Vec<u32>,
}

/// One theme's response-length statistics across all groups.
#[derive(Debug, Clone)]
pub struct LengthRow {
    pub theme_name: String,
    pub stats: Vec<LengthStats>,
}

/// The derived comparison structure consumed by rendering and export.
#[derive(Debug, Clone)]
pub enum ComparisonView {
    Prevalence {
        groups: Vec<String>,
        rows: Vec<PrevalenceRow>,
    },
    Distribution {
        theme_name: String,
        groups: Vec<String>,
        rows: Vec<DistributionRow>,
    },
    ResponseLength {
        groups: Vec<String>,
        rows: Vec<LengthRow>,
    },
}

/// Build a comparison view from the taxonomy and per-group counts.
///
/// `selected_theme` is required for Question Distribution and ignored by
/// the other methods; naming a theme absent from the taxonomy is rejected
/// with UnknownTheme at this boundary.
pub fn aggregate(
    taxonomy: &Taxonomy,
    classifications: &[GroupClassification],
    method: ComparisonMethod,
    selected_theme: Option<&str>,
) -> Result<ComparisonView, AnalysisError> {
    if taxonomy.is_empty() {
        return Err(AnalysisError::EmptyTaxonomy);
    }
    let groups: Vec<String> = classifications.iter().map(|c| c.group.clone()).collect();

    match method {
        ComparisonMethod::ThemePrevalence => {
            let rows = taxonomy
                .themes()
                .iter()
                .enumerate()
                .map(|(pos, theme)| PrevalenceRow {
                    theme_name: theme.name.clone(),
                    values: classifications
                        .iter()
                        .map(|c| prevalence(c, pos))
                        .collect(),
                })
                .collect();
            Ok(ComparisonView::Prevalence { groups, rows })
        }

        ComparisonMethod::QuestionDistribution => {
            let theme_name = selected_theme.ok_or_else(|| {
                AnalysisError::InvalidParameters(
                    "Question Distribution requires a selected theme".to_string(),
                )
            })?;
            if taxonomy.get(theme_name).is_none() {
                return Err(AnalysisError::UnknownTheme(theme_name.to_string()));
            }

            // Union of question texts for this theme across groups
            let mut questions: Vec<String> = classifications
                .iter()
                .flat_map(|c| c.counts_for_theme(theme_name))
                .map(|qc| qc.question_text.clone())
                .collect();
            questions.sort();
            questions.dedup();

            let mut rows: Vec<DistributionRow> = questions
                .into_iter()
                .map(|question| {
                    let counts = classifications
                        .iter()
                        .map(|c| {
                            c.counts_for_theme(theme_name)
                                .iter()
                                .find(|qc| qc.question_text == question)
                                .map(|qc| qc.count)
                                .unwrap_or(0)
                        })
                        .collect();
                    DistributionRow {
                        question_text: question,
                        counts,
                    }
                })
                .collect();
            // Busiest questions first; alphabetical among equals
            rows.sort_by(|a, b| {
                let ta: u32 = a.counts.iter().sum();
                let tb: u32 = b.counts.iter().sum();
                tb.cmp(&ta).then_with(|| a.question_text.cmp(&b.question_text))
            });

            Ok(ComparisonView::Distribution {
                theme_name: theme_name.to_string(),
                groups,
                rows,
            })
        }

        ComparisonMethod::ResponseLength => {
            let rows = taxonomy
                .themes()
                .iter()
                .enumerate()
                .map(|(pos, theme)| LengthRow {
                    theme_name: theme.name.clone(),
                    stats: classifications
                        .iter()
                        .map(|c| length_stats(c, pos))
                        .collect(),
                })
                .collect();
            Ok(ComparisonView::ResponseLength { groups, rows })
        }
    }
}

/// Matched-record proportion for one theme in one group; 0.0 for an
/// empty group.
fn prevalence(classification: &GroupClassification, theme_pos: usize) -> f64 {
    if classification.record_count == 0 {
        return 0.0;
    }
    let matched = classification.tallies[theme_pos].matched_records as f64;
    matched / classification.record_count as f64
}

/// Population mean/variance of response length from the stored moments;
/// zero-match cells emit zeros.
fn length_stats(classification: &GroupClassification, theme_pos: usize) -> LengthStats {
    let tally = &classification.tallies[theme_pos];
    let n = tally.matched_records as f64;
    if tally.matched_records == 0 {
        return LengthStats {
            matched: 0,
            mean: 0.0,
            variance: 0.0,
        };
    }
    let mean = tally.response_len_sum / n;
    let variance = (tally.response_len_sumsq / n - mean * mean).max(0.0);
    LengthStats {
        matched: tally.matched_records,
        mean,
        variance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{QuestionCount, ThemeTally};
    use crate::params::ExtractionMethod;
    use crate::themes::taxonomy::Theme;

    fn taxonomy() -> Taxonomy {
        let mut tax = Taxonomy::new(ExtractionMethod::KeywordExtraction, 0);
        tax.push(Theme::new("pricing", vec!["pricing".into()]));
        tax.push(Theme::new("support", vec!["support".into()]));
        tax
    }

    fn classification(
        group: &str,
        record_count: u32,
        pricing: (u32, f64, f64),
        support: (u32, f64, f64),
        counts: Vec<QuestionCount>,
    ) -> GroupClassification {
        GroupClassification {
            group: group.to_string(),
            record_count,
            tallies: vec![
                ThemeTally {
                    theme_name: "pricing".to_string(),
                    matched_records: pricing.0,
                    response_len_sum: pricing.1,
                    response_len_sumsq: pricing.2,
                },
                ThemeTally {
                    theme_name: "support".to_string(),
                    matched_records: support.0,
                    response_len_sum: support.1,
                    response_len_sumsq: support.2,
                },
            ],
            question_counts: counts,
        }
    }

    fn qc(theme: &str, question: &str, group: &str, count: u32) -> QuestionCount {
        QuestionCount {
            theme_name: theme.to_string(),
            question_text: question.to_string(),
            group: group.to_string(),
            count,
        }
    }

    #[test]
    fn test_prevalence_values_in_unit_interval() {
        let cls = vec![
            classification("A", 5, (3, 60.0, 1300.0), (0, 0.0, 0.0), vec![]),
            classification("B", 4, (4, 80.0, 1700.0), (1, 20.0, 400.0), vec![]),
        ];
        let view = aggregate(&taxonomy(), &cls, ComparisonMethod::ThemePrevalence, None).unwrap();
        match view {
            ComparisonView::Prevalence { rows, groups } => {
                assert_eq!(groups, vec!["A", "B"]);
                for row in &rows {
                    for v in &row.values {
                        assert!((0.0..=1.0).contains(v), "prevalence {v} out of range");
                    }
                }
                assert!((rows[0].values[0] - 0.6).abs() < 1e-9);
                assert!((rows[0].values[1] - 1.0).abs() < 1e-9);
                assert_eq!(rows[1].values[0], 0.0);
            }
            other => panic!("wrong view: {other:?}"),
        }
    }

    #[test]
    fn test_prevalence_empty_group_is_zero_not_nan() {
        let cls = vec![classification("A", 0, (0, 0.0, 0.0), (0, 0.0, 0.0), vec![])];
        let view = aggregate(&taxonomy(), &cls, ComparisonMethod::ThemePrevalence, None).unwrap();
        match view {
            ComparisonView::Prevalence { rows, .. } => {
                assert_eq!(rows[0].values[0], 0.0);
            }
            other => panic!("wrong view: {other:?}"),
        }
    }

    #[test]
    fn test_empty_taxonomy_is_surfaced_not_silent() {
        let empty = Taxonomy::new(ExtractionMethod::KeywordExtraction, 0);
        let err = aggregate(&empty, &[], ComparisonMethod::ThemePrevalence, None).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyTaxonomy);
    }

    #[test]
    fn test_distribution_requires_theme() {
        let err = aggregate(&taxonomy(), &[], ComparisonMethod::QuestionDistribution, None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameters(_)));
    }

    #[test]
    fn test_distribution_unknown_theme_rejected() {
        let err = aggregate(
            &taxonomy(),
            &[],
            ComparisonMethod::QuestionDistribution,
            Some("billing"),
        )
        .unwrap_err();
        assert_eq!(err, AnalysisError::UnknownTheme("billing".to_string()));
    }

    #[test]
    fn test_distribution_unions_questions_across_groups() {
        let cls = vec![
            classification(
                "A",
                5,
                (3, 0.0, 0.0),
                (0, 0.0, 0.0),
                vec![qc("pricing", "Q1?", "A", 2), qc("pricing", "Q2?", "A", 1)],
            ),
            classification(
                "B",
                5,
                (2, 0.0, 0.0),
                (0, 0.0, 0.0),
                vec![qc("pricing", "Q2?", "B", 2)],
            ),
        ];
        let view = aggregate(
            &taxonomy(),
            &cls,
            ComparisonMethod::QuestionDistribution,
            Some("pricing"),
        )
        .unwrap();
        match view {
            ComparisonView::Distribution { rows, .. } => {
                assert_eq!(rows.len(), 2);
                // Q2 totals 3 across groups, Q1 totals 2
                assert_eq!(rows[0].question_text, "Q2?");
                assert_eq!(rows[0].counts, vec![1, 2]);
                assert_eq!(rows[1].question_text, "Q1?");
                assert_eq!(rows[1].counts, vec![2, 0]);
            }
            other => panic!("wrong view: {other:?}"),
        }
    }

    #[test]
    fn test_response_length_mean_and_variance() {
        // Two matching responses of lengths 10 and 20:
        // mean 15, population variance 25
        let cls = vec![classification(
            "A",
            2,
            (2, 30.0, 500.0),
            (0, 0.0, 0.0),
            vec![],
        )];
        let view = aggregate(&taxonomy(), &cls, ComparisonMethod::ResponseLength, None).unwrap();
        match view {
            ComparisonView::ResponseLength { rows, .. } => {
                let stats = rows[0].stats[0];
                assert_eq!(stats.matched, 2);
                assert!((stats.mean - 15.0).abs() < 1e-9);
                assert!((stats.variance - 25.0).abs() < 1e-9);
                // Zero-match cell emits zeros
                assert_eq!(rows[1].stats[0].mean, 0.0);
                assert_eq!(rows[1].stats[0].variance, 0.0);
            }
            other => panic!("wrong view: {other:?}"),
        }
    }
}

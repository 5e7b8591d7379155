// Unit tests for group classification against a fixed taxonomy.

use weft::classify::classify_group;
use weft::corpus::{GroupCorpus, InterviewRecord};
use weft::params::ExtractionMethod;
use weft::themes::taxonomy::{Taxonomy, Theme};

fn record(question: &str, response: &str, id: &str) -> InterviewRecord {
    InterviewRecord {
        question: question.to_string(),
        response: response.to_string(),
        respondent_id: id.to_string(),
        group: "A".to_string(),
    }
}

#[test]
fn counts_three_pricing_matches_and_zero_support() {
    let mut taxonomy = Taxonomy::new(ExtractionMethod::KeywordExtraction, 5);
    taxonomy.push(Theme::new("Pricing", vec!["pricing".into(), "cost".into()]));
    taxonomy.push(Theme::new("Support", vec!["support".into(), "ticket".into()]));

    let corpus = GroupCorpus {
        group: "A".to_string(),
        records: vec![
            record("What bothers you?", "the pricing model is opaque", "r1"),
            record("What bothers you?", "cost went up twice this year", "r2"),
            record("Anything else on billing?", "pricing tiers overlap", "r3"),
            record("How is the documentation?", "mostly fine", "r4"),
            record("How is the documentation?", "outdated screenshots", "r5"),
        ],
    };

    let result = classify_group(&corpus, &taxonomy);

    assert_eq!(result.record_count, 5);
    assert_eq!(result.tallies.len(), 2, "one tally per theme, zeros included");
    assert_eq!(result.theme_totals()[0], ("Pricing".to_string(), 3));
    assert_eq!(result.theme_totals()[1], ("Support".to_string(), 0));

    // Zero-count theme contributes no question rows
    assert!(result.counts_for_theme("Support").is_empty());
    let pricing_total: u32 = result
        .counts_for_theme("Pricing")
        .iter()
        .map(|qc| qc.count)
        .sum();
    assert_eq!(pricing_total, 3);
}

#[test]
fn every_theme_gets_a_tally_even_on_an_unrelated_corpus() {
    let mut taxonomy = Taxonomy::new(ExtractionMethod::TfIdfClustering, 2);
    taxonomy.push(Theme::new("latency", vec!["latency".into()]));
    taxonomy.push(Theme::new("billing", vec!["billing".into()]));
    taxonomy.push(Theme::new("exports", vec!["exports".into()]));

    let corpus = GroupCorpus {
        group: "B".to_string(),
        records: vec![
            record("Q?", "the weather was lovely", "r1"),
            record("Q?", "no complaints whatsoever", "r2"),
        ],
    };

    let result = classify_group(&corpus, &taxonomy);
    assert_eq!(result.tallies.len(), 3);
    assert!(result.theme_totals().iter().all(|(_, count)| *count == 0));
}

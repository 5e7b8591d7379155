// Theme discovery — turning the combined corpus into a taxonomy.
//
// The three extraction methods are polymorphic strategies over one
// capability (text corpus -> themes), selected by ExtractionMethod and
// dispatched behind the ThemeExtractor trait. Each strategy is
// independently testable and deterministic: for a fixed corpus and
// parameters, repeated calls return an identical taxonomy.

pub mod keywords;
pub mod taxonomy;
pub mod tfidf;
pub mod topic_model;
pub mod traits;

use crate::corpus::InterviewRecord;
use crate::error::AnalysisError;
use crate::params::AnalysisParams;
use crate::themes::taxonomy::{Taxonomy, Theme};
use crate::themes::traits::ThemeExtractor;

/// Extract a theme taxonomy from the combined corpus.
///
/// Group labels on the records are retained but not used here — extraction
/// always runs once over the union of all groups. An empty corpus (or a
/// corpus where no candidate meets `min_theme_freq`) yields an empty
/// taxonomy, not an error; the pipeline is responsible for distinguishing
/// "ran on zero records" from "zero themes found".
pub fn extract(
    records: &[InterviewRecord],
    params: &AnalysisParams,
) -> Result<Taxonomy, AnalysisError> {
    let min_freq = params.min_theme_freq as usize;
    let num_themes = params.num_themes as usize;

    // Responses are the documents; questions only matter to classification.
    let docs: Vec<String> = records.iter().map(|r| r.response.clone()).collect();

    let extractor: Box<dyn ThemeExtractor> = match params.extraction_method {
        crate::params::ExtractionMethod::TfIdfClustering => {
            Box::new(tfidf::TfIdfClusterExtractor::default())
        }
        crate::params::ExtractionMethod::KeywordExtraction => {
            Box::new(keywords::KeywordExtractor::default())
        }
        crate::params::ExtractionMethod::TopicModeling => {
            Box::new(topic_model::TopicModelExtractor::default())
        }
    };

    let themes = extractor.extract(&docs, min_freq, num_themes)?;

    let mut taxonomy = Taxonomy::new(params.extraction_method, records.len() as u32);
    for theme in dedupe_names(themes) {
        taxonomy.push(theme);
    }
    Ok(taxonomy)
}

/// Enforce the name-uniqueness invariant across strategy output.
///
/// Strategies produce disjoint term sets in practice, but topic models can
/// surface the same top terms for two topics on small corpora. Later
/// duplicates get a positional suffix rather than silently shadowing the
/// earlier theme.
fn dedupe_names(themes: Vec<Theme>) -> Vec<Theme> {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(themes.len());
    for (i, mut theme) in themes.into_iter().enumerate() {
        if !seen.insert(theme.name.clone()) {
            theme.name = format!("{} ({})", theme.name, i + 1);
            seen.insert(theme.name.clone());
        }
        out.push(theme);
    }
    out
}

// Analysis parameters — the configuration set exposed to the user.
//
// Every enumerated value the UI surface accepts is parsed here, and
// anything outside the set is rejected with InvalidParameters before
// processing starts. The canonical names match the user-facing labels;
// hyphenated lowercase aliases exist for CLI ergonomics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Which theme extraction strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// TF-IDF vectors over responses, greedy co-occurrence clustering
    TfIdfClustering,
    /// Corpus-wide frequency ranking of candidate keywords
    KeywordExtraction,
    /// Simplified topic model with deterministic initialization
    TopicModeling,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::TfIdfClustering => "TF-IDF Clustering",
            ExtractionMethod::KeywordExtraction => "Keyword Extraction",
            ExtractionMethod::TopicModeling => "Topic Modeling",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtractionMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tf-idf clustering" | "tfidf-clustering" | "tfidf" => {
                Ok(ExtractionMethod::TfIdfClustering)
            }
            "keyword extraction" | "keyword-extraction" | "keywords" => {
                Ok(ExtractionMethod::KeywordExtraction)
            }
            "topic modeling" | "topic-modeling" | "topics" => Ok(ExtractionMethod::TopicModeling),
            other => Err(AnalysisError::InvalidParameters(format!(
                "unrecognized extraction method '{other}' \
                 (expected: TF-IDF Clustering, Keyword Extraction, Topic Modeling)"
            ))),
        }
    }
}

/// Which cross-group comparison to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMethod {
    /// Proportion of each group's records matching each theme
    ThemePrevalence,
    /// Per-question counts across groups for one selected theme
    QuestionDistribution,
    /// Mean/variance of response length per theme per group
    ResponseLength,
}

impl ComparisonMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMethod::ThemePrevalence => "Theme Prevalence",
            ComparisonMethod::QuestionDistribution => "Question Distribution",
            ComparisonMethod::ResponseLength => "Response Length",
        }
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComparisonMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "theme prevalence" | "theme-prevalence" | "prevalence" => {
                Ok(ComparisonMethod::ThemePrevalence)
            }
            "question distribution" | "question-distribution" | "distribution" => {
                Ok(ComparisonMethod::QuestionDistribution)
            }
            "response length" | "response-length" | "length" => {
                Ok(ComparisonMethod::ResponseLength)
            }
            other => Err(AnalysisError::InvalidParameters(format!(
                "unrecognized comparison method '{other}' \
                 (expected: Theme Prevalence, Question Distribution, Response Length)"
            ))),
        }
    }
}

/// Export format for comparison views.
///
/// All three values parse as valid configuration. Only CSV has a writer
/// in this build; the spreadsheet and PDF serializers are external
/// collaborators and the CLI reports them as not wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "Excel",
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AnalysisError::InvalidParameters(format!(
                "unrecognized export format '{other}' (expected: Excel, CSV, PDF)"
            ))),
        }
    }
}

/// The validated parameter set for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Minimum occurrence count for a candidate topic/keyword to be eligible
    pub min_theme_freq: u32,
    /// Upper bound on taxonomy size
    pub num_themes: u32,
    pub extraction_method: ExtractionMethod,
}

impl AnalysisParams {
    /// Validate and build the parameter set. Both thresholds must be >= 1.
    pub fn new(
        min_theme_freq: u32,
        num_themes: u32,
        extraction_method: ExtractionMethod,
    ) -> Result<Self, AnalysisError> {
        if min_theme_freq < 1 {
            return Err(AnalysisError::InvalidParameters(
                "min_theme_freq must be >= 1".to_string(),
            ));
        }
        if num_themes < 1 {
            return Err(AnalysisError::InvalidParameters(
                "num_themes must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            min_theme_freq,
            num_themes,
            extraction_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_method_canonical_names() {
        assert_eq!(
            "TF-IDF Clustering".parse::<ExtractionMethod>().unwrap(),
            ExtractionMethod::TfIdfClustering
        );
        assert_eq!(
            "Keyword Extraction".parse::<ExtractionMethod>().unwrap(),
            ExtractionMethod::KeywordExtraction
        );
        assert_eq!(
            "Topic Modeling".parse::<ExtractionMethod>().unwrap(),
            ExtractionMethod::TopicModeling
        );
    }

    #[test]
    fn test_extraction_method_rejects_unknown() {
        let err = "LLM Magic".parse::<ExtractionMethod>().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameters(_)));
    }

    #[test]
    fn test_comparison_method_aliases() {
        assert_eq!(
            "prevalence".parse::<ComparisonMethod>().unwrap(),
            ComparisonMethod::ThemePrevalence
        );
        assert_eq!(
            "response-length".parse::<ComparisonMethod>().unwrap(),
            ComparisonMethod::ResponseLength
        );
        assert!("histogram".parse::<ComparisonMethod>().is_err());
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_params_reject_zero_thresholds() {
        assert!(AnalysisParams::new(0, 5, ExtractionMethod::TfIdfClustering).is_err());
        assert!(AnalysisParams::new(1, 0, ExtractionMethod::TfIdfClustering).is_err());
        assert!(AnalysisParams::new(1, 1, ExtractionMethod::TfIdfClustering).is_ok());
    }
}

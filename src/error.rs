// Core failure taxonomy for the analysis pipeline.
//
// These variants are the outcomes callers are expected to branch on.
// "Empty taxonomy" and "extraction failed" must never be conflated, so
// empty-result states get their own variants instead of being folded
// into a generic error string.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Out-of-range threshold/count or unrecognized enum value.
    /// Rejected before any processing starts.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A run was attempted over zero records. Distinct from "zero themes
    /// found" — a legitimate empty taxonomy is not an error.
    #[error("Empty corpus: no records to analyze")]
    EmptyCorpus,

    /// Classification or aggregation was asked to work against a taxonomy
    /// with zero themes. Surfaced to the caller, not fatal.
    #[error("Empty taxonomy: extraction produced no themes")]
    EmptyTaxonomy,

    /// Malformed input rows. Aborts the entire run — no partial taxonomy
    /// or counts are ever produced from partially-validated data.
    #[error("Validation failed for group '{group}': {reason}")]
    ValidationFailure { group: String, reason: String },

    /// Reference to a theme absent from the active taxonomy.
    #[error("Unknown theme: '{0}' is not in the active taxonomy")]
    UnknownTheme(String),
}

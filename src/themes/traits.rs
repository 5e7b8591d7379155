// Theme extractor trait — the seam between the pipeline and the three
// extraction strategies. The dispatcher in mod.rs picks an implementation
// from ExtractionMethod; nothing else in the crate knows which strategy
// ran.

use crate::error::AnalysisError;
use crate::themes::taxonomy::Theme;

/// Strategy for turning a document corpus into ranked themes.
pub trait ThemeExtractor {
    /// Produce at most `num_themes` themes from `docs`.
    ///
    /// Candidates whose corpus frequency falls below `min_freq` are
    /// dropped, so the result may be shorter than `num_themes` — or empty,
    /// which is a legitimate outcome, not an error. Implementations must
    /// be deterministic: identical inputs produce identical output,
    /// including keyword order.
    fn extract(
        &self,
        docs: &[String],
        min_freq: usize,
        num_themes: usize,
    ) -> Result<Vec<Theme>, AnalysisError>;
}

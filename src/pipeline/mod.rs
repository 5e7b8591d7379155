// Run orchestration — one synchronous pass from group files to a ready
// analysis result.
//
// Order matters: every group is loaded and validated before extraction
// starts, so a validation failure in any single group aborts the run with
// no partial taxonomy. The taxonomy is built exactly once over the union
// of all groups and is immutable before the first classification runs;
// classification then reads only the shared taxonomy and its own group's
// records. Persistence is the caller's problem — a run either completes
// or the whole result is discarded.

use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::classify::{classify_group, GroupClassification};
use crate::corpus::{loader, GroupCorpus, InterviewRecord};
use crate::error::AnalysisError;
use crate::params::AnalysisParams;
use crate::themes;
use crate::themes::taxonomy::Taxonomy;

/// Where a run session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Processing,
    Ready,
}

/// The complete, immutable result of one analysis run — the single source
/// of truth for "current analysis". Replaced wholesale, never patched
/// field by field.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub params: AnalysisParams,
    pub taxonomy: Taxonomy,
    pub groups: Vec<GroupCorpus>,
    pub classifications: Vec<GroupClassification>,
}

impl AnalysisResult {
    pub fn total_records(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Extraction legitimately found nothing. Distinguishable from an
    /// extraction error, which would have failed the run.
    pub fn is_empty_taxonomy(&self) -> bool {
        self.taxonomy.is_empty()
    }
}

/// In-memory session holding the active analysis across operations.
///
/// The old result stays in place until a replacement run or load fully
/// succeeds, so a failure can never leave half-updated state behind.
pub struct Session {
    state: RunState,
    result: Option<AnalysisResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            result: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Run the pipeline over the given group files and swap the result in
    /// atomically on success.
    pub fn process(
        &mut self,
        group_files: &[(String, PathBuf)],
        params: &AnalysisParams,
    ) -> Result<&AnalysisResult> {
        let previous_state = self.state;
        self.state = RunState::Processing;
        match run(group_files, params) {
            Ok(result) => {
                self.state = RunState::Ready;
                Ok(self.result.insert(result))
            }
            Err(e) => {
                // Previous result untouched
                self.state = previous_state;
                Err(e)
            }
        }
    }

    /// Replace the session state with a result restored from the project
    /// repository (the Loading -> Ready transition).
    pub fn install(&mut self, result: AnalysisResult) {
        self.result = Some(result);
        self.state = RunState::Ready;
    }
}

/// Execute one full run: load -> validate -> normalize -> extract ->
/// classify per group.
pub fn run(group_files: &[(String, PathBuf)], params: &AnalysisParams) -> Result<AnalysisResult> {
    // Load and validate every group before any analysis starts
    let mut groups: Vec<GroupCorpus> = Vec::with_capacity(group_files.len());
    for (group, path) in group_files {
        let corpus = loader::load_group_file(path, group)?;
        info!(group = %group, records = corpus.len(), "Loaded group");
        groups.push(corpus);
    }

    let combined: Vec<InterviewRecord> = groups
        .iter()
        .flat_map(|g| g.records.iter().cloned())
        .collect();
    if combined.is_empty() {
        return Err(AnalysisError::EmptyCorpus.into());
    }

    let taxonomy = themes::extract(&combined, params)?;
    info!(
        themes = taxonomy.len(),
        records = combined.len(),
        method = %params.extraction_method,
        "Extracted taxonomy"
    );

    // Taxonomy is frozen from here on; each group is scored independently
    let bar = ProgressBar::new(groups.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("  classifying {bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut classifications = Vec::with_capacity(groups.len());
    for group in &groups {
        bar.set_message(group.group.clone());
        classifications.push(classify_group(group, &taxonomy));
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(AnalysisResult {
        params: *params,
        taxonomy,
        groups,
        classifications,
    })
}

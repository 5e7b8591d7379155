// Record store — interview records, per-group corpora, loading and
// normalization.
//
// Records are immutable once loaded. The analysis core borrows them;
// nothing downstream mutates a record after preprocessing.

pub mod loader;
pub mod normalize;

use serde::{Deserialize, Serialize};

/// One interview response row, after preprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub question: String,
    pub response: String,
    pub respondent_id: String,
    /// The participant group this record belongs to
    pub group: String,
}

/// All records for one participant group.
#[derive(Debug, Clone)]
pub struct GroupCorpus {
    pub group: String,
    pub records: Vec<InterviewRecord>,
}

impl GroupCorpus {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

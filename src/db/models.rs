// Data models — Rust structs that map to database rows.
//
// Kept separate from the queries so other modules can use them without
// depending on rusqlite directly.

use serde::{Deserialize, Serialize};

use crate::classify::QuestionCount;
use crate::corpus::GroupCorpus;
use crate::params::AnalysisParams;
use crate::themes::taxonomy::Taxonomy;

/// One entry in the project list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Full project metadata, including the parameters the run used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub params: AnalysisParams,
    pub created_at: String,
}

/// Everything needed to restore an analysis from the repository.
#[derive(Debug, Clone)]
pub struct StoredProject {
    pub meta: ProjectMeta,
    pub taxonomy: Taxonomy,
    pub groups: Vec<GroupCorpus>,
    pub counts: Vec<QuestionCount>,
}

// Storage trait — abstracts the project repository behind an async
// interface so command handlers never touch rusqlite directly.

use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::{ProjectSummary, StoredProject};
use crate::pipeline::AnalysisResult;

/// Persistent store for analysis projects and session state.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Persist a completed run as a new project; returns its id.
    async fn save_analysis(
        &self,
        name: &str,
        description: &str,
        result: &AnalysisResult,
    ) -> Result<i64>;

    /// List saved projects, newest first.
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    /// Load a project in full, or None when the id is unknown.
    async fn load_project(&self, id: i64) -> Result<Option<StoredProject>>;

    /// Delete a project and its dependent rows. Returns false when the
    /// project does not exist and an error when it is the current project.
    async fn delete_project(&self, id: i64) -> Result<bool>;

    /// Number of saved projects.
    async fn project_count(&self) -> Result<i64>;

    /// Id of the project the session currently has loaded, if any.
    async fn current_project(&self) -> Result<Option<i64>>;

    async fn set_current_project(&self, id: i64) -> Result<()>;

    async fn clear_current_project(&self) -> Result<()>;
}

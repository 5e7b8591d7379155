// SQLite implementation of the project store.
//
// rusqlite connections are not Sync, so the connection sits behind a
// tokio Mutex. Fine for a single-user CLI; queries are short.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::db::models::{ProjectSummary, StoredProject};
use crate::db::traits::ProjectStore;
use crate::db::{queries, schema};
use crate::pipeline::AnalysisResult;

const CURRENT_PROJECT_KEY: &str = "current_project";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Fresh in-memory store with the schema applied. Used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn save_analysis(
        &self,
        name: &str,
        description: &str,
        result: &AnalysisResult,
    ) -> Result<i64> {
        let mut conn = self.conn.lock().await;
        let (id, _) = queries::save_analysis(&mut conn, name, description, result)?;
        Ok(id)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let conn = self.conn.lock().await;
        queries::load_projects(&conn)
    }

    async fn load_project(&self, id: i64) -> Result<Option<StoredProject>> {
        let conn = self.conn.lock().await;
        queries::load_project(&conn, id)
    }

    async fn delete_project(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn.lock().await;
        queries::delete_project(&mut conn, id)
    }

    async fn project_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::project_count(&conn)
    }

    async fn current_project(&self) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        match queries::get_session_state(&conn, CURRENT_PROJECT_KEY)? {
            Some(value) => {
                let id = value
                    .parse::<i64>()
                    .context("session state holds a non-numeric project id")?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    async fn set_current_project(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::set_session_state(&conn, CURRENT_PROJECT_KEY, &id.to_string())
    }

    async fn clear_current_project(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::clear_session_state(&conn, CURRENT_PROJECT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_group;
    use crate::corpus::{GroupCorpus, InterviewRecord};
    use crate::params::{AnalysisParams, ExtractionMethod};
    use crate::themes::taxonomy::{Taxonomy, Theme};

    fn sample_result() -> AnalysisResult {
        let params = AnalysisParams::new(1, 2, ExtractionMethod::TfIdfClustering).unwrap();
        let mut taxonomy = Taxonomy::new(params.extraction_method, 1);
        taxonomy.push(Theme::new("latency", vec!["latency".into(), "slow".into()]));

        let group = GroupCorpus {
            group: "beta".to_string(),
            records: vec![InterviewRecord {
                question: "Any performance issues?".to_string(),
                response: "latency is bad, everything is slow".to_string(),
                respondent_id: "b1".to_string(),
                group: "beta".to_string(),
            }],
        };
        let classification = classify_group(&group, &taxonomy);
        AnalysisResult {
            params,
            taxonomy,
            groups: vec![group],
            classifications: vec![classification],
        }
    }

    #[tokio::test]
    async fn test_store_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store
            .save_analysis("beta study", "first pass", &sample_result())
            .await
            .unwrap();

        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "beta study");

        let stored = store.load_project(id).await.unwrap().unwrap();
        assert_eq!(stored.taxonomy.names(), vec!["latency"]);
        assert_eq!(stored.groups[0].group, "beta");
    }

    #[tokio::test]
    async fn test_current_project_tracking() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.current_project().await.unwrap(), None);

        store.set_current_project(7).await.unwrap();
        assert_eq!(store.current_project().await.unwrap(), Some(7));

        store.clear_current_project().await.unwrap();
        assert_eq!(store.current_project().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_project() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(!store.delete_project(42).await.unwrap());
    }
}
